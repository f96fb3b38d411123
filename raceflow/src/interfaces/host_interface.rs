use crate::core::ghost::Pose;
use crate::core::race_controller::RaceState;
use crate::post::race_summary::RaceSummary;
use glam::Vec3;

/// Maximum rate at which snapshots are streamed to an external observer.
pub const MAX_OBSERVER_UPDATE_FREQUENCY: f64 = 20.0;

/// VehicleApi is the seam between the race core and the host's player
/// vehicle. The core never simulates vehicle dynamics; it only reads the pose
/// and toggles the switches the host honors.
pub trait VehicleApi {
    fn pose(&self) -> Pose;

    /// set_pose writes the pose directly (teleport), bypassing dynamics.
    fn set_pose(&mut self, pose: Pose);

    /// zero_velocity stops all linear and angular motion, called right before
    /// a teleport pose write.
    fn zero_velocity(&mut self);

    /// set_controls_enabled is the master input/physics-control switch; it is
    /// cut for the duration of a pending teleport.
    fn set_controls_enabled(&mut self, enabled: bool);

    /// set_driving_allowed grants or revokes the drive/accelerate permission
    /// that the race state machine manages.
    fn set_driving_allowed(&mut self, allowed: bool);
}

/// TrackProbe is the host's surface query used by the track-position monitor.
pub trait TrackProbe {
    /// hit_track_below reports whether a track surface lies within
    /// `max_distance` below `origin`.
    fn hit_track_below(&self, origin: Vec3, max_distance: f32) -> bool;
}

/// Per-tick request signals, polled by the host (input device, UI buttons)
/// and handed to the controller. All default to "not requested".
#[derive(Debug, Clone, Copy, Default)]
pub struct RaceInputs {
    pub toggle_pause: bool,
    pub return_to_track: bool,
}

/// RaceSnapshot is the observable race state streamed to external observers
/// (progress printers, future GUIs). Value-only, no shared state.
#[derive(Debug, Clone)]
pub struct RaceSnapshot {
    pub state: RaceState,
    pub race_time: f32,
    pub recorded_samples: usize,
    pub vehicle_pose: Pose,
    pub ghost_pose: Option<Pose>,
    pub on_track: bool,

    // final outcome payload (sent once when a race finishes)
    pub final_summary: Option<RaceSummary>,
}

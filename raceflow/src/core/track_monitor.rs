use crate::core::ghost::Pose;
use crate::interfaces::host_interface::TrackProbe;
use glam::Vec3;

/// Height above the vehicle origin where the downward probe starts.
pub const PROBE_START_HEIGHT: f32 = 1.0;
/// Maximum distance below the probe origin that still counts as surface contact.
pub const PROBE_MAX_DISTANCE: f32 = 3.0;

/// TrackPositionMonitor tests every racing tick whether the vehicle is over
/// the track surface and caches the last valid on-track pose for the manual
/// return-to-track recovery.
///
/// The test is a point-in-time probe; the single cached recovery pose is the
/// only memory kept between ticks.
#[derive(Debug)]
pub struct TrackPositionMonitor {
    last_on_track_pose: Pose,
    on_track: bool,
}

impl TrackPositionMonitor {
    pub fn new(anchor: Pose) -> TrackPositionMonitor {
        TrackPositionMonitor {
            last_on_track_pose: anchor,
            on_track: true,
        }
    }

    /// reset re-anchors the recovery pose, used when a race (re)starts at the
    /// start line.
    pub fn reset(&mut self, anchor: Pose) {
        self.last_on_track_pose = anchor;
        self.on_track = true;
    }

    /// refresh probes the track below the vehicle and, on contact, refreshes
    /// the recovery pose to the vehicle's current pose.
    pub fn refresh(&mut self, vehicle_pose: Pose, probe: &dyn TrackProbe) -> bool {
        let origin = vehicle_pose.position + Vec3::Y * PROBE_START_HEIGHT;
        self.on_track = probe.hit_track_below(origin, PROBE_MAX_DISTANCE);

        if self.on_track {
            self.last_on_track_pose = vehicle_pose;
        }

        self.on_track
    }

    pub fn is_on_track(&self) -> bool {
        self.on_track
    }

    pub fn recovery_pose(&self) -> Pose {
        self.last_on_track_pose
    }
}

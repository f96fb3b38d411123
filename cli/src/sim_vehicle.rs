use crate::demo_track::DemoTrack;
use glam::Vec3;
use raceflow::core::ghost::Pose;
use raceflow::interfaces::host_interface::VehicleApi;
use rand_distr::{Distribution, Normal};

/// SimVehicle is the demo host's stand-in for a physical player vehicle: a
/// kinematic body that follows the track centerline at a jittered target
/// speed. It honors the control master switch and the drive permission that
/// the race core manages, and integrates a velocity so the teleport
/// protocol's velocity reset is observable.
#[derive(Debug)]
pub struct SimVehicle {
    pose: Pose,
    velocity: Vec3,
    controls_enabled: bool,
    driving_allowed: bool,

    // arclength progress along the centerline
    track_s: f64,
    // scripted deviation from the centerline, positive to the outside
    lateral_offset: f64,
    // a teleport moved the vehicle; re-project progress before driving on
    needs_reprojection: bool,
}

impl SimVehicle {
    pub fn new(start: Pose) -> SimVehicle {
        SimVehicle {
            pose: start,
            velocity: Vec3::ZERO,
            controls_enabled: true,
            driving_allowed: false,
            track_s: 0.0,
            lateral_offset: 0.0,
            needs_reprojection: true,
        }
    }

    /// drive_along advances the vehicle along the centerline by one frame.
    /// Nothing moves unless both the control master switch and the drive
    /// permission are on; off the track surface the vehicle bogs down and can
    /// only be recovered by a teleport.
    pub fn drive_along(&mut self, track: &DemoTrack, dt: f64, target_speed: f64) {
        if !self.controls_enabled || !self.driving_allowed || dt <= 0.0 {
            return;
        }

        let (s_now, lateral_now) = track.project(self.pose.position);
        if self.needs_reprojection {
            self.track_s = s_now;
            self.needs_reprojection = false;
        }

        if lateral_now > track.half_width_at(s_now) {
            self.velocity = Vec3::ZERO;
            return;
        }

        let mut rng = rand::thread_rng();
        let speed_noise = Normal::new(0.0_f64, 0.03).unwrap().sample(&mut rng);
        let line_noise = Normal::new(0.0, 0.05).unwrap().sample(&mut rng);

        let speed = target_speed * (1.0 + speed_noise).max(0.5);
        self.track_s = (self.track_s + speed * dt) % track.length();

        let center = track.pose_at(self.track_s);
        let lateral_dir = center.rotation * Vec3::X;
        let position =
            center.position + lateral_dir * (self.lateral_offset + line_noise) as f32;

        self.velocity = (position - self.pose.position) / dt as f32;
        self.pose = Pose::new(position, center.rotation);
    }

    /// set_lateral_offset sets the scripted deviation from the centerline,
    /// used by the demo script to force the vehicle off the track.
    pub fn set_lateral_offset(&mut self, offset: f64) {
        self.lateral_offset = offset;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

impl VehicleApi for SimVehicle {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
        self.needs_reprojection = true;
    }

    fn zero_velocity(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    fn set_controls_enabled(&mut self, enabled: bool) {
        self.controls_enabled = enabled;
    }

    fn set_driving_allowed(&mut self, allowed: bool) {
        self.driving_allowed = allowed;
    }
}

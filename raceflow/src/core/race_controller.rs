use crate::core::finish_zone::FinishZone;
use crate::core::ghost::{load_ghost_path, save_ghost_path, GhostPath, Pose};
use crate::core::ghost_player::GhostPlayer;
use crate::core::ghost_recorder::GhostRecorder;
use crate::core::track_monitor::TrackPositionMonitor;
use crate::interfaces::host_interface::{RaceInputs, RaceSnapshot, TrackProbe, VehicleApi};
use crate::post::race_summary::RaceSummary;
use crate::pre::read_config::RaceConfig;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceState {
    MainMenu,
    RaceStart,
    Racing,
    Paused,
    RaceFinished,
}

/// A teleport whose pose write is deferred by one fixed simulation step.
/// Vehicle control is already cut when the request is parked here, so a
/// physics update still in flight cannot fight the pose overwrite.
#[derive(Debug, Clone, Copy)]
struct PendingTeleport {
    target: Pose,
}

/// RaceController is the top-level state machine of the time trial. It owns
/// the ghost recorder, the saved ghost path, the ghost player, the
/// track-position monitor and the finish zone, and it orchestrates every
/// transition triggered by race-start, finish-line, pause and recovery
/// events.
///
/// The host calls `tick` once per presentation frame and `fixed_tick` once
/// per fixed simulation step; all remaining operations are requests from UI
/// or trigger collaborators.
pub struct RaceController {
    state: RaceState,
    config: RaceConfig,
    vehicle: Rc<RefCell<dyn VehicleApi>>,
    probe: Box<dyn TrackProbe>,

    time_scale: f32,
    race_time: f32,
    finish_time: Option<f32>,

    recorder: GhostRecorder,
    saved_path: GhostPath,
    has_saved_ghost: bool,
    ghost_saved_this_race: bool,
    ghost: Option<GhostPlayer>,

    monitor: TrackPositionMonitor,
    finish_zone: FinishZone,
    pending_teleport: Option<PendingTeleport>,

    races_completed: u32,
}

impl RaceController {
    /// new wires the controller with its collaborators, loads a previously
    /// saved ghost path if one exists on disk, and enters the main menu.
    pub fn new(
        config: RaceConfig,
        vehicle: Rc<RefCell<dyn VehicleApi>>,
        probe: Box<dyn TrackProbe>,
    ) -> RaceController {
        let ghost_file = config.ghost_file_path();
        let saved_path = if ghost_file.exists() {
            match load_ghost_path(&ghost_file) {
                Ok(path) => {
                    println!(
                        "INFO: Loaded ghost with {} samples from {}",
                        path.len(),
                        ghost_file.display()
                    );
                    path
                }
                Err(err) => {
                    eprintln!(
                        "WARNING: Could not load ghost file: {:#}. Starting without a saved ghost.",
                        err
                    );
                    GhostPath::new()
                }
            }
        } else {
            GhostPath::new()
        };
        let has_saved_ghost = !saved_path.is_empty();

        let anchor = config.start_pose.unwrap_or_default();
        let recorder = GhostRecorder::new(config.recording_interval);
        let finish_zone = FinishZone::new(
            config.finish_zone_center,
            config.finish_zone_half_extents,
        );

        let mut controller = RaceController {
            state: RaceState::MainMenu,
            config,
            vehicle,
            probe,
            time_scale: 1.0,
            race_time: 0.0,
            finish_time: None,
            recorder,
            saved_path,
            has_saved_ghost,
            ghost_saved_this_race: false,
            ghost: None,
            monitor: TrackPositionMonitor::new(anchor),
            finish_zone,
            pending_teleport: None,
            races_completed: 0,
        };
        controller.set_state(RaceState::MainMenu);
        controller
    }

    // ---------------------------------------------------------------------------------------------
    // STATE MACHINE -------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// set_state switches the race state and runs the entry actions of the
    /// new state.
    fn set_state(&mut self, new_state: RaceState) {
        self.state = new_state;

        match new_state {
            RaceState::MainMenu => self.enter_main_menu(),
            RaceState::RaceStart => self.enter_race_start(),
            RaceState::Racing => self.enter_racing(),
            RaceState::Paused => self.enter_paused(),
            RaceState::RaceFinished => self.enter_race_finished(),
        }
    }

    fn enter_main_menu(&mut self) {
        self.time_scale = 1.0;
        self.set_driving_allowed(false);

        // drop any live ghost actor
        self.ghost = None;
    }

    /// RaceStart is a same-tick pass-through state: the entry actions run and
    /// the controller moves straight on to Racing.
    fn enter_race_start(&mut self) {
        self.time_scale = 1.0;

        // allow the finish line to trigger again
        self.finish_zone.reset();

        match self.config.start_pose {
            Some(start_pose) => {
                // anchor the recovery feature at the start line
                self.monitor.reset(start_pose);
                self.request_teleport(start_pose);
            }
            None => {
                eprintln!("ERROR: No start pose configured, skipping start-line placement!");
            }
        }

        // begin a fresh recording
        self.recorder.begin_recording();
        self.race_time = 0.0;
        self.finish_time = None;
        self.ghost_saved_this_race = false;

        // drop the previous ghost before spawning a new one
        self.ghost = None;
        if self.has_saved_ghost {
            self.spawn_ghost();
        }

        self.set_state(RaceState::Racing);
    }

    fn enter_racing(&mut self) {
        self.time_scale = 1.0;
        self.set_driving_allowed(true);
    }

    fn enter_paused(&mut self) {
        // freezing the clock also stops recording and playback: both derive
        // elapsed time from the scaled delta
        self.time_scale = 0.0;
        self.set_driving_allowed(false);
    }

    fn enter_race_finished(&mut self) {
        self.set_driving_allowed(false);
        self.finish_time = Some(self.race_time);
        self.races_completed += 1;

        // first finish without a saved ghost: this lap becomes the ghost
        if !self.has_saved_ghost {
            self.save_current_ghost();
        }

        // freeze the ghost at its current pose
        if let Some(ghost) = self.ghost.as_mut() {
            ghost.stop_playback();
        }
    }

    // ---------------------------------------------------------------------------------------------
    // TICKING -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// tick advances the presentation-step half of the controller. `dt` is
    /// the raw frame delta in seconds; the controller applies its own time
    /// scale before anything time-derived sees it.
    pub fn tick(&mut self, dt: f32, inputs: &RaceInputs) {
        match self.state {
            RaceState::Racing => {
                self.racing_tick(dt, inputs);
                self.handle_pause_input(inputs);
            }
            RaceState::Paused => {
                // runs even though the clock is frozen
                self.handle_pause_input(inputs);
            }
            _ => {}
        }
    }

    /// fixed_tick advances the fixed-step half of the controller: a pending
    /// teleport is applied here, after the physics step of the requesting
    /// frame has completed. Fixed steps do not run while the clock is frozen,
    /// so a pending teleport survives a pause.
    pub fn fixed_tick(&mut self) {
        if self.time_scale == 0.0 {
            return;
        }

        if let Some(pending) = self.pending_teleport.take() {
            let mut vehicle = self.vehicle.borrow_mut();
            vehicle.zero_velocity();
            vehicle.set_pose(pending.target);
            vehicle.set_controls_enabled(true);
            vehicle.set_driving_allowed(true);
        }
    }

    fn racing_tick(&mut self, dt: f32, inputs: &RaceInputs) {
        let dt = dt * self.time_scale;
        self.race_time += dt;

        let vehicle_pose = self.vehicle.borrow().pose();

        // advance the recording at the configured interval
        self.recorder.maybe_sample(vehicle_pose, self.race_time);

        // ghost playback runs off the same scaled clock
        if let Some(ghost) = self.ghost.as_mut() {
            ghost.advance(dt);
        }

        // refresh on-track status for the recovery feature
        self.monitor.refresh(vehicle_pose, self.probe.as_ref());

        if inputs.return_to_track && !self.monitor.is_on_track() {
            self.return_to_track();
        }

        // finish-line crossing, one-shot per race
        if self.finish_zone.check_crossing(vehicle_pose.position) {
            self.finish_race();
        }
    }

    fn handle_pause_input(&mut self, inputs: &RaceInputs) {
        if inputs.toggle_pause {
            self.toggle_pause();
        }
    }

    // ---------------------------------------------------------------------------------------------
    // TELEPORTING ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// request_teleport runs phase one of the two-phase teleport: vehicle
    /// control is cut immediately, the pose write happens on the next fixed
    /// simulation step.
    fn request_teleport(&mut self, target: Pose) {
        self.vehicle.borrow_mut().set_controls_enabled(false);
        self.pending_teleport = Some(PendingTeleport { target });
    }

    /// return_to_track teleports the vehicle back to the last known on-track
    /// pose without touching race state or the running recording. A request
    /// while another teleport is still pending is ignored.
    fn return_to_track(&mut self) {
        if self.pending_teleport.is_some() {
            return;
        }
        self.request_teleport(self.monitor.recovery_pose());
    }

    // ---------------------------------------------------------------------------------------------
    // COLLABORATOR API ----------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// start_race begins a new race; used from the menu, for a retry after a
    /// finish, and from pause.
    pub fn start_race(&mut self) {
        self.set_state(RaceState::RaceStart);
    }

    /// finish_race handles a finish-line crossing; only effective while
    /// racing, crossings in any other state are ignored.
    pub fn finish_race(&mut self) {
        if self.state != RaceState::Racing {
            return;
        }
        self.set_state(RaceState::RaceFinished);
    }

    /// back_to_menu returns to the main menu from any state.
    pub fn back_to_menu(&mut self) {
        self.set_state(RaceState::MainMenu);
    }

    /// toggle_pause flips between Racing and Paused; ignored in any other
    /// state.
    pub fn toggle_pause(&mut self) {
        match self.state {
            RaceState::Racing => self.set_state(RaceState::Paused),
            RaceState::Paused => self.set_state(RaceState::Racing),
            _ => {}
        }
    }

    /// save_current_ghost snapshots the active recording as the saved ghost,
    /// overwriting any previous one, and persists it. An empty recording is
    /// ignored.
    pub fn save_current_ghost(&mut self) {
        if self.recorder.sample_count() == 0 {
            return;
        }

        self.saved_path = self.recorder.path().clone();
        self.has_saved_ghost = true;
        self.ghost_saved_this_race = true;

        let filepath = self.config.ghost_file_path();
        match save_ghost_path(&self.saved_path, &filepath) {
            Ok(()) => println!(
                "INFO: Saved ghost with {} samples to {}",
                self.saved_path.len(),
                filepath.display()
            ),
            // a failed save keeps the in-memory ghost usable for this session
            Err(err) => eprintln!("WARNING: Could not save ghost file: {:#}", err),
        }
    }

    fn spawn_ghost(&mut self) {
        let offset = Vec3::new(0.0, self.config.ghost_y_offset, 0.0);
        match GhostPlayer::start_playback(&self.saved_path, offset) {
            Some(player) => self.ghost = Some(player),
            None => eprintln!("WARNING: No ghost samples available for playback!"),
        }
    }

    fn set_driving_allowed(&mut self, allowed: bool) {
        self.vehicle.borrow_mut().set_driving_allowed(allowed);
    }

    // ---------------------------------------------------------------------------------------------
    // QUERIES -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn state(&self) -> RaceState {
        self.state
    }

    pub fn race_time(&self) -> f32 {
        self.race_time
    }

    pub fn has_saved_ghost(&self) -> bool {
        self.has_saved_ghost
    }

    pub fn recorded_sample_count(&self) -> usize {
        self.recorder.sample_count()
    }

    pub fn ghost_pose(&self) -> Option<Pose> {
        self.ghost.as_ref().map(|ghost| ghost.current_pose())
    }

    pub fn is_on_track(&self) -> bool {
        self.monitor.is_on_track()
    }

    pub fn has_pending_teleport(&self) -> bool {
        self.pending_teleport.is_some()
    }

    /// race_summary reports the outcome of the last finished race, or None if
    /// the current race has not finished.
    pub fn race_summary(&self) -> Option<RaceSummary> {
        let lap_time = self.finish_time?;
        Some(RaceSummary {
            race_no: self.races_completed,
            lap_time,
            sample_count: self.recorder.sample_count(),
            ghost_lap_time: self.ghost.as_ref().map(|ghost| ghost.duration()),
            ghost_saved: self.ghost_saved_this_race,
        })
    }

    /// snapshot captures the observable race state for external observers.
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            state: self.state,
            race_time: self.race_time,
            recorded_samples: self.recorder.sample_count(),
            vehicle_pose: self.vehicle.borrow().pose(),
            ghost_pose: self.ghost_pose(),
            on_track: self.monitor.is_on_track(),
            final_summary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[derive(Debug, Default)]
    struct TestVehicle {
        pose: Pose,
        velocity: Vec3,
        controls_enabled: bool,
        driving_allowed: bool,
        velocity_resets: u32,
    }

    impl VehicleApi for TestVehicle {
        fn pose(&self) -> Pose {
            self.pose
        }

        fn set_pose(&mut self, pose: Pose) {
            self.pose = pose;
        }

        fn zero_velocity(&mut self) {
            self.velocity = Vec3::ZERO;
            self.velocity_resets += 1;
        }

        fn set_controls_enabled(&mut self, enabled: bool) {
            self.controls_enabled = enabled;
        }

        fn set_driving_allowed(&mut self, allowed: bool) {
            self.driving_allowed = allowed;
        }
    }

    struct AlwaysOnTrack;

    impl TrackProbe for AlwaysOnTrack {
        fn hit_track_below(&self, _origin: Vec3, _max_distance: f32) -> bool {
            true
        }
    }

    /// On-track only for |z| <= 5 around the x axis.
    struct StripTrack;

    impl TrackProbe for StripTrack {
        fn hit_track_below(&self, origin: Vec3, _max_distance: f32) -> bool {
            origin.z.abs() <= 5.0
        }
    }

    fn test_config(tag: &str) -> RaceConfig {
        let mut config = RaceConfig::default();
        config.save_dir = std::env::temp_dir().join(format!(
            "raceflow_ctl_{}_{}",
            tag,
            std::process::id()
        ));
        config.start_pose = Some(Pose::new(Vec3::new(0.0, 0.0, 0.0), Quat::IDENTITY));
        config.finish_zone_center = Vec3::new(100.0, 0.0, 0.0);
        config.finish_zone_half_extents = Vec3::new(2.0, 3.0, 8.0);
        config
    }

    fn cleanup(config: &RaceConfig) {
        let _ = std::fs::remove_dir_all(&config.save_dir);
    }

    fn controller_with(
        tag: &str,
        probe: Box<dyn TrackProbe>,
    ) -> (RaceController, Rc<RefCell<TestVehicle>>, RaceConfig) {
        let config = test_config(tag);
        let vehicle = Rc::new(RefCell::new(TestVehicle::default()));
        let controller = RaceController::new(config.clone(), vehicle.clone(), probe);
        (controller, vehicle, config)
    }

    const DT: f32 = 0.02;

    fn step(controller: &mut RaceController, inputs: &RaceInputs) {
        controller.fixed_tick();
        controller.tick(DT, inputs);
    }

    #[test]
    fn menu_forbids_driving_and_racing_allows_it() {
        let (mut controller, vehicle, config) =
            controller_with("perms", Box::new(AlwaysOnTrack));

        assert_eq!(controller.state(), RaceState::MainMenu);
        assert!(!vehicle.borrow().driving_allowed);

        controller.start_race();
        assert_eq!(controller.state(), RaceState::Racing);
        assert!(vehicle.borrow().driving_allowed);

        controller.toggle_pause();
        assert_eq!(controller.state(), RaceState::Paused);
        assert!(!vehicle.borrow().driving_allowed);

        controller.toggle_pause();
        assert!(vehicle.borrow().driving_allowed);

        controller.back_to_menu();
        assert!(!vehicle.borrow().driving_allowed);
        cleanup(&config);
    }

    #[test]
    fn start_teleport_applies_on_the_next_fixed_step() {
        let (mut controller, vehicle, config) =
            controller_with("teleport", Box::new(AlwaysOnTrack));

        vehicle.borrow_mut().pose = Pose::new(Vec3::new(50.0, 0.0, 3.0), Quat::IDENTITY);
        vehicle.borrow_mut().velocity = Vec3::new(10.0, 0.0, 0.0);

        controller.start_race();

        // phase one: control cut, pose untouched
        assert!(controller.has_pending_teleport());
        assert!(!vehicle.borrow().controls_enabled);
        assert_eq!(vehicle.borrow().pose.position.x, 50.0);

        controller.fixed_tick();

        // phase two: velocity zeroed, pose written, control restored
        assert!(!controller.has_pending_teleport());
        let vehicle = vehicle.borrow();
        assert_eq!(vehicle.velocity, Vec3::ZERO);
        assert_eq!(vehicle.velocity_resets, 1);
        assert_eq!(vehicle.pose.position, Vec3::ZERO);
        assert!(vehicle.controls_enabled);
        assert!(vehicle.driving_allowed);
        cleanup(&config);
    }

    #[test]
    fn finish_crossing_is_ignored_outside_racing() {
        let (mut controller, _vehicle, config) =
            controller_with("finishgate", Box::new(AlwaysOnTrack));

        controller.finish_race();
        assert_eq!(controller.state(), RaceState::MainMenu);

        controller.start_race();
        controller.toggle_pause();
        controller.finish_race();
        assert_eq!(controller.state(), RaceState::Paused);
        cleanup(&config);
    }

    #[test]
    fn first_finish_saves_the_recording() {
        let (mut controller, vehicle, config) =
            controller_with("firstsave", Box::new(AlwaysOnTrack));
        assert!(!controller.has_saved_ghost());

        controller.start_race();
        assert!(controller.ghost_pose().is_none(), "no ghost on the first run");

        // drive toward the finish zone at x=100
        let inputs = RaceInputs::default();
        for i in 0..400 {
            vehicle.borrow_mut().pose.position.x = i as f32 * 0.5;
            step(&mut controller, &inputs);
            if controller.state() == RaceState::RaceFinished {
                break;
            }
        }

        assert_eq!(controller.state(), RaceState::RaceFinished);
        assert!(controller.has_saved_ghost());
        assert!(controller.recorded_sample_count() > 0);
        assert!(config.ghost_file_path().exists());

        let summary = controller.race_summary().unwrap();
        assert!(summary.ghost_saved);
        assert_eq!(summary.sample_count, controller.recorded_sample_count());
        cleanup(&config);
    }

    #[test]
    fn second_race_spawns_the_ghost() {
        let (mut controller, vehicle, config) =
            controller_with("respawn", Box::new(AlwaysOnTrack));

        let inputs = RaceInputs::default();
        controller.start_race();
        for i in 0..400 {
            vehicle.borrow_mut().pose.position.x = i as f32 * 0.5;
            step(&mut controller, &inputs);
            if controller.state() == RaceState::RaceFinished {
                break;
            }
        }
        assert!(controller.has_saved_ghost());

        controller.start_race();
        assert_eq!(controller.state(), RaceState::Racing);
        let ghost_pose = controller.ghost_pose().expect("ghost spawned on retry");

        // ghost starts at the first recorded sample
        let first = controller.saved_path.samples[0];
        assert_eq!(ghost_pose.position, first.position);

        // menu drops the ghost actor
        controller.back_to_menu();
        assert!(controller.ghost_pose().is_none());
        cleanup(&config);
    }

    #[test]
    fn pause_freezes_recording_and_playback() {
        let (mut controller, vehicle, config) =
            controller_with("freeze", Box::new(AlwaysOnTrack));

        controller.start_race();
        let inputs = RaceInputs::default();
        for i in 0..50 {
            vehicle.borrow_mut().pose.position.x = i as f32 * 0.5;
            step(&mut controller, &inputs);
        }
        assert!(controller.recorded_sample_count() > 0);

        controller.tick(
            DT,
            &RaceInputs {
                toggle_pause: true,
                ..Default::default()
            },
        );
        assert_eq!(controller.state(), RaceState::Paused);
        let samples_before = controller.recorded_sample_count();
        let time_before = controller.race_time();

        // frozen clock: ticks change nothing
        for _ in 0..100 {
            step(&mut controller, &inputs);
        }
        assert_eq!(controller.recorded_sample_count(), samples_before);
        assert_eq!(controller.race_time(), time_before);

        controller.tick(
            DT,
            &RaceInputs {
                toggle_pause: true,
                ..Default::default()
            },
        );
        assert_eq!(controller.state(), RaceState::Racing);

        step(&mut controller, &inputs);
        assert!(controller.race_time() > time_before);
        cleanup(&config);
    }

    #[test]
    fn return_to_track_teleports_to_the_last_on_track_pose() {
        let (mut controller, vehicle, config) = controller_with("recover", Box::new(StripTrack));

        controller.start_race();
        controller.fixed_tick();

        let inputs = RaceInputs::default();

        // drive on the strip, then veer off sideways
        vehicle.borrow_mut().pose = Pose::new(Vec3::new(10.0, 0.0, 2.0), Quat::IDENTITY);
        step(&mut controller, &inputs);
        assert!(controller.is_on_track());

        vehicle.borrow_mut().pose = Pose::new(Vec3::new(12.0, 0.0, 40.0), Quat::IDENTITY);
        step(&mut controller, &inputs);
        assert!(!controller.is_on_track());

        let samples_before = controller.recorded_sample_count();
        controller.tick(
            DT,
            &RaceInputs {
                return_to_track: true,
                ..Default::default()
            },
        );
        assert!(controller.has_pending_teleport());

        controller.fixed_tick();
        assert_eq!(
            vehicle.borrow().pose.position,
            Vec3::new(10.0, 0.0, 2.0)
        );

        // recovery does not reset race state or the recording
        assert_eq!(controller.state(), RaceState::Racing);
        assert!(controller.recorded_sample_count() >= samples_before);
        cleanup(&config);
    }

    #[test]
    fn second_recovery_request_while_pending_is_ignored() {
        let (mut controller, vehicle, config) = controller_with("pending", Box::new(StripTrack));

        controller.start_race();
        controller.fixed_tick();

        let inputs = RaceInputs::default();
        vehicle.borrow_mut().pose = Pose::new(Vec3::new(10.0, 0.0, 2.0), Quat::IDENTITY);
        step(&mut controller, &inputs);

        vehicle.borrow_mut().pose = Pose::new(Vec3::new(12.0, 0.0, 40.0), Quat::IDENTITY);
        controller.tick(
            DT,
            &RaceInputs {
                return_to_track: true,
                ..Default::default()
            },
        );
        assert!(controller.has_pending_teleport());
        let first_target = controller.pending_teleport.unwrap().target;

        // second request before the fixed step: must not replace the pending one
        vehicle.borrow_mut().pose = Pose::new(Vec3::new(15.0, 0.0, 60.0), Quat::IDENTITY);
        controller.tick(
            DT,
            &RaceInputs {
                return_to_track: true,
                ..Default::default()
            },
        );
        assert_eq!(
            controller.pending_teleport.unwrap().target.position,
            first_target.position
        );
        cleanup(&config);
    }

    #[test]
    fn pending_teleport_survives_a_pause() {
        let (mut controller, vehicle, config) =
            controller_with("pausedtp", Box::new(AlwaysOnTrack));

        vehicle.borrow_mut().pose = Pose::new(Vec3::new(30.0, 0.0, 0.0), Quat::IDENTITY);
        controller.start_race();
        assert!(controller.has_pending_teleport());

        controller.toggle_pause();
        controller.fixed_tick();

        // frozen: the pose write must not happen
        assert!(controller.has_pending_teleport());
        assert_eq!(vehicle.borrow().pose.position.x, 30.0);

        controller.toggle_pause();
        controller.fixed_tick();
        assert!(!controller.has_pending_teleport());
        assert_eq!(vehicle.borrow().pose.position, Vec3::ZERO);
        cleanup(&config);
    }

    #[test]
    fn save_current_ghost_overwrites_an_existing_ghost() {
        let (mut controller, vehicle, config) =
            controller_with("overwrite", Box::new(AlwaysOnTrack));

        let inputs = RaceInputs::default();
        controller.start_race();
        for i in 0..400 {
            vehicle.borrow_mut().pose.position.x = i as f32 * 0.5;
            step(&mut controller, &inputs);
            if controller.state() == RaceState::RaceFinished {
                break;
            }
        }
        let first_len = controller.saved_path.len();
        assert!(first_len > 0);

        // a shorter second run, force-saved over the first
        controller.start_race();
        for i in 0..40 {
            vehicle.borrow_mut().pose.position.x = i as f32 * 0.5;
            step(&mut controller, &inputs);
        }
        controller.save_current_ghost();

        assert!(controller.saved_path.len() < first_len);
        assert_eq!(
            controller.saved_path.len(),
            controller.recorded_sample_count()
        );
        cleanup(&config);
    }

    #[test]
    fn missing_start_pose_still_reaches_racing() {
        let mut config = test_config("nostart");
        config.start_pose = None;
        let vehicle = Rc::new(RefCell::new(TestVehicle::default()));
        let mut controller =
            RaceController::new(config.clone(), vehicle.clone(), Box::new(AlwaysOnTrack));

        controller.start_race();

        // placement skipped, race flow unaffected
        assert_eq!(controller.state(), RaceState::Racing);
        assert!(!controller.has_pending_teleport());
        assert!(vehicle.borrow().driving_allowed);
        cleanup(&config);
    }
}

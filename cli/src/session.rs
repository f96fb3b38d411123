use crate::demo_track::DemoTrack;
use crate::sim_vehicle::SimVehicle;
use anyhow::Context;
use flume::Sender;
use raceflow::core::race_controller::{RaceController, RaceState};
use raceflow::interfaces::host_interface::{
    RaceInputs, RaceSnapshot, MAX_OBSERVER_UPDATE_FREQUENCY,
};
use raceflow::post::race_summary::RaceSummary;
use raceflow::pre::read_config::RaceConfig;
use raceflow::pre::sim_opts::SimOpts;
use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Hard cap on simulated wall time per race; a demo driver that never reaches
/// the finish zone is a configuration error, not a reason to spin forever.
const MAX_RACE_WALL_TIME: f64 = 600.0;

/// run_session drives the scripted demo: the host loop the core is glued to
/// in a real game. Race 1 records the ghost lap (with a scripted pause and
/// resume), race 2 races against it (with a scripted off-track excursion and
/// recovery). Further races run unscripted.
pub fn run_session(
    sim_opts: &SimOpts,
    config: RaceConfig,
    track: DemoTrack,
) -> anyhow::Result<Vec<RaceSummary>> {
    let start_pose = config.start_pose.unwrap_or_default();
    let vehicle = Rc::new(RefCell::new(SimVehicle::new(start_pose)));
    let target_speed = config.target_speed as f64;

    let mut controller =
        RaceController::new(config, vehicle.clone(), Box::new(track.clone()));

    // real-time mode streams snapshots to an observer thread
    let (tx, observer) = if sim_opts.realtime {
        let (tx, rx) = flume::unbounded();
        (Some(tx), Some(spawn_observer(rx)))
    } else {
        (None, None)
    };

    let mut summaries = Vec::with_capacity(sim_opts.no_races as usize);
    for race_no in 1..=sim_opts.no_races {
        println!("INFO: Starting race {} of {}", race_no, sim_opts.no_races);
        let summary = run_race(
            &mut controller,
            &vehicle,
            &track,
            sim_opts,
            race_no,
            target_speed,
            tx.as_ref(),
        )?;
        summary.print_summary();

        // a lap that beat the ghost becomes the new ghost
        if let Some(ghost_lap_time) = summary.ghost_lap_time {
            if summary.lap_time < ghost_lap_time {
                println!("INFO: Lap beat the ghost, saving it as the new ghost");
                controller.save_current_ghost();
            }
        }

        summaries.push(summary);
    }

    controller.back_to_menu();

    // closing the channel ends the observer loop
    drop(tx);
    if let Some(observer) = observer {
        let _ = observer.join();
    }

    Ok(summaries)
}

fn run_race(
    controller: &mut RaceController,
    vehicle: &Rc<RefCell<SimVehicle>>,
    track: &DemoTrack,
    sim_opts: &SimOpts,
    race_no: u32,
    target_speed: f64,
    tx: Option<&Sender<RaceSnapshot>>,
) -> anyhow::Result<RaceSummary> {
    controller.start_race();

    let mut script = DemoScript::new(race_no);
    let frame_step = sim_opts.frame_step_size;
    let mut fixed_accum = 0.0;
    let mut wall_time = 0.0;
    let mut t_race_update_print = 0.0;
    let mut t_race_update_obs = 0.0;

    while controller.state() != RaceState::RaceFinished {
        let t_start = Instant::now();

        // fixed simulation steps owed for this frame
        fixed_accum += frame_step;
        while fixed_accum >= sim_opts.timestep_size {
            controller.fixed_tick();
            fixed_accum -= sim_opts.timestep_size;
        }

        let inputs = script.tick_inputs(controller, vehicle);
        vehicle
            .borrow_mut()
            .drive_along(track, frame_step, target_speed);
        controller.tick(frame_step as f32, &inputs);

        wall_time += frame_step;

        if sim_opts.debug && controller.race_time() as f64 > t_race_update_print + 0.9999 {
            println!(
                "INFO: Simulating... Current race time is {:.3}s, {} samples recorded",
                controller.race_time(),
                controller.recorded_sample_count()
            );
            t_race_update_print = controller.race_time() as f64;
        }

        if let Some(tx) = tx {
            if wall_time > t_race_update_obs + 1.0 / MAX_OBSERVER_UPDATE_FREQUENCY - 0.001 {
                tx.send(controller.snapshot())
                    .context("Failed to send race snapshot to the observer!")?;
                t_race_update_obs = wall_time;
            }

            // sleep until the frame step is finished in real-time as well (in ms)
            let t_sleep = (frame_step * 1000.0 / sim_opts.realtime_factor) as i64
                - t_start.elapsed().as_millis() as i64;
            if t_sleep > 0 {
                sleep(Duration::from_millis(t_sleep as u64));
            } else {
                println!("WARNING: Could not keep up with real-time!")
            }
        }

        if wall_time > MAX_RACE_WALL_TIME {
            anyhow::bail!(
                "Race {} did not finish within {:.0}s of simulated time!",
                race_no,
                MAX_RACE_WALL_TIME
            );
        }
    }

    let summary = controller
        .race_summary()
        .context("Race finished without a summary!")?;

    // the final snapshot carries the outcome payload
    if let Some(tx) = tx {
        let mut snapshot = controller.snapshot();
        snapshot.final_summary = Some(summary.clone());
        tx.send(snapshot)
            .context("Failed to send the final race snapshot to the observer!")?;
    }

    Ok(summary)
}

fn spawn_observer(rx: flume::Receiver<RaceSnapshot>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for snapshot in rx.iter() {
            if let Some(summary) = snapshot.final_summary {
                println!(
                    "INFO: Observer: race {} finished after {:.3}s",
                    summary.race_no, summary.lap_time
                );
                continue;
            }

            let ghost = match snapshot.ghost_pose {
                Some(pose) => format!("({:6.1}, {:6.1})", pose.position.x, pose.position.z),
                None => "none".to_string(),
            };
            println!(
                "INFO: [{:?}] t={:6.2}s samples={:4} vehicle=({:6.1}, {:6.1}) ghost={} on_track={}",
                snapshot.state,
                snapshot.race_time,
                snapshot.recorded_samples,
                snapshot.vehicle_pose.position.x,
                snapshot.vehicle_pose.position.z,
                ghost,
                snapshot.on_track
            );
        }
    })
}

/// DemoScript injects the scripted player actions: a pause/resume during the
/// recording lap and an off-track excursion plus recovery during the ghost
/// lap.
struct DemoScript {
    race_no: u32,
    pause_issued: bool,
    resume_countdown: Option<u32>,
    excursion_started: bool,
    recovery_issued: bool,
}

impl DemoScript {
    fn new(race_no: u32) -> DemoScript {
        DemoScript {
            race_no,
            pause_issued: false,
            resume_countdown: None,
            excursion_started: false,
            recovery_issued: false,
        }
    }

    fn tick_inputs(
        &mut self,
        controller: &RaceController,
        vehicle: &Rc<RefCell<SimVehicle>>,
    ) -> RaceInputs {
        let mut inputs = RaceInputs::default();

        match self.race_no {
            1 => {
                // pause mid-lap, resume after a handful of frozen frames
                if !self.pause_issued
                    && controller.state() == RaceState::Racing
                    && controller.race_time() > 6.0
                {
                    println!("INFO: Demo driver pauses the race");
                    inputs.toggle_pause = true;
                    self.pause_issued = true;
                    self.resume_countdown = Some(45);
                } else if let Some(frames_left) = self.resume_countdown.as_mut() {
                    if *frames_left == 0 {
                        println!("INFO: Demo driver resumes the race");
                        inputs.toggle_pause = true;
                        self.resume_countdown = None;
                    } else {
                        *frames_left -= 1;
                    }
                }
            }
            2 => {
                // veer off the track, then ask to be put back
                if !self.excursion_started && controller.race_time() > 6.0 {
                    println!("INFO: Demo driver veers off the track");
                    vehicle.borrow_mut().set_lateral_offset(12.0);
                    self.excursion_started = true;
                }
                if self.excursion_started
                    && !self.recovery_issued
                    && !controller.is_on_track()
                {
                    println!("INFO: Demo driver requests return to track");
                    vehicle.borrow_mut().set_lateral_offset(0.0);
                    inputs.return_to_track = true;
                    self.recovery_issued = true;
                }
            }
            _ => {}
        }

        inputs
    }
}

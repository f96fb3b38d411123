mod demo_track;
mod plot;
mod session;
mod sim_vehicle;

use clap::Parser;
use demo_track::DemoTrack;
use glam::Vec3;
use raceflow::core::ghost::load_ghost_path;
use raceflow::pre::read_config::{read_race_config, RaceConfig};
use raceflow::pre::sim_opts::SimOpts;
use std::time::Instant;

/// demo_config_for builds default race parameters that line up with the given
/// track: start at the line, finish zone shortly before completing the lap.
fn demo_config_for(track: &DemoTrack) -> RaceConfig {
    let mut config = RaceConfig::default();
    config.start_pose = Some(track.pose_at(0.0));
    config.ghost_y_offset = 0.2;

    let finish_pose = track.pose_at(track.length() - 15.0);
    config.finish_zone_center = finish_pose.position;
    config.finish_zone_half_extents = Vec3::new(10.0, 5.0, 10.0);
    config
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    if !(0.001..=0.1).contains(&sim_opts.timestep_size) {
        anyhow::bail!(
            "Fixed timestep size must be in [0.001, 0.1]s, but is {:.4}s!",
            sim_opts.timestep_size
        );
    }
    if sim_opts.frame_step_size <= 0.0 {
        anyhow::bail!("Frame step size must be positive!");
    }

    // get the track centerline
    let track = if let Some(trackfile_path) = &sim_opts.trackfile_path {
        println!("INFO: Reading track centerline from {:?}", trackfile_path);
        demo_track::read_demo_track(trackfile_path)?
    } else {
        println!("INFO: Using the built-in oval track");
        DemoTrack::default_oval()
    };

    // get race parameters
    let config = if let Some(parfile_path) = &sim_opts.parfile_path {
        println!("INFO: Reading race parameters from {:?}", parfile_path);
        read_race_config(parfile_path)?
    } else {
        demo_config_for(&track)
    };

    println!(
        "INFO: Running {} race(s) on a {:.0}m lap, recording every {:.3}s",
        sim_opts.no_races,
        track.length(),
        config.recording_interval
    );

    // EXECUTION -----------------------------------------------------------------------------------
    let t_start = Instant::now();
    let summaries = session::run_session(&sim_opts, config.clone(), track)?;
    println!("INFO: Execution time: {}ms", t_start.elapsed().as_millis());

    // POST-PROCESSING -----------------------------------------------------------------------------
    if let Some(summary) = summaries.last() {
        let out_path = summary.write_summary_to_file(None)?;
        println!("INFO: Summary written to {}", out_path);
    }

    if sim_opts.plot {
        match load_ghost_path(&config.ghost_file_path()) {
            Ok(ghost_path) => match plot::export_ghost_plot(&ghost_path, &config.save_file_name) {
                Ok(out_path) => println!("INFO: Ghost trajectory plot saved to {}", out_path),
                Err(err) => eprintln!("WARNING: Could not export the trajectory plot: {:#}", err),
            },
            Err(err) => eprintln!(
                "WARNING: Could not load the saved ghost for plotting: {:#}",
                err
            ),
        }
    }

    Ok(())
}

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "raceflow",
    about = "Arcade time-trial race flow with ghost-lap recording and replay"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing (only for fast mode)
    #[clap(short, long)]
    pub debug: bool,

    /// Run the session in real time, streaming progress to an observer thread
    #[clap(short = 'g', long)]
    pub realtime: bool,

    /// Export a PNG plot of the saved ghost trajectory after the session
    #[clap(long)]
    pub plot: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of races in the demo session (the first one records the ghost)
    #[clap(short, long, default_value = "2")]
    pub no_races: u32,

    /// Set path to the race parameter file (built-in defaults if not set)
    #[clap(short, long)]
    pub parfile_path: Option<PathBuf>,

    /// Set path to the track centerline CSV file (built-in oval if not set)
    #[clap(long)]
    pub trackfile_path: Option<PathBuf>,

    /// Set real-time factor (only relevant in real-time mode)
    #[clap(short, long, default_value = "1.0")]
    pub realtime_factor: f64,

    /// Set fixed simulation step size in seconds, should be in the range [0.001, 0.1]
    #[clap(short, long, default_value = "0.02")]
    pub timestep_size: f64,

    /// Set presentation frame step size in seconds
    #[clap(short, long, default_value = "0.016")]
    pub frame_step_size: f64,
}

use crate::core::ghost::{GhostPath, GhostSample, Pose};

/// GhostRecorder samples the player vehicle pose at a fixed interval while a
/// race is running, building the timestamped path that a later race replays.
///
/// The interval gate throttles storage growth independent of the simulation
/// tick rate; path length is otherwise unbounded for a session-scoped race.
#[derive(Debug)]
pub struct GhostRecorder {
    recording_interval: f32,
    path: GhostPath,
    last_sample_time: f32,
}

impl GhostRecorder {
    pub fn new(recording_interval: f32) -> GhostRecorder {
        GhostRecorder {
            recording_interval,
            path: GhostPath::new(),
            last_sample_time: 0.0,
        }
    }

    /// begin_recording clears the path and resets the sampling clock.
    pub fn begin_recording(&mut self) {
        self.path.clear();
        self.last_sample_time = 0.0;
    }

    /// maybe_sample appends a sample stamped with `elapsed` if at least the
    /// recording interval has passed since the previous sample.
    pub fn maybe_sample(&mut self, pose: Pose, elapsed: f32) {
        if elapsed - self.last_sample_time >= self.recording_interval {
            self.path.samples.push(GhostSample::new(pose, elapsed));
            self.last_sample_time = elapsed;
        }
    }

    pub fn sample_count(&self) -> usize {
        self.path.len()
    }

    pub fn path(&self) -> &GhostPath {
        &self.path
    }
}

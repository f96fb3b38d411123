use anyhow::Context;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;

/// Pose is the instantaneous spatial state of a vehicle: a world position plus
/// an orientation.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Pose {
        Pose { position, rotation }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// * `position` - (m) World position of the vehicle at the sample time
/// * `rotation` - Vehicle orientation (unit quaternion, x/y/z/w)
/// * `timestamp` - (s) Elapsed time since recording start, non-negative
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GhostSample {
    pub position: Vec3,
    pub rotation: Quat,
    pub timestamp: f32,
}

impl GhostSample {
    pub fn new(pose: Pose, timestamp: f32) -> GhostSample {
        GhostSample {
            position: pose.position,
            rotation: pose.rotation,
            timestamp,
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }
}

/// GhostPath is an ordered sequence of timestamped samples, insertion order =
/// temporal order. Timestamps are non-decreasing in sequence order.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct GhostPath {
    pub samples: Vec<GhostSample>,
}

impl GhostPath {
    pub fn new() -> GhostPath {
        GhostPath {
            samples: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// duration returns the timestamp of the last sample, or 0.0 for an empty path.
    pub fn duration(&self) -> f32 {
        self.samples.last().map_or(0.0, |sample| sample.timestamp)
    }
}

/// save_ghost_path encodes the path as a JSON object with a single `samples`
/// array and writes it to filepath, creating parent directories as needed.
pub fn save_ghost_path(path: &GhostPath, filepath: &Path) -> anyhow::Result<()> {
    if let Some(parent) = filepath.parent() {
        std::fs::create_dir_all(parent).context(format!(
            "Failed to create ghost directory {}!",
            parent.display()
        ))?;
    }

    let fh = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(filepath)
        .context(format!("Failed to open ghost file {}!", filepath.display()))?;
    serde_json::to_writer(&fh, path).context(format!(
        "Failed to encode ghost file {}!",
        filepath.display()
    ))?;

    Ok(())
}

/// load_ghost_path reads the JSON file and decodes it into a ghost path.
pub fn load_ghost_path(filepath: &Path) -> anyhow::Result<GhostPath> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open ghost file {}!", filepath.display()))?;
    let path = serde_json::from_reader(&fh).context(format!(
        "Failed to parse ghost file {}!",
        filepath.display()
    ))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_path() -> GhostPath {
        let mut path = GhostPath::new();
        for i in 0..5 {
            let t = i as f32 * 0.05;
            path.samples.push(GhostSample::new(
                Pose::new(
                    Vec3::new(t * 10.0, 0.25, -t * 2.0),
                    Quat::from_rotation_y(t),
                ),
                t,
            ));
        }
        path
    }

    #[test]
    fn duration_is_last_timestamp() {
        assert_eq!(GhostPath::new().duration(), 0.0);
        assert_eq!(sample_path().duration(), 0.2);
    }

    #[test]
    fn save_then_load_round_trips_exactly() {
        let path = sample_path();
        let filepath = std::env::temp_dir().join(format!(
            "raceflow_ghost_roundtrip_{}.json",
            std::process::id()
        ));

        save_ghost_path(&path, &filepath).unwrap();
        let loaded = load_ghost_path(&filepath).unwrap();
        std::fs::remove_file(&filepath).unwrap();

        assert_eq!(loaded.len(), path.len());
        assert_eq!(loaded, path);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let filepath = std::env::temp_dir().join("raceflow_ghost_does_not_exist.json");
        assert!(load_ghost_path(&filepath).is_err());
    }
}

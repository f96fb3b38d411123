use crate::core::ghost::Pose;
use anyhow::Context;
use glam::Vec3;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// * `recording_interval` - (s) Minimum spacing between two recorded ghost samples
/// * `save_dir` - Directory holding persisted ghost files
/// * `save_file_name` - Ghost file name inside the save directory (without extension)
/// * `ghost_y_offset` - (m) Vertical offset applied to the replayed ghost position,
/// compensating for the visual body offset of the vehicle model
/// * `start_pose` - Start-line placement of the player vehicle
/// * `finish_zone_center` - (m) Center of the finish trigger volume
/// * `finish_zone_half_extents` - (m) Half extents of the finish trigger volume
/// * `target_speed` - (m/s) Demo driver target speed along the centerline
#[derive(Debug, Deserialize, Clone)]
pub struct RaceConfig {
    #[serde(default = "default_recording_interval")]
    pub recording_interval: f32,
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
    #[serde(default = "default_save_file_name")]
    pub save_file_name: String,
    #[serde(default)]
    pub ghost_y_offset: f32,
    #[serde(default)]
    pub start_pose: Option<Pose>,
    #[serde(default = "default_finish_zone_center")]
    pub finish_zone_center: Vec3,
    #[serde(default = "default_finish_zone_half_extents")]
    pub finish_zone_half_extents: Vec3,
    #[serde(default = "default_target_speed")]
    pub target_speed: f32,
}

fn default_recording_interval() -> f32 {
    0.05
}

fn default_save_dir() -> PathBuf {
    PathBuf::from("output/ghosts")
}

fn default_save_file_name() -> String {
    "ghost_data".to_string()
}

fn default_finish_zone_center() -> Vec3 {
    Vec3::new(0.0, 0.0, 0.0)
}

fn default_finish_zone_half_extents() -> Vec3 {
    Vec3::new(2.0, 3.0, 8.0)
}

fn default_target_speed() -> f32 {
    25.0
}

impl Default for RaceConfig {
    fn default() -> Self {
        RaceConfig {
            recording_interval: default_recording_interval(),
            save_dir: default_save_dir(),
            save_file_name: default_save_file_name(),
            ghost_y_offset: 0.0,
            start_pose: Some(Pose::default()),
            finish_zone_center: default_finish_zone_center(),
            finish_zone_half_extents: default_finish_zone_half_extents(),
            target_speed: default_target_speed(),
        }
    }
}

impl RaceConfig {
    /// ghost_file_path returns the full path of the persisted ghost file.
    pub fn ghost_file_path(&self) -> PathBuf {
        self.save_dir.join(format!("{}.json", self.save_file_name))
    }
}

/// read_race_config reads the JSON file and decodes the JSON string into the
/// race configuration struct.
pub fn read_race_config(filepath: &Path) -> anyhow::Result<RaceConfig> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open parameter file {}!",
            filepath.display()
        ))?;
    let config: RaceConfig = serde_json::from_reader(&fh).context(format!(
        "Failed to parse parameter file {}!",
        filepath.display()
    ))?;

    if config.recording_interval <= 0.0 {
        anyhow::bail!(
            "Recording interval must be positive, but is {:.3}s!",
            config.recording_interval
        );
    }

    Ok(config)
}

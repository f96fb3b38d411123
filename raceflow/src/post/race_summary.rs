use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::io::Write as IoWrite;

/// RaceSummary contains the outcome of one finished race that is required
/// for post-processing.
///
/// * `race_no` - 1-based race index within the session
/// * `lap_time` - (s) Time from race start to the finish-line crossing
/// * `sample_count` - Number of ghost samples recorded during the lap
/// * `ghost_lap_time` - (s) Lap time of the ghost that was raced against, if any
/// * `ghost_saved` - True if this lap's recording became the saved ghost
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RaceSummary {
    pub race_no: u32,
    pub lap_time: f32,
    pub sample_count: usize,
    pub ghost_lap_time: Option<f32>,
    pub ghost_saved: bool,
}

impl RaceSummary {
    fn format_lines(&self) -> String {
        let mut content = String::new();

        writeln!(&mut content, "RESULT: Race {}", self.race_no).unwrap();
        writeln!(&mut content, "  lap time:     {:8.3}s", self.lap_time).unwrap();
        writeln!(&mut content, "  ghost samples: {:7}", self.sample_count).unwrap();

        match self.ghost_lap_time {
            Some(ghost_lap_time) => {
                writeln!(&mut content, "  ghost lap:    {:8.3}s", ghost_lap_time).unwrap();
                writeln!(
                    &mut content,
                    "  gap to ghost: {:+8.3}s",
                    self.lap_time - ghost_lap_time
                )
                .unwrap();
            }
            None => writeln!(&mut content, "  ghost lap:        none").unwrap(),
        }

        if self.ghost_saved {
            writeln!(&mut content, "  recording saved as the new ghost").unwrap();
        }

        content
    }

    /// print_summary prints the race outcome to the console output.
    pub fn print_summary(&self) {
        print!("{}", self.format_lines());
    }

    /// write_summary_to_file writes the race outcome to a text file in output/.
    /// Returns the path to the written file.
    pub fn write_summary_to_file(
        &self,
        path: Option<&std::path::Path>,
    ) -> anyhow::Result<String> {
        let out_dir = std::path::Path::new("output");
        std::fs::create_dir_all(out_dir)?;
        let out_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            out_dir.join("last_run.txt")
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)?;
        file.write_all(self.format_lines().as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

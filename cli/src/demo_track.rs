use anyhow::Context;
use glam::{Quat, Vec3};
use helpers::general::lin_interp;
use raceflow::core::ghost::Pose;
use raceflow::interfaces::host_interface::TrackProbe;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// One centerline row of a track file. The centerline lies in the ground
/// plane: `x_m` maps to world x, `y_m` maps to world z.
#[derive(Debug, Deserialize, Clone)]
pub struct CsvTrackEl {
    pub x_m: f64,
    pub y_m: f64,
    pub w_tr_left_m: f64,
    pub w_tr_right_m: f64,
}

/// DemoTrack stands in for the host engine's road geometry: a closed
/// centerline polyline with a per-point track width. The demo driver follows
/// it and the probe implementation reports surface contact within the width.
#[derive(Debug, Clone)]
pub struct DemoTrack {
    // closed polyline: the first point is repeated at the end
    xs: Vec<f64>,
    zs: Vec<f64>,
    half_widths: Vec<f64>,
    cum_dists: Vec<f64>,
    length: f64,
}

impl DemoTrack {
    pub fn from_centerline(points: &[CsvTrackEl]) -> anyhow::Result<DemoTrack> {
        if points.len() < 3 {
            anyhow::bail!(
                "Track centerline needs at least 3 points, but has {}!",
                points.len()
            );
        }

        let mut xs: Vec<f64> = points.iter().map(|p| p.x_m).collect();
        let mut zs: Vec<f64> = points.iter().map(|p| p.y_m).collect();
        let mut half_widths: Vec<f64> = points
            .iter()
            .map(|p| (p.w_tr_left_m + p.w_tr_right_m) / 2.0)
            .collect();

        // close the loop
        xs.push(xs[0]);
        zs.push(zs[0]);
        half_widths.push(half_widths[0]);

        let mut cum_dists = vec![0.0; xs.len()];
        for i in 1..xs.len() {
            let dx = xs[i] - xs[i - 1];
            let dz = zs[i] - zs[i - 1];
            cum_dists[i] = cum_dists[i - 1] + (dx * dx + dz * dz).sqrt();
        }
        let length = *cum_dists.last().unwrap();

        if length <= 0.0 {
            anyhow::bail!("Track centerline has zero length!");
        }

        Ok(DemoTrack {
            xs,
            zs,
            half_widths,
            cum_dists,
            length,
        })
    }

    /// default_oval returns a generated 80 m x 50 m ellipse with a 6 m track
    /// width on both sides, used when no track file is provided.
    pub fn default_oval() -> DemoTrack {
        let no_points = 72;
        let points: Vec<CsvTrackEl> = (0..no_points)
            .map(|i| {
                let theta = i as f64 / no_points as f64 * 2.0 * std::f64::consts::PI;
                CsvTrackEl {
                    x_m: 80.0 * theta.cos(),
                    y_m: 50.0 * theta.sin(),
                    w_tr_left_m: 6.0,
                    w_tr_right_m: 6.0,
                }
            })
            .collect();

        DemoTrack::from_centerline(&points).expect("Generated oval centerline must be valid!")
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// pose_at returns the centerline pose at arclength s (wrapped onto the
    /// lap), with the rotation facing along the driving direction.
    pub fn pose_at(&self, s: f64) -> Pose {
        let s = s.rem_euclid(self.length);
        let x = lin_interp(s, &self.cum_dists, &self.xs);
        let z = lin_interp(s, &self.cum_dists, &self.zs);

        // heading from the local segment direction
        let seg = self.segment_index(s);
        let dx = self.xs[seg + 1] - self.xs[seg];
        let dz = self.zs[seg + 1] - self.zs[seg];
        let yaw = dx.atan2(dz) as f32;

        Pose::new(
            Vec3::new(x as f32, 0.0, z as f32),
            Quat::from_rotation_y(yaw),
        )
    }

    /// half_width_at returns the interpolated track half width at arclength s.
    pub fn half_width_at(&self, s: f64) -> f64 {
        lin_interp(s.rem_euclid(self.length), &self.cum_dists, &self.half_widths)
    }

    /// project returns the arclength of the closest centerline point and the
    /// lateral distance of `position` from it.
    pub fn project(&self, position: Vec3) -> (f64, f64) {
        let px = position.x as f64;
        let pz = position.z as f64;

        let mut best_s = 0.0;
        let mut best_dist_sq = f64::INFINITY;

        for i in 0..self.xs.len() - 1 {
            let ax = self.xs[i];
            let az = self.zs[i];
            let bx = self.xs[i + 1];
            let bz = self.zs[i + 1];

            let seg_dx = bx - ax;
            let seg_dz = bz - az;
            let seg_len_sq = seg_dx * seg_dx + seg_dz * seg_dz;
            if seg_len_sq == 0.0 {
                continue;
            }

            let t = (((px - ax) * seg_dx + (pz - az) * seg_dz) / seg_len_sq).clamp(0.0, 1.0);
            let cx = ax + t * seg_dx;
            let cz = az + t * seg_dz;
            let dist_sq = (px - cx) * (px - cx) + (pz - cz) * (pz - cz);

            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best_s = self.cum_dists[i] + t * seg_len_sq.sqrt();
            }
        }

        (best_s, best_dist_sq.sqrt())
    }

    fn segment_index(&self, s: f64) -> usize {
        for i in 1..self.cum_dists.len() {
            if s <= self.cum_dists[i] {
                return i - 1;
            }
        }
        self.cum_dists.len() - 2
    }
}

impl TrackProbe for DemoTrack {
    /// The surface sits at y = 0 under the centerline strip: contact requires
    /// the probe origin to be above it within range and laterally inside the
    /// track width.
    fn hit_track_below(&self, origin: Vec3, max_distance: f32) -> bool {
        if origin.y < 0.0 || origin.y > max_distance {
            return false;
        }
        let (s, lateral) = self.project(origin);
        lateral <= self.half_width_at(s)
    }
}

/// read_demo_track reads the centerline CSV file and builds the demo track.
pub fn read_demo_track(filepath: &Path) -> anyhow::Result<DemoTrack> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!(
            "Failed to open track file {}!",
            filepath.display()
        ))?;

    let mut csv_reader = csv::Reader::from_reader(&fh);
    let mut centerline: Vec<CsvTrackEl> = vec![];

    for result in csv_reader.deserialize() {
        let track_el: CsvTrackEl = result.context(format!(
            "Failed to parse track file {}!",
            filepath.display()
        ))?;
        centerline.push(track_el);
    }

    DemoTrack::from_centerline(&centerline)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oval_probe_accepts_the_centerline_and_rejects_the_infield() {
        let track = DemoTrack::default_oval();

        let on_track = track.pose_at(25.0).position + Vec3::Y;
        assert!(track.hit_track_below(on_track, 3.0));

        // center of the infield is far from the strip
        assert!(!track.hit_track_below(Vec3::new(0.0, 1.0, 0.0), 3.0));

        // above probe range
        let too_high = track.pose_at(25.0).position + Vec3::Y * 10.0;
        assert!(!track.hit_track_below(too_high, 3.0));
    }

    #[test]
    fn projection_recovers_the_arclength() {
        let track = DemoTrack::default_oval();
        let pose = track.pose_at(100.0);

        let (s, lateral) = track.project(pose.position);
        assert!((s - 100.0).abs() < 1.0);
        assert!(lateral < 0.01);
    }

    #[test]
    fn pose_at_wraps_around_the_lap() {
        let track = DemoTrack::default_oval();
        let a = track.pose_at(10.0);
        let b = track.pose_at(track.length() + 10.0);
        assert!((a.position - b.position).length() < 1e-3);
    }
}

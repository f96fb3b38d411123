use crate::core::ghost::{GhostPath, Pose};
use glam::Vec3;
use helpers::general::clamp01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
}

/// GhostPlayer replays a recorded path by interpolating between successive
/// timestamped samples. The ghost it drives is a passive visual proxy: it has
/// no collision response and takes no driver input, it is only a pose the
/// host renders.
///
/// The play cursor scans monotonically forward and never rewinds; when it
/// reaches the final sample the player snaps the ghost onto it and stops
/// (no looping).
#[derive(Debug)]
pub struct GhostPlayer {
    path: GhostPath,
    cursor: usize,
    play_time: f32,
    position_offset: Vec3,
    current_pose: Pose,
    state: PlaybackState,
}

impl GhostPlayer {
    /// start_playback spawns a player over a copy of the path and places the
    /// ghost instantly at the first sample's pose plus the vertical offset.
    /// Returns None for an empty path, which has nothing to replay.
    pub fn start_playback(path: &GhostPath, position_offset: Vec3) -> Option<GhostPlayer> {
        let first = path.samples.first()?;
        let current_pose = Pose::new(first.position + position_offset, first.rotation);

        Some(GhostPlayer {
            path: path.clone(),
            cursor: 0,
            play_time: 0.0,
            position_offset,
            current_pose,
            state: PlaybackState::Playing,
        })
    }

    /// stop_playback halts cursor advancement without altering the displayed
    /// pose.
    pub fn stop_playback(&mut self) {
        self.state = PlaybackState::Idle;
        self.cursor = 0;
    }

    /// advance moves the play clock forward by the given elapsed-time delta
    /// and refreshes the interpolated pose. A zero delta (frozen clock)
    /// leaves the pose where it is.
    pub fn advance(&mut self, dt: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }

        self.play_time += dt;

        // skip forward past every sample whose successor is already due
        while self.cursor < self.path.len() - 1
            && self.path.samples[self.cursor + 1].timestamp <= self.play_time
        {
            self.cursor += 1;
        }

        // end of the recorded path: snap to the final sample and stop
        if self.cursor >= self.path.len() - 1 {
            let last = &self.path.samples[self.path.len() - 1];
            self.current_pose = Pose::new(last.position + self.position_offset, last.rotation);
            self.stop_playback();
            return;
        }

        let cur = &self.path.samples[self.cursor];
        let next = &self.path.samples[self.cursor + 1];

        // fraction 0 on a zero-duration segment avoids the division
        let span = next.timestamp - cur.timestamp;
        let frac = if span > 0.0 {
            clamp01((self.play_time - cur.timestamp) / span)
        } else {
            0.0
        };

        let position = cur.position.lerp(next.position, frac) + self.position_offset;
        let rotation = cur.rotation.slerp(next.rotation, frac);
        self.current_pose = Pose::new(position, rotation);
    }

    pub fn current_pose(&self) -> Pose {
        self.current_pose
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// duration returns the timestamp of the last sample of the replayed path.
    pub fn duration(&self) -> f32 {
        self.path.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ghost::GhostSample;
    use approx::assert_relative_eq;
    use glam::Quat;

    fn straight_line_path() -> GhostPath {
        // x advances 10 m/s, sampled every 0.1 s for one second
        let mut path = GhostPath::new();
        for i in 0..=10 {
            let t = i as f32 * 0.1;
            path.samples.push(GhostSample::new(
                Pose::new(Vec3::new(t * 10.0, 0.0, 0.0), Quat::IDENTITY),
                t,
            ));
        }
        path
    }

    #[test]
    fn empty_path_does_not_start() {
        assert!(GhostPlayer::start_playback(&GhostPath::new(), Vec3::ZERO).is_none());
    }

    #[test]
    fn starts_at_first_sample_with_offset() {
        let offset = Vec3::new(0.0, 0.4, 0.0);
        let player = GhostPlayer::start_playback(&straight_line_path(), offset).unwrap();

        assert!(player.is_playing());
        assert_eq!(player.current_pose().position, offset);
    }

    #[test]
    fn interpolated_position_lies_on_the_segment() {
        let mut player = GhostPlayer::start_playback(&straight_line_path(), Vec3::ZERO).unwrap();

        // mid-segment between t=0.1 and t=0.2
        player.advance(0.15);
        assert_relative_eq!(player.current_pose().position.x, 1.5, epsilon = 1e-4);

        // quarter into the next segment
        player.advance(0.075);
        assert_relative_eq!(player.current_pose().position.x, 2.25, epsilon = 1e-4);
        assert!(player.is_playing());
    }

    #[test]
    fn playback_past_the_end_snaps_to_final_pose_and_stops() {
        let offset = Vec3::new(0.0, 0.4, 0.0);
        let mut player = GhostPlayer::start_playback(&straight_line_path(), offset).unwrap();

        player.advance(5.0);

        assert!(!player.is_playing());
        assert_eq!(
            player.current_pose().position,
            Vec3::new(10.0, 0.4, 0.0)
        );

        // further advancement is a no-op once idle
        player.advance(1.0);
        assert_eq!(
            player.current_pose().position,
            Vec3::new(10.0, 0.4, 0.0)
        );
    }

    #[test]
    fn zero_duration_segment_uses_the_earlier_sample() {
        let mut path = GhostPath::new();
        path.samples.push(GhostSample::new(
            Pose::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY),
            0.5,
        ));
        path.samples.push(GhostSample::new(
            Pose::new(Vec3::new(2.0, 0.0, 0.0), Quat::IDENTITY),
            0.5,
        ));
        path.samples.push(GhostSample::new(
            Pose::new(Vec3::new(3.0, 0.0, 0.0), Quat::IDENTITY),
            1.0,
        ));

        let mut player = GhostPlayer::start_playback(&path, Vec3::ZERO).unwrap();
        player.advance(0.25);

        // before the duplicate timestamp: still interpolating toward it
        assert!(player.current_pose().position.x <= 2.0);
        assert!(player.is_playing());
    }

    #[test]
    fn stop_playback_keeps_the_displayed_pose() {
        let mut player = GhostPlayer::start_playback(&straight_line_path(), Vec3::ZERO).unwrap();
        player.advance(0.35);
        let frozen = player.current_pose();

        player.stop_playback();
        player.advance(1.0);

        assert_eq!(player.current_pose(), frozen);
    }

    #[test]
    fn rotation_interpolates_between_samples() {
        let mut path = GhostPath::new();
        path.samples.push(GhostSample::new(
            Pose::new(Vec3::ZERO, Quat::IDENTITY),
            0.0,
        ));
        path.samples.push(GhostSample::new(
            Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            1.0,
        ));
        path.samples.push(GhostSample::new(
            Pose::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::PI)),
            2.0,
        ));

        let mut player = GhostPlayer::start_playback(&path, Vec3::ZERO).unwrap();
        player.advance(0.5);

        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4);
        let rotation = player.current_pose().rotation;
        assert_relative_eq!(rotation.dot(expected).abs(), 1.0, epsilon = 1e-4);
    }
}

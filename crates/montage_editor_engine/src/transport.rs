// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback transport: playhead position, play state, speed and loop
//! range.

use serde::{Deserialize, Serialize};

/// Playback speed presets offered by the transport bar
pub const SPEED_PRESETS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

/// One frame at the editing frame rate (30 fps)
pub const FRAME_STEP: f64 = 1.0 / 30.0;

/// Coarse jump distance in seconds
pub const JUMP_SECONDS: f64 = 5.0;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not playing, playhead keeps its position
    #[default]
    Paused,
    /// Advancing at `speed`
    Playing,
}

/// Playback transport for the composition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transport {
    /// Playhead position in seconds
    pub playhead: f64,
    /// Current playback state
    pub state: PlaybackState,
    /// Playback speed multiplier
    pub speed: f64,
    /// Whether playback wraps at the end
    pub looping: bool,
    /// Loop range start, when a sub-range loop is set
    pub loop_start: Option<f64>,
    /// Loop range end, when a sub-range loop is set
    pub loop_end: Option<f64>,
}

impl Transport {
    /// Create a paused transport at time zero
    pub fn new() -> Self {
        Self {
            playhead: 0.0,
            state: PlaybackState::Paused,
            speed: 1.0,
            looping: false,
            loop_start: None,
            loop_end: None,
        }
    }

    /// Whether playback is running
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Start playback
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
        tracing::debug!(playhead = self.playhead, "play");
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Toggle between playing and paused
    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.play(),
        }
    }

    /// Move the playhead, clamped into the composition
    pub fn seek(&mut self, time: f64, duration: f64) {
        self.playhead = time.clamp(0.0, duration);
    }

    /// Step one frame forward or backward
    pub fn step_frame(&mut self, forward: bool, duration: f64) {
        let delta = if forward { FRAME_STEP } else { -FRAME_STEP };
        self.seek(self.playhead + delta, duration);
    }

    /// Jump a coarse distance forward or backward
    pub fn jump(&mut self, forward: bool, duration: f64) {
        let delta = if forward { JUMP_SECONDS } else { -JUMP_SECONDS };
        self.seek(self.playhead + delta, duration);
    }

    /// Set the playback speed; snaps to the nearest preset
    pub fn set_speed(&mut self, speed: f64) {
        let nearest = SPEED_PRESETS
            .iter()
            .copied()
            .min_by(|a, b| {
                (a - speed)
                    .abs()
                    .partial_cmp(&(b - speed).abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(1.0);
        self.speed = nearest;
    }

    /// Set or clear the loop range. Passing a reversed range swaps it.
    pub fn set_loop_range(&mut self, range: Option<(f64, f64)>) {
        match range {
            Some((a, b)) => {
                self.loop_start = Some(a.min(b));
                self.loop_end = Some(a.max(b));
            }
            None => {
                self.loop_start = None;
                self.loop_end = None;
            }
        }
    }

    /// Advance the playhead by a wall-clock delta. Wraps at the loop
    /// end (or the composition end when looping), otherwise pauses at
    /// the end.
    pub fn update(&mut self, delta_seconds: f64, duration: f64) {
        if !self.is_playing() {
            return;
        }
        self.playhead += delta_seconds * self.speed;
        let end = self.loop_end.unwrap_or(duration);
        if self.playhead >= end {
            if self.looping || self.loop_end.is_some() {
                self.playhead = self.loop_start.unwrap_or(0.0);
            } else {
                self.playhead = duration;
                self.pause();
            }
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_clamps() {
        let mut transport = Transport::new();
        transport.seek(75.0, 60.0);
        assert_eq!(transport.playhead, 60.0);
        transport.seek(-5.0, 60.0);
        assert_eq!(transport.playhead, 0.0);
    }

    #[test]
    fn test_frame_step() {
        let mut transport = Transport::new();
        transport.step_frame(true, 60.0);
        assert!((transport.playhead - FRAME_STEP).abs() < 1e-12);
        transport.step_frame(false, 60.0);
        transport.step_frame(false, 60.0);
        assert_eq!(transport.playhead, 0.0);
    }

    #[test]
    fn test_update_pauses_at_end() {
        let mut transport = Transport::new();
        transport.seek(59.5, 60.0);
        transport.play();
        transport.update(1.0, 60.0);
        assert_eq!(transport.playhead, 60.0);
        assert!(!transport.is_playing());
    }

    #[test]
    fn test_update_wraps_loop_range() {
        let mut transport = Transport::new();
        transport.set_loop_range(Some((10.0, 20.0)));
        transport.seek(19.5, 60.0);
        transport.play();
        transport.update(1.0, 60.0);
        assert_eq!(transport.playhead, 10.0);
        assert!(transport.is_playing());
    }

    #[test]
    fn test_speed_snaps_to_preset() {
        let mut transport = Transport::new();
        transport.set_speed(1.4);
        assert_eq!(transport.speed, 1.5);
        transport.set_speed(0.1);
        assert_eq!(transport.speed, 0.5);
    }
}

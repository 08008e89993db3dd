// SPDX-License-Identifier: MIT OR Apache-2.0
//! Media playback synchronization.
//!
//! The editor does not decode media; a [`MediaPlayback`] backend
//! (platform video/audio elements, or a null backend in tests) gets
//! told which clips should be playing and where. [`sync`] diffs the
//! transport against every visible time-bearing clip once per tick,
//! and [`apply_progress`] feeds the backend's own media clock back
//! into the shared playhead so long clips do not drift.

use montage_editor_engine::Transport;
use montage_editor_scene::{ItemId, MediaKind, Scene};

/// The seam to actual media elements
pub trait MediaPlayback {
    /// Start or stop a clip
    fn set_playing(&mut self, id: ItemId, playing: bool);
    /// Seek a clip to a local time (seconds from the clip's own start)
    fn seek(&mut self, id: ItemId, local_time: f64);
    /// Set a clip's playback rate
    fn set_rate(&mut self, id: ItemId, rate: f64);
}

/// A time-progress report from the backend's media clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackProgress {
    /// The reporting clip
    pub item: ItemId,
    /// Seconds from the clip's own start
    pub media_time: f64,
}

/// Consume a backend progress report. While the transport is playing
/// and the reporting clip sits under the playhead, the clip's media
/// clock drives the shared playhead.
pub fn apply_progress(scene: &Scene, transport: &mut Transport, report: PlaybackProgress) {
    if !transport.is_playing() {
        return;
    }
    let Some(range) = scene.item(report.item).and_then(|item| item.temporal) else {
        return;
    };
    if transport.playhead < range.start_time || transport.playhead >= range.end_time() {
        return;
    }
    let time = range.start_time + report.media_time.clamp(0.0, range.duration);
    transport.seek(time, scene.duration);
}

/// Push the transport state to the backend. A clip is active when the
/// transport is playing, its track is visible and the playhead lies
/// inside its range; active clips are seeked to their local time and
/// follow the transport speed.
pub fn sync(scene: &Scene, transport: &Transport, backend: &mut dyn MediaPlayback) {
    for item in scene.items() {
        if !matches!(item.kind, MediaKind::Video | MediaKind::Audio) {
            continue;
        }
        let Some(range) = item.temporal else {
            continue;
        };
        let visible = scene.track(item.kind).visible;
        let under_playhead =
            transport.playhead >= range.start_time && transport.playhead < range.end_time();
        let active = transport.is_playing() && visible && under_playhead;
        if active {
            backend.seek(item.id, transport.playhead - range.start_time);
            backend.set_rate(item.id, transport.speed);
        }
        backend.set_playing(item.id, active);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_editor_scene::{Item, Spatial, TimeRange};
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingBackend {
        playing: HashMap<ItemId, bool>,
        seeks: HashMap<ItemId, f64>,
        rates: HashMap<ItemId, f64>,
    }

    impl MediaPlayback for RecordingBackend {
        fn set_playing(&mut self, id: ItemId, playing: bool) {
            self.playing.insert(id, playing);
        }
        fn seek(&mut self, id: ItemId, local_time: f64) {
            self.seeks.insert(id, local_time);
        }
        fn set_rate(&mut self, id: ItemId, rate: f64) {
            self.rates.insert(id, rate);
        }
    }

    fn fixture() -> (Scene, ItemId, ItemId) {
        let mut scene = Scene::new(60.0);
        let early = scene.add_item(
            Item::media(MediaKind::Video, "a.mp4", Spatial::new(0.0, 0.0, 100.0, 100.0))
                .with_time_range(TimeRange::new(0.0, 10.0)),
        );
        let late = scene.add_item(
            Item::media(MediaKind::Audio, "b.ogg", Spatial::new(0.0, 0.0, 1.0, 1.0))
                .with_time_range(TimeRange::new(30.0, 10.0)),
        );
        (scene, early, late)
    }

    #[test]
    fn test_only_clips_under_playhead_play() {
        let (scene, early, late) = fixture();
        let mut transport = Transport::new();
        transport.seek(5.0, 60.0);
        transport.play();
        let mut backend = RecordingBackend::default();
        sync(&scene, &transport, &mut backend);
        assert!(backend.playing[&early]);
        assert!(!backend.playing[&late]);
        assert_eq!(backend.seeks[&early], 5.0);
    }

    #[test]
    fn test_paused_transport_stops_everything() {
        let (scene, early, late) = fixture();
        let mut transport = Transport::new();
        transport.seek(5.0, 60.0);
        let mut backend = RecordingBackend::default();
        sync(&scene, &transport, &mut backend);
        assert!(!backend.playing[&early]);
        assert!(!backend.playing[&late]);
    }

    #[test]
    fn test_hidden_track_stays_silent() {
        let (mut scene, early, _late) = fixture();
        scene.set_track_visible(MediaKind::Video, false);
        let mut transport = Transport::new();
        transport.seek(5.0, 60.0);
        transport.play();
        let mut backend = RecordingBackend::default();
        sync(&scene, &transport, &mut backend);
        assert!(!backend.playing[&early]);
    }

    #[test]
    fn test_progress_report_drives_playhead() {
        let (scene, early, _late) = fixture();
        let mut transport = Transport::new();
        transport.seek(2.0, 60.0);
        transport.play();
        apply_progress(
            &scene,
            &mut transport,
            PlaybackProgress {
                item: early,
                media_time: 3.5,
            },
        );
        assert_eq!(transport.playhead, 3.5);
    }

    #[test]
    fn test_progress_ignored_when_paused_or_off_playhead() {
        let (scene, early, late) = fixture();
        let mut transport = Transport::new();
        transport.seek(2.0, 60.0);
        apply_progress(
            &scene,
            &mut transport,
            PlaybackProgress {
                item: early,
                media_time: 5.0,
            },
        );
        assert_eq!(transport.playhead, 2.0);

        // Playing, but the reporting clip is not under the playhead
        transport.play();
        apply_progress(
            &scene,
            &mut transport,
            PlaybackProgress {
                item: late,
                media_time: 1.0,
            },
        );
        assert_eq!(transport.playhead, 2.0);
    }

    #[test]
    fn test_rate_follows_transport_speed() {
        let (scene, early, _late) = fixture();
        let mut transport = Transport::new();
        transport.seek(5.0, 60.0);
        transport.set_speed(2.0);
        transport.play();
        let mut backend = RecordingBackend::default();
        sync(&scene, &transport, &mut backend);
        assert_eq!(backend.rates[&early], 2.0);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Snap engine for timeline drags.
//!
//! Snapping is one-dimensional: a moving value (a clip edge or the
//! playhead) is pulled onto the nearest candidate within a threshold
//! proportional to the composition length. Candidates are the
//! composition bounds, the playhead and the edges of every other clip.

use montage_editor_scene::{ItemId, Scene};
use serde::{Deserialize, Serialize};

/// Snap threshold as a fraction of the composition duration
pub const SNAP_THRESHOLD_FRACTION: f64 = 0.02;

/// What a snapped value locked onto
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SnapKind {
    /// Start of the composition (time zero)
    TimelineStart,
    /// End of the composition
    TimelineEnd,
    /// The playhead
    Playhead,
    /// Start or end of another clip
    ClipEdge(ItemId),
}

/// A single snap target on the time axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapCandidate {
    /// Time in seconds
    pub value: f64,
    /// What produced this candidate
    pub kind: SnapKind,
}

/// The result of a successful snap, reported back to the host so it
/// can draw an indicator line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapHit {
    /// The snapped-to time in seconds
    pub value: f64,
    /// What the value locked onto
    pub kind: SnapKind,
    /// Distance from the raw value, in seconds
    pub distance: f64,
}

/// Collect snap candidates for a drag, excluding the clips being
/// dragged so they cannot snap to themselves.
pub fn candidates(scene: &Scene, exclude: &[ItemId], playhead: f64) -> Vec<SnapCandidate> {
    let mut out = vec![
        SnapCandidate {
            value: 0.0,
            kind: SnapKind::TimelineStart,
        },
        SnapCandidate {
            value: scene.duration,
            kind: SnapKind::TimelineEnd,
        },
        SnapCandidate {
            value: playhead,
            kind: SnapKind::Playhead,
        },
    ];
    for item in scene.items() {
        if exclude.contains(&item.id) {
            continue;
        }
        if let Some(range) = item.temporal {
            out.push(SnapCandidate {
                value: range.start_time,
                kind: SnapKind::ClipEdge(item.id),
            });
            out.push(SnapCandidate {
                value: range.end_time(),
                kind: SnapKind::ClipEdge(item.id),
            });
        }
    }
    out
}

/// Snap a single value to the nearest candidate within the threshold.
/// Returns `None` when nothing is close enough.
pub fn snap_value(value: f64, candidates: &[SnapCandidate], duration: f64) -> Option<SnapHit> {
    let threshold = duration * SNAP_THRESHOLD_FRACTION;
    let mut best: Option<SnapHit> = None;
    for candidate in candidates {
        let distance = (candidate.value - value).abs();
        if distance > threshold {
            continue;
        }
        if best.map_or(true, |hit| distance < hit.distance) {
            best = Some(SnapHit {
                value: candidate.value,
                kind: candidate.kind,
                distance,
            });
        }
    }
    best
}

/// Snap a moving clip: both its start and end edges are tried against
/// the candidates and the closer hit wins. Returns the adjusted start
/// time together with the hit, or `None` when neither edge snaps.
pub fn snap_range(
    start: f64,
    duration: f64,
    candidates: &[SnapCandidate],
    composition_duration: f64,
) -> Option<(f64, SnapHit)> {
    let start_hit = snap_value(start, candidates, composition_duration);
    let end_hit = snap_value(start + duration, candidates, composition_duration);
    match (start_hit, end_hit) {
        (Some(s), Some(e)) => {
            if s.distance <= e.distance {
                Some((s.value, s))
            } else {
                Some((e.value - duration, e))
            }
        }
        (Some(s), None) => Some((s.value, s)),
        (None, Some(e)) => Some((e.value - duration, e)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_editor_scene::{Item, MediaKind, Spatial, TimeRange};

    fn scene_with_clips() -> (Scene, ItemId, ItemId) {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(
            Item::media(MediaKind::Video, "a.mp4", Spatial::new(0.0, 0.0, 100.0, 100.0))
                .with_time_range(TimeRange::new(10.0, 10.0)),
        );
        let b = scene.add_item(
            Item::media(MediaKind::Video, "b.mp4", Spatial::new(0.0, 0.0, 100.0, 100.0))
                .with_time_range(TimeRange::new(40.0, 5.0)),
        );
        (scene, a, b)
    }

    #[test]
    fn test_candidates_exclude_dragged_clip() {
        let (scene, a, b) = scene_with_clips();
        let list = candidates(&scene, &[a], 30.0);
        assert!(list.iter().any(|c| c.kind == SnapKind::ClipEdge(b)));
        assert!(!list.iter().any(|c| c.kind == SnapKind::ClipEdge(a)));
        assert!(list.iter().any(|c| c.kind == SnapKind::Playhead && c.value == 30.0));
    }

    #[test]
    fn test_snap_within_threshold() {
        let (scene, a, _b) = scene_with_clips();
        // 2% of 60s = 1.2s
        let list = candidates(&scene, &[a], 30.0);
        let hit = snap_value(29.2, &list, scene.duration).unwrap();
        assert_eq!(hit.kind, SnapKind::Playhead);
        assert_eq!(hit.value, 30.0);
        assert!(snap_value(28.0, &list, scene.duration).is_none());
    }

    #[test]
    fn test_snap_picks_nearest() {
        let (scene, a, b) = scene_with_clips();
        // Between the playhead at 41.0 and b's start at 40.0
        let list = candidates(&scene, &[a], 41.0);
        let hit = snap_value(40.3, &list, scene.duration).unwrap();
        assert_eq!(hit.kind, SnapKind::ClipEdge(b));
        assert_eq!(hit.value, 40.0);
    }

    #[test]
    fn test_snap_range_end_edge() {
        let (scene, a, b) = scene_with_clips();
        let list = candidates(&scene, &[a], 0.0);
        // A 10s clip whose end (39.5) is near b's start (40.0)
        let (start, hit) = snap_range(29.5, 10.0, &list, scene.duration).unwrap();
        assert_eq!(hit.kind, SnapKind::ClipEdge(b));
        assert_eq!(start, 30.0);
    }
}

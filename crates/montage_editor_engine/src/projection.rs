// SPDX-License-Identifier: MIT OR Apache-2.0
//! View projection: turning the scene into drawable canvas and
//! timeline descriptions.
//!
//! Projections are pure reads. The host hands them straight to its
//! painter; nothing here mutates the scene.

use crate::snap::SnapHit;
use montage_editor_scene::{
    rotated_aabb, time_to_x, ItemId, MediaKind, Rect, Scene, Vec2,
};
use serde::{Deserialize, Serialize};

/// Multiplicative zoom step
pub const ZOOM_STEP: f64 = 1.5;
/// Minimum canvas zoom
pub const ZOOM_MIN: f64 = 0.5;
/// Maximum canvas zoom
pub const ZOOM_MAX: f64 = 10.0;

/// Default timeline lane height in pixels
pub const LANE_HEIGHT_DEFAULT: f64 = 64.0;
/// Minimum lane height a divider drag can reach
pub const LANE_HEIGHT_MIN: f64 = 32.0;
/// Maximum lane height a divider drag can reach
pub const LANE_HEIGHT_MAX: f64 = 160.0;
/// Height of a collapsed lane
pub const LANE_HEIGHT_COLLAPSED: f64 = 24.0;

/// Canvas view transform: zoom about the origin plus a pan offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CanvasViewport {
    /// Zoom factor
    pub zoom: f64,
    /// Pan offset in screen pixels
    pub pan: Vec2,
}

impl CanvasViewport {
    /// Identity viewport
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::default(),
        }
    }

    /// Zoom in one step
    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Zoom out one step
    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    /// Reset to identity
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Canvas point to screen point
    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        point.scale(self.zoom).add(self.pan)
    }

    /// Screen point back to canvas point
    pub fn to_canvas(&self, point: Vec2) -> Vec2 {
        point.sub(self.pan).scale(1.0 / self.zoom)
    }

    /// Canvas rect to screen rect
    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        let origin = self.to_screen(Vec2::new(rect.x, rect.y));
        Rect::new(origin.x, origin.y, rect.width * self.zoom, rect.height * self.zoom)
    }
}

impl Default for CanvasViewport {
    fn default() -> Self {
        Self::new()
    }
}

/// Timeline view geometry: ruler width plus per-lane height overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineViewport {
    /// Ruler width in pixels
    pub width: f64,
    heights: Vec<(MediaKind, f64)>,
}

impl TimelineViewport {
    /// Create a viewport with default lane heights
    pub fn new(width: f64) -> Self {
        Self {
            width,
            heights: Vec::new(),
        }
    }

    /// Effective height of a lane
    pub fn lane_height(&self, kind: MediaKind, collapsed: bool) -> f64 {
        if collapsed {
            return LANE_HEIGHT_COLLAPSED;
        }
        self.heights
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(LANE_HEIGHT_DEFAULT, |(_, h)| *h)
    }

    /// Override a lane's height, clamped to the divider range
    pub fn set_lane_height(&mut self, kind: MediaKind, height: f64) {
        let clamped = height.clamp(LANE_HEIGHT_MIN, LANE_HEIGHT_MAX);
        if let Some(entry) = self.heights.iter_mut().find(|(k, _)| *k == kind) {
            entry.1 = clamped;
        } else {
            self.heights.push((kind, clamped));
        }
    }
}

/// One item as drawn on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasItemVisual {
    /// Item id
    pub id: ItemId,
    /// Media kind
    pub kind: MediaKind,
    /// Unrotated frame in screen pixels
    pub frame: Rect,
    /// Axis-aligned bounds of the rotated frame, for hit/overlap tests
    pub bounds: Rect,
    /// Rotation in degrees
    pub rotation_degrees: f64,
    /// Whether the item is selected
    pub selected: bool,
    /// Whether it is the primary selected item
    pub primary: bool,
    /// Whether the item (or its track) is locked
    pub locked: bool,
    /// Whether a manipulation session is previewing this item
    pub manipulating: bool,
    /// Stacking order
    pub z_index: i64,
}

/// The canvas projection: items in paint order plus overlays
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasVisual {
    /// Items in back-to-front paint order
    pub items: Vec<CanvasItemVisual>,
    /// Marquee rectangle while a marquee session runs
    pub marquee: Option<Rect>,
}

/// One clip as drawn in the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineClipVisual {
    /// Item id
    pub id: ItemId,
    /// Clip rectangle in timeline pixels
    pub rect: Rect,
    /// Whether the clip is selected
    pub selected: bool,
    /// Whether the clip (or its track) is locked
    pub locked: bool,
    /// Whether the clip belongs to a group
    pub grouped: bool,
}

/// One lane of the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineLaneVisual {
    /// Media kind of the lane
    pub kind: MediaKind,
    /// Top edge in timeline pixels
    pub y: f64,
    /// Lane height in pixels
    pub height: f64,
    /// Whether the lane is visible
    pub visible: bool,
    /// Whether the lane is locked
    pub locked: bool,
    /// Whether the lane is collapsed
    pub collapsed: bool,
    /// Clips on this lane
    pub clips: Vec<TimelineClipVisual>,
}

/// The timeline projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineVisual {
    /// Lanes in fixed kind order
    pub lanes: Vec<TimelineLaneVisual>,
    /// Playhead x position in pixels
    pub playhead_x: f64,
    /// Snap indicator x position while a drag is snapped
    pub snap_x: Option<f64>,
    /// Total height of all lanes
    pub total_height: f64,
}

/// Project the scene onto the canvas. `manipulating` lists items a
/// live session is previewing; `marquee` is the in-progress marquee in
/// screen pixels. Items on hidden tracks are skipped.
pub fn project_canvas(
    scene: &Scene,
    viewport: &CanvasViewport,
    manipulating: &[ItemId],
    marquee: Option<Rect>,
) -> CanvasVisual {
    let selection = scene.selection();
    let items = scene
        .items_by_z_order()
        .into_iter()
        .filter(|item| scene.track(item.kind).visible)
        .map(|item| {
            let canvas_rect = Rect::new(
                item.spatial.x,
                item.spatial.y,
                item.spatial.width,
                item.spatial.height,
            );
            let frame = viewport.rect_to_screen(canvas_rect);
            CanvasItemVisual {
                id: item.id,
                kind: item.kind,
                frame,
                bounds: rotated_aabb(frame, item.spatial.rotation_degrees),
                rotation_degrees: item.spatial.rotation_degrees,
                selected: selection.contains(item.id),
                primary: selection.primary() == Some(item.id),
                locked: !scene.is_manipulable(item.id),
                manipulating: manipulating.contains(&item.id),
                z_index: item.z_index,
            }
        })
        .collect();
    CanvasVisual { items, marquee }
}

/// Project the scene onto the timeline. The snap indicator comes from
/// the live session, when one is running and snapped.
pub fn project_timeline(
    scene: &Scene,
    viewport: &TimelineViewport,
    playhead: f64,
    snap: Option<SnapHit>,
) -> TimelineVisual {
    let selection = scene.selection();
    let mut lanes = Vec::with_capacity(scene.tracks().len());
    let mut y = 0.0;
    for kind in MediaKind::all() {
        let track = scene.track(*kind);
        let height = viewport.lane_height(*kind, track.collapsed);
        let clips = track
            .items
            .iter()
            .filter_map(|id| scene.item(*id))
            .filter_map(|item| {
                let range = item.temporal?;
                let x = time_to_x(range.start_time, scene.duration, viewport.width);
                let w = time_to_x(range.duration, scene.duration, viewport.width);
                Some(TimelineClipVisual {
                    id: item.id,
                    rect: Rect::new(x, y, w, height),
                    selected: selection.contains(item.id),
                    locked: !scene.is_manipulable(item.id),
                    grouped: item.group_id.is_some(),
                })
            })
            .collect();
        lanes.push(TimelineLaneVisual {
            kind: *kind,
            y,
            height,
            visible: track.visible,
            locked: track.locked,
            collapsed: track.collapsed,
            clips,
        });
        y += height;
    }
    TimelineVisual {
        lanes,
        playhead_x: time_to_x(playhead, scene.duration, viewport.width),
        snap_x: snap.map(|hit| time_to_x(hit.value, scene.duration, viewport.width)),
        total_height: y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_editor_scene::{Item, Spatial, TimeRange};

    fn scene_with_video() -> (Scene, ItemId) {
        let mut scene = Scene::new(60.0);
        let id = scene.add_item(
            Item::media(MediaKind::Video, "a.mp4", Spatial::new(100.0, 50.0, 200.0, 100.0))
                .with_time_range(TimeRange::new(15.0, 30.0)),
        );
        (scene, id)
    }

    #[test]
    fn test_zoom_clamps() {
        let mut viewport = CanvasViewport::new();
        for _ in 0..20 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom, ZOOM_MAX);
        for _ in 0..20 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.zoom, ZOOM_MIN);
    }

    #[test]
    fn test_canvas_projection_applies_zoom_and_pan() {
        let (scene, id) = scene_with_video();
        let viewport = CanvasViewport {
            zoom: 2.0,
            pan: Vec2::new(10.0, -5.0),
        };
        let visual = project_canvas(&scene, &viewport, &[], None);
        let item = visual.items.iter().find(|v| v.id == id).unwrap();
        assert_eq!(item.frame, Rect::new(210.0, 95.0, 400.0, 200.0));
        // No rotation: bounds match the frame
        assert_eq!(item.bounds, item.frame);
    }

    #[test]
    fn test_hidden_track_items_skipped() {
        let (mut scene, _id) = scene_with_video();
        scene.set_track_visible(MediaKind::Video, false);
        let visual = project_canvas(&scene, &CanvasViewport::new(), &[], None);
        assert!(visual.items.is_empty());
    }

    #[test]
    fn test_timeline_projection_fractions() {
        let (scene, id) = scene_with_video();
        let viewport = TimelineViewport::new(800.0);
        let visual = project_timeline(&scene, &viewport, 30.0, None);
        let video_lane = &visual.lanes[0];
        assert_eq!(video_lane.kind, MediaKind::Video);
        let clip = video_lane.clips.iter().find(|c| c.id == id).unwrap();
        // 15/60 and 30/60 of an 800px ruler
        assert_eq!(clip.rect.x, 200.0);
        assert_eq!(clip.rect.width, 400.0);
        assert_eq!(visual.playhead_x, 400.0);
    }

    #[test]
    fn test_collapsed_lane_height() {
        let (mut scene, _id) = scene_with_video();
        scene.set_track_collapsed(MediaKind::Video, true);
        let viewport = TimelineViewport::new(800.0);
        let visual = project_timeline(&scene, &viewport, 0.0, None);
        assert_eq!(visual.lanes[0].height, LANE_HEIGHT_COLLAPSED);
        // Following lanes shift up accordingly
        assert_eq!(visual.lanes[1].y, LANE_HEIGHT_COLLAPSED);
    }

    #[test]
    fn test_lane_height_override_clamps() {
        let mut viewport = TimelineViewport::new(800.0);
        viewport.set_lane_height(MediaKind::Audio, 500.0);
        assert_eq!(viewport.lane_height(MediaKind::Audio, false), LANE_HEIGHT_MAX);
        viewport.set_lane_height(MediaKind::Audio, 1.0);
        assert_eq!(viewport.lane_height(MediaKind::Audio, false), LANE_HEIGHT_MIN);
    }
}

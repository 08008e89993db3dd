// SPDX-License-Identifier: MIT OR Apache-2.0
//! Manipulation sessions: the pointer-driven state machine.
//!
//! A session starts on pointer-down, previews its effect on every
//! pointer-move by writing straight into the scene, and either commits
//! as a single unit on pointer-up or reverts to its anchor snapshots
//! on cancel. The host decides what was hit; the session decides what
//! happens.
//!
//! State machine rules:
//! - Pointer-down while a session is active is ignored
//! - Locked items (and items on locked tracks) never start a session
//! - A click that never moves commits nothing
//! - Escape reverts previews and ends the session

use crate::input::{HitTarget, PointerEvent, ResizeHandle, TrimEdge};
use crate::projection::TimelineViewport;
use crate::snap::{self, SnapHit};
use crate::transport::Transport;
use montage_editor_scene::{
    normalize_degrees, pointer_angle, rotated_aabb, x_to_time, ItemId, MediaKind, Rect, Scene,
    Spatial, SpatialPatch, TemporalPatch, TimeRange, Vec2, MIN_ITEM_SIZE,
};

/// Shortest clip a trim drag can leave behind, in seconds
pub const MIN_CLIP_SECONDS: f64 = 0.1;

/// Mutable engine surroundings a session works against
pub struct EngineCtx<'a> {
    /// Playback transport (scrubbing moves the playhead)
    pub transport: &'a mut Transport,
    /// Timeline geometry (lane resize writes into it)
    pub timeline: &'a mut TimelineViewport,
}

/// What a pointer transition produced, for the host and the undo layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Nothing observable happened
    None,
    /// The selection changed; not an undoable edit
    SelectionChanged,
    /// A manipulation finished and the scene changed; undo point
    Committed,
    /// A running session was cancelled and its preview reverted
    Cancelled,
}

#[derive(Debug, Clone)]
enum State {
    Idle,
    DragItems {
        origin: Vec2,
        anchors: Vec<(ItemId, Spatial)>,
    },
    Resize {
        id: ItemId,
        handle: ResizeHandle,
        origin: Vec2,
        anchor: Spatial,
    },
    Rotate {
        id: ItemId,
        center: Vec2,
        anchor_rotation: f64,
        grab_angle: f64,
    },
    Marquee {
        origin: Vec2,
        current: Vec2,
        base: Vec<ItemId>,
    },
    Scrub,
    MoveClips {
        origin_time: f64,
        anchors: Vec<(ItemId, TimeRange)>,
    },
    TrimClip {
        id: ItemId,
        edge: TrimEdge,
        anchor: TimeRange,
    },
    ResizeLane {
        kind: MediaKind,
        origin_y: f64,
        anchor_height: f64,
    },
}

/// The interactive manipulation session.
#[derive(Debug, Clone)]
pub struct Session {
    state: State,
    moved: bool,
    snap: Option<SnapHit>,
    snap_enabled: bool,
}

impl Session {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            moved: false,
            snap: None,
            snap_enabled: true,
        }
    }

    /// Enable or disable snapping for clip drags
    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    /// Whether a manipulation is running
    pub fn is_active(&self) -> bool {
        !matches!(self.state, State::Idle)
    }

    /// Items a running session is previewing
    pub fn manipulating_ids(&self) -> Vec<ItemId> {
        match &self.state {
            State::DragItems { anchors, .. } => anchors.iter().map(|(id, _)| *id).collect(),
            State::MoveClips { anchors, .. } => anchors.iter().map(|(id, _)| *id).collect(),
            State::Resize { id, .. } | State::Rotate { id, .. } | State::TrimClip { id, .. } => {
                vec![*id]
            }
            _ => Vec::new(),
        }
    }

    /// In-progress marquee rectangle in canvas units
    pub fn marquee_rect(&self) -> Option<Rect> {
        match &self.state {
            State::Marquee { origin, current, .. } => Some(Rect::from_corners(*origin, *current)),
            _ => None,
        }
    }

    /// Current snap hit, while a clip drag is snapped
    pub fn snap_hit(&self) -> Option<SnapHit> {
        self.snap
    }

    /// Begin a session from a resolved hit. Ignored while another
    /// session is active.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        target: HitTarget,
        event: PointerEvent,
        ctx: &mut EngineCtx<'_>,
    ) -> SessionEvent {
        if self.is_active() {
            return SessionEvent::None;
        }
        self.moved = false;
        self.snap = None;
        match target {
            HitTarget::Background => {
                if !event.modifiers.shift {
                    scene.clear_selection();
                }
                // A shift-drag adds on top of whatever was selected;
                // the base snapshot keeps every move's recompute from
                // accumulating items the rect no longer covers.
                self.state = State::Marquee {
                    origin: event.position,
                    current: event.position,
                    base: scene.selection().ids().to_vec(),
                };
                SessionEvent::SelectionChanged
            }
            HitTarget::ItemBody(id) => {
                let changed = select_for_pointer(scene, id, event.modifiers.shift);
                if !event.modifiers.shift {
                    let anchors = spatial_anchors(scene);
                    if !anchors.is_empty() {
                        self.state = State::DragItems {
                            origin: event.position,
                            anchors,
                        };
                    }
                }
                if changed {
                    SessionEvent::SelectionChanged
                } else {
                    SessionEvent::None
                }
            }
            HitTarget::ItemResize(id, handle) => {
                if !scene.is_manipulable(id) {
                    return SessionEvent::None;
                }
                let Some(anchor) = scene.item(id).map(|item| item.spatial) else {
                    return SessionEvent::None;
                };
                self.state = State::Resize {
                    id,
                    handle,
                    origin: event.position,
                    anchor,
                };
                SessionEvent::None
            }
            HitTarget::ItemRotate(id) => {
                if !scene.is_manipulable(id) {
                    return SessionEvent::None;
                }
                let Some(spatial) = scene.item(id).map(|item| item.spatial) else {
                    return SessionEvent::None;
                };
                let center = Rect::new(spatial.x, spatial.y, spatial.width, spatial.height).center();
                let Some(grab_angle) = pointer_angle(event.position, center) else {
                    return SessionEvent::None;
                };
                self.state = State::Rotate {
                    id,
                    center,
                    anchor_rotation: spatial.rotation_degrees,
                    grab_angle,
                };
                SessionEvent::None
            }
            HitTarget::ClipBody(id) => {
                let changed = select_for_pointer(scene, id, event.modifiers.shift);
                if !event.modifiers.shift {
                    let anchors = temporal_anchors(scene);
                    if !anchors.is_empty() {
                        self.state = State::MoveClips {
                            origin_time: x_to_time(event.position.x, scene.duration, ctx.timeline.width),
                            anchors,
                        };
                    }
                }
                if changed {
                    SessionEvent::SelectionChanged
                } else {
                    SessionEvent::None
                }
            }
            HitTarget::ClipTrim(id, edge) => {
                if !scene.is_manipulable(id) {
                    return SessionEvent::None;
                }
                let Some(anchor) = scene.item(id).and_then(|item| item.temporal) else {
                    return SessionEvent::None;
                };
                self.state = State::TrimClip { id, edge, anchor };
                SessionEvent::None
            }
            HitTarget::Ruler => {
                self.state = State::Scrub;
                let time = x_to_time(event.position.x, scene.duration, ctx.timeline.width);
                ctx.transport.seek(time, scene.duration);
                SessionEvent::None
            }
            HitTarget::TrackDivider(kind) => {
                self.state = State::ResizeLane {
                    kind,
                    origin_y: event.position.y,
                    anchor_height: ctx.timeline.lane_height(kind, false),
                };
                SessionEvent::None
            }
        }
    }

    /// Preview the running session at a new pointer position.
    pub fn pointer_move(&mut self, scene: &mut Scene, event: PointerEvent, ctx: &mut EngineCtx<'_>) {
        match self.state.clone() {
            State::Idle => {}
            State::DragItems { origin, anchors } => {
                let delta = event.position.sub(origin);
                if delta.x != 0.0 || delta.y != 0.0 {
                    self.moved = true;
                }
                for (id, anchor) in &anchors {
                    scene.update_spatial(
                        *id,
                        SpatialPatch {
                            x: Some(anchor.x + delta.x),
                            y: Some(anchor.y + delta.y),
                            ..Default::default()
                        },
                    );
                }
            }
            State::Resize {
                id,
                handle,
                origin,
                anchor,
            } => {
                let delta = event.position.sub(origin);
                if delta.x != 0.0 || delta.y != 0.0 {
                    self.moved = true;
                }
                let next = resized(anchor, handle, delta);
                scene.update_spatial(
                    id,
                    SpatialPatch {
                        x: Some(next.x),
                        y: Some(next.y),
                        width: Some(next.width),
                        height: Some(next.height),
                        ..Default::default()
                    },
                );
            }
            State::Rotate {
                id,
                center,
                anchor_rotation,
                grab_angle,
            } => {
                // Pointer exactly on the center gives no direction;
                // keep the previous preview.
                if let Some(angle) = pointer_angle(event.position, center) {
                    self.moved = true;
                    scene.update_spatial(
                        id,
                        SpatialPatch {
                            rotation_degrees: Some(normalize_degrees(
                                anchor_rotation + angle - grab_angle,
                            )),
                            ..Default::default()
                        },
                    );
                }
            }
            State::Marquee { origin, base, .. } => {
                self.moved = true;
                apply_marquee(scene, Rect::from_corners(origin, event.position), &base);
                self.state = State::Marquee {
                    origin,
                    current: event.position,
                    base,
                };
            }
            State::Scrub => {
                let time = x_to_time(event.position.x, scene.duration, ctx.timeline.width);
                ctx.transport.seek(time, scene.duration);
            }
            State::MoveClips { origin_time, anchors } => {
                let pointer_time = x_to_time(event.position.x, scene.duration, ctx.timeline.width);
                let mut shift = pointer_time - origin_time;
                if shift != 0.0 {
                    self.moved = true;
                }
                let moving: Vec<ItemId> = anchors.iter().map(|(id, _)| *id).collect();
                let list = if self.snap_enabled {
                    snap::candidates(scene, &moving, ctx.transport.playhead)
                } else {
                    Vec::new()
                };
                // Snap against the lead clip; the rest follow rigidly
                self.snap = None;
                if let Some((_, lead)) = anchors.first() {
                    let raw = lead.start_time + shift;
                    if let Some((snapped, hit)) =
                        snap::snap_range(raw, lead.duration, &list, scene.duration)
                    {
                        shift = snapped - lead.start_time;
                        self.snap = Some(hit);
                    }
                }
                for (id, anchor) in &anchors {
                    let start = (anchor.start_time + shift)
                        .clamp(0.0, (scene.duration - anchor.duration).max(0.0));
                    scene.update_temporal(
                        *id,
                        TemporalPatch {
                            start_time: Some(start),
                            duration: Some(anchor.duration),
                        },
                    );
                }
            }
            State::TrimClip { id, edge, anchor } => {
                let pointer_time = x_to_time(event.position.x, scene.duration, ctx.timeline.width);
                let list = if self.snap_enabled {
                    snap::candidates(scene, &[id], ctx.transport.playhead)
                } else {
                    Vec::new()
                };
                let hit = snap::snap_value(pointer_time, &list, scene.duration);
                let time = hit.map_or(pointer_time, |h| h.value);
                self.snap = hit;
                self.moved = true;
                match edge {
                    TrimEdge::Start => {
                        let start = time.clamp(0.0, anchor.end_time() - MIN_CLIP_SECONDS);
                        scene.update_temporal(
                            id,
                            TemporalPatch {
                                start_time: Some(start),
                                duration: Some(anchor.end_time() - start),
                            },
                        );
                    }
                    TrimEdge::End => {
                        let end = time.clamp(anchor.start_time + MIN_CLIP_SECONDS, scene.duration);
                        scene.update_temporal(
                            id,
                            TemporalPatch {
                                start_time: Some(anchor.start_time),
                                duration: Some(end - anchor.start_time),
                            },
                        );
                    }
                }
            }
            State::ResizeLane {
                kind,
                origin_y,
                anchor_height,
            } => {
                self.moved = true;
                ctx.timeline
                    .set_lane_height(kind, anchor_height + event.position.y - origin_y);
            }
        }
    }

    /// Finish the running session. Returns `Committed` when the scene
    /// changed in a way the undo layer should record.
    pub fn pointer_up(&mut self, scene: &mut Scene) -> SessionEvent {
        let state = std::mem::replace(&mut self.state, State::Idle);
        let moved = std::mem::take(&mut self.moved);
        self.snap = None;
        match state {
            State::Idle => SessionEvent::None,
            State::Marquee { origin, current, base } => {
                apply_marquee(scene, Rect::from_corners(origin, current), &base);
                SessionEvent::SelectionChanged
            }
            State::Scrub | State::ResizeLane { .. } => SessionEvent::None,
            State::DragItems { .. }
            | State::Resize { .. }
            | State::Rotate { .. }
            | State::MoveClips { .. }
            | State::TrimClip { .. } => {
                if moved {
                    tracing::debug!("manipulation committed");
                    SessionEvent::Committed
                } else {
                    SessionEvent::None
                }
            }
        }
    }

    /// Cancel the running session, reverting any preview.
    pub fn cancel(&mut self, scene: &mut Scene, ctx: &mut EngineCtx<'_>) -> SessionEvent {
        let state = std::mem::replace(&mut self.state, State::Idle);
        self.moved = false;
        self.snap = None;
        match state {
            State::Idle => SessionEvent::None,
            State::DragItems { anchors, .. } => {
                for (id, anchor) in anchors {
                    restore_spatial(scene, id, anchor);
                }
                SessionEvent::Cancelled
            }
            State::Resize { id, anchor, .. } => {
                restore_spatial(scene, id, anchor);
                SessionEvent::Cancelled
            }
            State::Rotate {
                id, anchor_rotation, ..
            } => {
                scene.update_spatial(
                    id,
                    SpatialPatch {
                        rotation_degrees: Some(anchor_rotation),
                        ..Default::default()
                    },
                );
                SessionEvent::Cancelled
            }
            State::MoveClips { anchors, .. } => {
                for (id, anchor) in anchors {
                    restore_temporal(scene, id, anchor);
                }
                SessionEvent::Cancelled
            }
            State::TrimClip { id, anchor, .. } => {
                restore_temporal(scene, id, anchor);
                SessionEvent::Cancelled
            }
            State::ResizeLane {
                kind, anchor_height, ..
            } => {
                ctx.timeline.set_lane_height(kind, anchor_height);
                SessionEvent::Cancelled
            }
            State::Marquee { base, .. } => {
                let primary = base.first().copied();
                scene.set_selection(base, primary);
                SessionEvent::Cancelled
            }
            State::Scrub => SessionEvent::Cancelled,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// --- helpers ------------------------------------------------------------

/// Pointer-down selection: clicking an item addresses its whole group.
/// Shift toggles; a plain click on an unselected item replaces the
/// selection, on a selected item it leaves the selection intact.
/// Returns whether the selection changed.
fn select_for_pointer(scene: &mut Scene, id: ItemId, shift: bool) -> bool {
    let members = match scene.item(id).and_then(|item| item.group_id) {
        Some(group) => scene.group_members(group),
        None => vec![id],
    };
    let selection = scene.selection();
    if shift {
        let mut ids: Vec<ItemId> = selection.ids().to_vec();
        if selection.contains(id) {
            ids.retain(|other| !members.contains(other));
            scene.set_selection(ids, None);
        } else {
            ids.extend(members);
            scene.set_selection(ids, Some(id));
        }
        true
    } else if selection.contains(id) {
        false
    } else {
        scene.set_selection(members, Some(id));
        true
    }
}

/// Spatial anchors for every manipulable selected item
fn spatial_anchors(scene: &Scene) -> Vec<(ItemId, Spatial)> {
    scene
        .selection()
        .ids()
        .iter()
        .filter(|id| scene.is_manipulable(**id))
        .filter_map(|id| scene.item(*id).map(|item| (*id, item.spatial)))
        .collect()
}

/// Temporal anchors for every manipulable selected clip
fn temporal_anchors(scene: &Scene) -> Vec<(ItemId, TimeRange)> {
    scene
        .selection()
        .ids()
        .iter()
        .filter(|id| scene.is_manipulable(**id))
        .filter_map(|id| scene.item(*id).and_then(|item| item.temporal.map(|r| (*id, r))))
        .collect()
}

fn restore_spatial(scene: &mut Scene, id: ItemId, anchor: Spatial) {
    scene.update_spatial(
        id,
        SpatialPatch {
            x: Some(anchor.x),
            y: Some(anchor.y),
            width: Some(anchor.width),
            height: Some(anchor.height),
            rotation_degrees: Some(anchor.rotation_degrees),
        },
    );
}

fn restore_temporal(scene: &mut Scene, id: ItemId, anchor: TimeRange) {
    scene.update_temporal(
        id,
        TemporalPatch {
            start_time: Some(anchor.start_time),
            duration: Some(anchor.duration),
        },
    );
}

/// Eight-handle resize over the unrotated frame. Corner handles keep
/// the anchor aspect ratio; the driving dimension clamps to a floor
/// that keeps both dimensions at the minimum size.
fn resized(anchor: Spatial, handle: ResizeHandle, delta: Vec2) -> Spatial {
    let mut next = anchor;
    if handle.is_corner() {
        let aspect = anchor.aspect_ratio();
        let floor = MIN_ITEM_SIZE.max(MIN_ITEM_SIZE * aspect);
        let dw = if handle.affects_right() { delta.x } else { -delta.x };
        let width = (anchor.width + dw).max(floor);
        let height = width / aspect;
        next.width = width;
        next.height = height;
        if handle.affects_left() {
            next.x = anchor.x + anchor.width - width;
        }
        if handle.affects_top() {
            next.y = anchor.y + anchor.height - height;
        }
    } else {
        if handle.affects_right() {
            next.width = (anchor.width + delta.x).max(MIN_ITEM_SIZE);
        }
        if handle.affects_left() {
            let width = (anchor.width - delta.x).max(MIN_ITEM_SIZE);
            next.x = anchor.x + anchor.width - width;
            next.width = width;
        }
        if handle.affects_bottom() {
            next.height = (anchor.height + delta.y).max(MIN_ITEM_SIZE);
        }
        if handle.affects_top() {
            let height = (anchor.height - delta.y).max(MIN_ITEM_SIZE);
            next.y = anchor.y + anchor.height - height;
            next.height = height;
        }
    }
    next
}

/// Replace the selection with `base` plus every visible, unlocked
/// item whose rotated bounds intersect the marquee rectangle (canvas
/// units). Locked items stay selectable by explicit click only.
fn apply_marquee(scene: &mut Scene, rect: Rect, base: &[ItemId]) {
    let hits: Vec<ItemId> = scene
        .items()
        .filter(|item| scene.track(item.kind).visible && scene.is_manipulable(item.id))
        .filter(|item| {
            let frame = Rect::new(
                item.spatial.x,
                item.spatial.y,
                item.spatial.width,
                item.spatial.height,
            );
            rotated_aabb(frame, item.spatial.rotation_degrees).intersects(&rect)
        })
        .map(|item| item.id)
        .collect();
    let mut ids = base.to_vec();
    for hit in hits {
        if !ids.contains(&hit) {
            ids.push(hit);
        }
    }
    let primary = ids.first().copied();
    scene.set_selection(ids, primary);
}

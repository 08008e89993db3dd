// SPDX-License-Identifier: MIT OR Apache-2.0
//! The canonical scene model.
//!
//! The scene is the single owner of editor state: the fixed set of
//! tracks, every placed item, the selection and the stacking order.
//! All other components (interaction engine, projections, host panels)
//! read snapshots through accessors and mutate only through the narrow
//! API here, preserving the one-writer invariant.

use crate::geometry::normalize_degrees;
use crate::item::{GroupId, Item, ItemId, MediaKind, MIN_ITEM_SIZE};
use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default composition duration in seconds for a fresh scene.
pub const DEFAULT_DURATION: f64 = 60.0;

/// The current selection: a set of item ids plus a distinguished
/// primary id used for single-item tool panels.
///
/// Invariant: `primary` is a member of `ids` whenever the selection is
/// non-empty, and `None` otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selection {
    ids: Vec<ItemId>,
    primary: Option<ItemId>,
}

impl Selection {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected ids in selection order
    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    /// The primary selected item, if any
    pub fn primary(&self) -> Option<ItemId> {
        self.primary
    }

    /// Whether an item is selected
    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Whether the selection is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of selected items
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Replace the selection, de-duplicating while keeping order.
    /// The primary falls back to the first id when the requested
    /// primary is not part of the set.
    pub fn set(&mut self, ids: Vec<ItemId>, primary: Option<ItemId>) {
        let mut deduped: Vec<ItemId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }
        self.primary = match primary {
            Some(p) if deduped.contains(&p) => Some(p),
            _ => deduped.first().copied(),
        };
        self.ids = deduped;
    }

    /// Add one id to the selection (idempotent); it becomes primary.
    pub fn add(&mut self, id: ItemId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
        self.primary = Some(id);
    }

    /// Toggle one id in the selection.
    pub fn toggle(&mut self, id: ItemId) {
        if self.contains(id) {
            self.retain_only(|other| other != id);
        } else {
            self.add(id);
        }
    }

    /// Clear the selection
    pub fn clear(&mut self) {
        self.ids.clear();
        self.primary = None;
    }

    fn retain_only(&mut self, keep: impl Fn(ItemId) -> bool) {
        self.ids.retain(|id| keep(*id));
        match self.primary {
            Some(p) if self.contains(p) => {}
            _ => self.primary = self.ids.first().copied(),
        }
    }
}

/// Partial update of an item's spatial placement. `None` fields are
/// left untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SpatialPatch {
    /// New left edge
    pub x: Option<f64>,
    /// New top edge
    pub y: Option<f64>,
    /// New width (ignored unless positive)
    pub width: Option<f64>,
    /// New height (ignored unless positive)
    pub height: Option<f64>,
    /// New rotation in degrees (normalized into `[0, 360)`)
    pub rotation_degrees: Option<f64>,
}

/// Partial update of an item's temporal extent. `None` fields are left
/// untouched; the result is clamped into the composition.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TemporalPatch {
    /// New start time in seconds
    pub start_time: Option<f64>,
    /// New duration in seconds (ignored unless positive)
    pub duration: Option<f64>,
}

/// The scene model: tracks, items, selection and stacking order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// All items, keyed by id in insertion order
    items: IndexMap<ItemId, Item>,
    /// One track per media kind, in fixed stacking order
    tracks: Vec<Track>,
    /// Current selection
    selection: Selection,
    /// Composition duration in seconds
    pub duration: f64,
    /// Next z-index to hand out; monotonic so z stays unique even
    /// after deletions
    next_z: i64,
}

impl Scene {
    /// Create a scene with one empty track per media kind
    pub fn new(duration: f64) -> Self {
        Self {
            items: IndexMap::new(),
            tracks: MediaKind::all().iter().map(|kind| Track::new(*kind)).collect(),
            selection: Selection::new(),
            duration: if duration > 0.0 { duration } else { DEFAULT_DURATION },
            next_z: 1,
        }
    }

    // --- accessors ------------------------------------------------------

    /// Get an item by id
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// All items in insertion order
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Item count
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Whether an item exists
    pub fn contains_item(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Items in ascending z order. Ties cannot occur under the
    /// uniqueness invariant, but insertion order breaks them
    /// deterministically anyway.
    pub fn items_by_z_order(&self) -> Vec<&Item> {
        let mut ordered: Vec<(usize, &Item)> = self.items.values().enumerate().collect();
        ordered.sort_by(|(ia, a), (ib, b)| a.z_index.cmp(&b.z_index).then(ia.cmp(ib)));
        ordered.into_iter().map(|(_, item)| item).collect()
    }

    /// The track for a media kind
    pub fn track(&self, kind: MediaKind) -> &Track {
        self.tracks
            .iter()
            .find(|t| t.kind == kind)
            .expect("scene always holds one track per kind")
    }

    /// Track lookup by id
    pub fn track_by_id(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// All tracks in fixed stacking order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The current selection
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Members of a group, in insertion order
    pub fn group_members(&self, group: GroupId) -> Vec<ItemId> {
        self.items
            .values()
            .filter(|item| item.group_id == Some(group))
            .map(|item| item.id)
            .collect()
    }

    /// Whether manipulation of the item is allowed (item and its track
    /// both unlocked)
    pub fn is_manipulable(&self, id: ItemId) -> bool {
        match self.item(id) {
            Some(item) => !item.locked && !self.track(item.kind).locked,
            None => false,
        }
    }

    // --- mutation -------------------------------------------------------

    /// Add an item to the track matching its kind and assign a fresh
    /// top-of-stack z-index. Returns the item's id.
    pub fn add_item(&mut self, mut item: Item) -> ItemId {
        item.z_index = self.take_z();
        if let Some(range) = item.temporal.as_mut() {
            clamp_time_range(range, self.duration);
        }
        let id = item.id;
        let kind = item.kind;
        self.items.insert(id, item);
        self.track_mut(kind).push(id);
        tracing::debug!(item = ?id, kind = kind.name(), "added item");
        id
    }

    /// Remove items by id. Unknown ids are ignored. Groups left with a
    /// single member are dissolved; removed ids leave the selection.
    pub fn remove_items(&mut self, ids: &[ItemId]) {
        let mut touched_groups: Vec<GroupId> = Vec::new();
        for id in ids {
            let Some(item) = self.items.shift_remove(id) else {
                continue;
            };
            self.track_mut(item.kind).remove(*id);
            if let Some(group) = item.group_id {
                if !touched_groups.contains(&group) {
                    touched_groups.push(group);
                }
            }
        }
        for group in touched_groups {
            let members = self.group_members(group);
            if members.len() < 2 {
                for member in members {
                    if let Some(item) = self.items.get_mut(&member) {
                        item.group_id = None;
                    }
                }
            }
        }
        self.selection.retain_only(|id| self.items.contains_key(&id));
    }

    /// Apply a partial spatial update. Nonexistent ids and
    /// non-positive dimensions degrade to no-ops per field.
    pub fn update_spatial(&mut self, id: ItemId, patch: SpatialPatch) {
        let Some(item) = self.items.get_mut(&id) else {
            return;
        };
        if let Some(x) = patch.x {
            item.spatial.x = x;
        }
        if let Some(y) = patch.y {
            item.spatial.y = y;
        }
        if let Some(width) = patch.width {
            if width > 0.0 {
                item.spatial.width = width.max(MIN_ITEM_SIZE);
            }
        }
        if let Some(height) = patch.height {
            if height > 0.0 {
                item.spatial.height = height.max(MIN_ITEM_SIZE);
            }
        }
        if let Some(rotation) = patch.rotation_degrees {
            if rotation.is_finite() {
                item.spatial.rotation_degrees = normalize_degrees(rotation);
            }
        }
    }

    /// Apply a partial temporal update to a time-bearing item; the
    /// resulting range is clamped into `[0, duration]`.
    pub fn update_temporal(&mut self, id: ItemId, patch: TemporalPatch) {
        let duration = self.duration;
        let Some(item) = self.items.get_mut(&id) else {
            return;
        };
        let Some(range) = item.temporal.as_mut() else {
            return;
        };
        if let Some(start) = patch.start_time {
            if start.is_finite() {
                range.start_time = start;
            }
        }
        if let Some(d) = patch.duration {
            if d > 0.0 {
                range.duration = d;
            }
        }
        clamp_time_range(range, duration);
    }

    /// Replace the selection. Unknown ids are dropped before the
    /// primary invariant is applied.
    pub fn set_selection(&mut self, ids: Vec<ItemId>, primary: Option<ItemId>) {
        let known: Vec<ItemId> = ids.into_iter().filter(|id| self.items.contains_key(id)).collect();
        self.selection.set(known, primary);
    }

    /// Add one item to the selection (it becomes primary)
    pub fn select_also(&mut self, id: ItemId) {
        if self.items.contains_key(&id) {
            self.selection.add(id);
        }
    }

    /// Toggle one item in the selection
    pub fn toggle_selected(&mut self, id: ItemId) {
        if self.items.contains_key(&id) {
            self.selection.toggle(id);
        }
    }

    /// Clear the selection
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Set an item's lock flag
    pub fn set_item_locked(&mut self, id: ItemId, locked: bool) {
        if let Some(item) = self.items.get_mut(&id) {
            item.locked = locked;
        }
    }

    /// Set an item's group membership
    pub(crate) fn set_group(&mut self, id: ItemId, group: Option<GroupId>) {
        if let Some(item) = self.items.get_mut(&id) {
            item.group_id = group;
        }
    }

    /// Set an item's z-index directly. Callers are responsible for
    /// keeping the scene-wide uniqueness invariant; the arrange
    /// operation is the only intended caller.
    pub(crate) fn set_z_index(&mut self, id: ItemId, z: i64) {
        if let Some(item) = self.items.get_mut(&id) {
            item.z_index = z;
        }
        self.next_z = self.next_z.max(z + 1);
    }

    /// Hand out the next top-of-stack z-index
    pub(crate) fn take_z(&mut self) -> i64 {
        let z = self.next_z;
        self.next_z += 1;
        z
    }

    /// Toggle track visibility
    pub fn set_track_visible(&mut self, kind: MediaKind, visible: bool) {
        self.track_mut(kind).visible = visible;
    }

    /// Toggle track lock
    pub fn set_track_locked(&mut self, kind: MediaKind, locked: bool) {
        self.track_mut(kind).locked = locked;
    }

    /// Toggle track collapse
    pub fn set_track_collapsed(&mut self, kind: MediaKind, collapsed: bool) {
        self.track_mut(kind).collapsed = collapsed;
    }

    fn track_mut(&mut self, kind: MediaKind) -> &mut Track {
        self.tracks
            .iter_mut()
            .find(|t| t.kind == kind)
            .expect("scene always holds one track per kind")
    }

    /// Debug assertion helper: verify z-index uniqueness. Used by
    /// tests; cheap enough to call after any arrange.
    pub fn z_indices_distinct(&self) -> bool {
        let mut seen: HashMap<i64, ItemId> = HashMap::new();
        for item in self.items.values() {
            if seen.insert(item.z_index, item.id).is_some() {
                return false;
            }
        }
        true
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION)
    }
}

fn clamp_time_range(range: &mut crate::item::TimeRange, duration: f64) {
    range.duration = range.duration.max(0.0).min(duration);
    range.start_time = range.start_time.clamp(0.0, duration);
    // A start pushed to the very end would leave a zero-length clip;
    // pull it back so the clip keeps its length, flush against the end.
    if range.start_time >= duration {
        range.start_time = (duration - range.duration).max(0.0);
    }
    if range.end_time() > duration {
        range.duration = duration - range.start_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Spatial, TimeRange};

    fn video_item(start: f64, duration: f64) -> Item {
        Item::media(MediaKind::Video, "clip.mp4", Spatial::new(0.0, 0.0, 640.0, 360.0))
            .with_time_range(TimeRange::new(start, duration))
    }

    #[test]
    fn test_add_item_assigns_unique_z() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        let b = scene.add_item(video_item(10.0, 10.0));
        assert!(scene.item(a).unwrap().z_index < scene.item(b).unwrap().z_index);
        assert!(scene.z_indices_distinct());
        assert!(scene.track(MediaKind::Video).contains(a));
    }

    #[test]
    fn test_z_order_survives_removal() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        let _b = scene.add_item(video_item(10.0, 10.0));
        scene.remove_items(&[a]);
        let c = scene.add_item(video_item(20.0, 10.0));
        assert!(scene.z_indices_distinct());
        // The new item lands on top, not in the removed slot
        let top = scene.items_by_z_order().last().unwrap().id;
        assert_eq!(top, c);
    }

    #[test]
    fn test_selection_primary_invariant() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        let b = scene.add_item(video_item(10.0, 10.0));
        scene.set_selection(vec![a, b], Some(b));
        assert_eq!(scene.selection().primary(), Some(b));
        // Primary not in set falls back to the first id
        scene.set_selection(vec![a], Some(b));
        assert_eq!(scene.selection().primary(), Some(a));
        scene.set_selection(vec![], None);
        assert!(scene.selection().primary().is_none());
    }

    #[test]
    fn test_remove_dissolves_single_member_group() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        let b = scene.add_item(video_item(10.0, 10.0));
        let group = GroupId::new();
        scene.set_group(a, Some(group));
        scene.set_group(b, Some(group));

        scene.remove_items(&[a]);
        assert_eq!(scene.item(b).unwrap().group_id, None);
    }

    #[test]
    fn test_remove_keeps_group_with_two_members() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        let c = scene.add_item(video_item(10.0, 5.0));
        let group = GroupId::new();
        for id in [a, b, c] {
            scene.set_group(id, Some(group));
        }
        scene.remove_items(&[a]);
        assert_eq!(scene.item(b).unwrap().group_id, Some(group));
        assert_eq!(scene.item(c).unwrap().group_id, Some(group));
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        scene.remove_items(&[ItemId::new()]);
        assert!(scene.contains_item(a));
    }

    #[test]
    fn test_update_spatial_clamps_and_normalizes() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        scene.update_spatial(
            a,
            SpatialPatch {
                width: Some(5.0),
                rotation_degrees: Some(-45.0),
                ..Default::default()
            },
        );
        let item = scene.item(a).unwrap();
        assert_eq!(item.spatial.width, MIN_ITEM_SIZE);
        assert_eq!(item.spatial.rotation_degrees, 315.0);
    }

    #[test]
    fn test_update_temporal_clamps_to_composition() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        scene.update_temporal(
            a,
            TemporalPatch {
                start_time: Some(55.0),
                duration: Some(20.0),
            },
        );
        let range = scene.item(a).unwrap().temporal.unwrap();
        assert_eq!(range.start_time, 55.0);
        assert_eq!(range.end_time(), 60.0);
    }

    #[test]
    fn test_start_at_composition_end_keeps_duration() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        scene.update_temporal(
            a,
            TemporalPatch {
                start_time: Some(60.0),
                duration: None,
            },
        );
        let range = scene.item(a).unwrap().temporal.unwrap();
        assert_eq!(range.start_time, 50.0);
        assert_eq!(range.duration, 10.0);
    }

    #[test]
    fn test_locked_track_blocks_manipulation() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        assert!(scene.is_manipulable(a));
        scene.set_track_locked(MediaKind::Video, true);
        assert!(!scene.is_manipulable(a));
    }
}

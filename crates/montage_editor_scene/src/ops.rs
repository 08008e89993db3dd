// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip operations over the scene: split, duplicate, group/ungroup,
//! stacking order, lock toggles, delete and clipboard cloning.
//!
//! Every operation validates up front and returns an error without
//! touching the scene when its preconditions fail; locked items (and
//! items on locked tracks) are silently skipped rather than failing
//! the whole operation.

use crate::error::{OrderedTime, SceneError};
use crate::item::{GroupId, Item, ItemId, TimeRange};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canvas offset applied to duplicated items so the copies are visible
/// next to their originals.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Direction of a stacking-order change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arrange {
    /// One step toward the viewer
    BringForward,
    /// One step away from the viewer
    SendBackward,
    /// Above everything
    BringToFront,
    /// Below everything
    SendToBack,
}

/// Split every selected clip that spans `time` strictly in its
/// interior. Each split clip is truncated to end at `time` and a new
/// clip with a fresh id covers the remainder; the selection stays on
/// the first halves. Returns the ids of the new second halves.
pub fn split_at(scene: &mut Scene, time: f64) -> Result<Vec<ItemId>, SceneError> {
    let candidates: Vec<ItemId> = scene
        .selection()
        .ids()
        .iter()
        .copied()
        .filter(|id| {
            scene.is_manipulable(*id)
                && scene
                    .item(*id)
                    .and_then(|item| item.temporal)
                    .is_some_and(|range| range.contains_inside(time))
        })
        .collect();
    if candidates.is_empty() {
        return Err(SceneError::NothingToSplit(OrderedTime::new(time)));
    }

    let mut created = Vec::with_capacity(candidates.len());
    for id in candidates {
        let Some(original) = scene.item(id) else {
            continue;
        };
        let Some(range) = original.temporal else {
            continue;
        };
        let mut second = original.clone();
        second.id = ItemId::new();
        second.temporal = Some(TimeRange::new(time, range.end_time() - time));

        scene.update_temporal(
            id,
            crate::scene::TemporalPatch {
                start_time: None,
                duration: Some(time - range.start_time),
            },
        );
        created.push(scene.add_item(second));
    }
    tracing::info!(count = created.len(), time, "split clips");
    Ok(created)
}

/// Duplicate the selection. Copies get fresh ids, a `+20/+20` canvas
/// offset, fresh group ids (membership preserved within the copied
/// set) and land on top of the stack; the copies become the new
/// selection. Returns the new ids.
pub fn duplicate_selection(scene: &mut Scene) -> Result<Vec<ItemId>, SceneError> {
    let sources = manipulable_selection(scene)?;
    let clones = clone_items(scene, &sources, |item| {
        item.spatial.x += DUPLICATE_OFFSET;
        item.spatial.y += DUPLICATE_OFFSET;
    });
    let ids: Vec<ItemId> = clones.into_iter().map(|item| scene.add_item(item)).collect();
    scene.set_selection(ids.clone(), ids.first().copied());
    tracing::info!(count = ids.len(), "duplicated selection");
    Ok(ids)
}

/// Group the selection under a fresh shared group id. Requires at
/// least two manipulable items; prior memberships are replaced, and
/// groups left with fewer than two members dissolve.
pub fn group_selection(scene: &mut Scene) -> Result<GroupId, SceneError> {
    let ids = manipulable_selection(scene)?;
    if ids.len() < 2 {
        return Err(SceneError::GroupTooSmall);
    }
    let vacated: Vec<GroupId> = ids
        .iter()
        .filter_map(|id| scene.item(*id).and_then(|item| item.group_id))
        .collect();
    let group = GroupId::new();
    for id in &ids {
        scene.set_group(*id, Some(group));
    }
    for old in vacated {
        dissolve_if_small(scene, old);
    }
    tracing::info!(count = ids.len(), "grouped selection");
    Ok(group)
}

/// Remove every selected item from its group; groups left with a
/// single member dissolve entirely.
pub fn ungroup_selection(scene: &mut Scene) -> Result<(), SceneError> {
    let ids = manipulable_selection(scene)?;
    let vacated: Vec<GroupId> = ids
        .iter()
        .filter_map(|id| scene.item(*id).and_then(|item| item.group_id))
        .collect();
    for id in &ids {
        scene.set_group(*id, None);
    }
    for old in vacated {
        dissolve_if_small(scene, old);
    }
    Ok(())
}

/// Change the stacking order of the selection. Forward/backward steps
/// move each item just past its nearest non-selected neighbor; items
/// already at the boundary stay put. Z-indices remain pairwise
/// distinct afterward.
pub fn arrange_selection(scene: &mut Scene, direction: Arrange) -> Result<(), SceneError> {
    let mut ids = manipulable_selection(scene)?;
    let selected: Vec<ItemId> = scene.selection().ids().to_vec();
    // Processing order keeps selected items in their relative order:
    // stepping forward and dropping to the back go top-down, the
    // other two go bottom-up.
    ids.sort_by_key(|id| scene.item(*id).map_or(0, |item| item.z_index));
    match direction {
        Arrange::BringForward | Arrange::SendToBack => ids.reverse(),
        Arrange::SendBackward | Arrange::BringToFront => {}
    }

    for id in ids {
        let Some(z) = scene.item(id).map(|item| item.z_index) else {
            continue;
        };
        match direction {
            Arrange::BringForward => {
                let neighbor = scene
                    .items()
                    .filter(|other| !selected.contains(&other.id) && other.z_index > z)
                    .map(|other| other.z_index)
                    .min();
                if let Some(nz) = neighbor {
                    place_at(scene, id, nz + 1, true);
                }
            }
            Arrange::SendBackward => {
                let neighbor = scene
                    .items()
                    .filter(|other| !selected.contains(&other.id) && other.z_index < z)
                    .map(|other| other.z_index)
                    .max();
                if let Some(nz) = neighbor {
                    place_at(scene, id, nz - 1, false);
                }
            }
            Arrange::BringToFront => {
                let top = scene.items().map(|other| other.z_index).max().unwrap_or(z);
                if z < top {
                    scene.set_z_index(id, top + 1);
                }
            }
            Arrange::SendToBack => {
                let bottom = scene.items().map(|other| other.z_index).min().unwrap_or(z);
                if z > bottom {
                    scene.set_z_index(id, bottom - 1);
                }
            }
        }
    }
    debug_assert!(scene.z_indices_distinct());
    Ok(())
}

/// Set the lock flag on every selected item.
pub fn set_selection_locked(scene: &mut Scene, locked: bool) -> Result<(), SceneError> {
    let ids: Vec<ItemId> = scene.selection().ids().to_vec();
    if ids.is_empty() {
        return Err(SceneError::EmptySelection);
    }
    for id in ids {
        scene.set_item_locked(id, locked);
    }
    Ok(())
}

/// Delete the selection; locked items survive.
pub fn delete_selection(scene: &mut Scene) -> Result<usize, SceneError> {
    let ids = manipulable_selection(scene)?;
    let count = ids.len();
    scene.remove_items(&ids);
    tracing::info!(count, "deleted selection");
    Ok(count)
}

/// Clone the selection for the clipboard. The clones keep their
/// source geometry and group shape but are detached from the scene.
pub fn copy_selection(scene: &Scene) -> Result<Vec<Item>, SceneError> {
    let ids: Vec<ItemId> = scene.selection().ids().to_vec();
    if ids.is_empty() {
        return Err(SceneError::EmptySelection);
    }
    Ok(ids
        .iter()
        .filter_map(|id| scene.item(*id).cloned())
        .collect())
}

/// Paste clipboard items: fresh ids, fresh group ids (shape
/// preserved), time-bearing clones re-anchored so the earliest start
/// lands on `at_time`. The pasted items become the selection. Returns
/// the new ids.
pub fn paste_items(scene: &mut Scene, clipboard: &[Item], at_time: f64) -> Result<Vec<ItemId>, SceneError> {
    if clipboard.is_empty() {
        return Err(SceneError::EmptySelection);
    }
    let earliest = clipboard
        .iter()
        .filter_map(|item| item.temporal)
        .map(|range| range.start_time)
        .fold(f64::INFINITY, f64::min);
    let shift = if earliest.is_finite() { at_time - earliest } else { 0.0 };

    let mut group_map: HashMap<GroupId, GroupId> = HashMap::new();
    let mut ids = Vec::with_capacity(clipboard.len());
    for source in clipboard {
        let mut clone = source.clone();
        clone.id = ItemId::new();
        clone.group_id = clone.group_id.map(|old| *group_map.entry(old).or_insert_with(GroupId::new));
        if let Some(range) = clone.temporal.as_mut() {
            range.start_time += shift;
        }
        ids.push(scene.add_item(clone));
    }
    scene.set_selection(ids.clone(), ids.first().copied());
    tracing::info!(count = ids.len(), at_time, "pasted items");
    Ok(ids)
}

// --- helpers ------------------------------------------------------------

/// Selected ids that are actually manipulable, in selection order.
fn manipulable_selection(scene: &Scene) -> Result<Vec<ItemId>, SceneError> {
    let all: Vec<ItemId> = scene.selection().ids().to_vec();
    if all.is_empty() {
        return Err(SceneError::EmptySelection);
    }
    let ids: Vec<ItemId> = all.into_iter().filter(|id| scene.is_manipulable(*id)).collect();
    if ids.is_empty() {
        return Err(SceneError::SelectionLocked);
    }
    Ok(ids)
}

/// Clone items with fresh ids and remapped group ids, applying an
/// adjustment to each clone.
fn clone_items(scene: &Scene, ids: &[ItemId], adjust: impl Fn(&mut Item)) -> Vec<Item> {
    let mut group_map: HashMap<GroupId, GroupId> = HashMap::new();
    ids.iter()
        .filter_map(|id| scene.item(*id).cloned())
        .map(|mut clone| {
            clone.id = ItemId::new();
            clone.group_id = clone.group_id.map(|old| *group_map.entry(old).or_insert_with(GroupId::new));
            adjust(&mut clone);
            clone
        })
        .collect()
}

/// Move one item to a target z, shifting displaced items out of the
/// way so z stays unique. `upward` picks the shift direction.
fn place_at(scene: &mut Scene, id: ItemId, target: i64, upward: bool) {
    let occupied = scene.items().any(|other| other.id != id && other.z_index == target);
    if occupied {
        let displaced: Vec<(ItemId, i64)> = scene
            .items()
            .filter(|other| {
                other.id != id
                    && if upward {
                        other.z_index >= target
                    } else {
                        other.z_index <= target
                    }
            })
            .map(|other| (other.id, other.z_index))
            .collect();
        let delta = if upward { 1 } else { -1 };
        for (other, z) in displaced {
            scene.set_z_index(other, z + delta);
        }
    }
    scene.set_z_index(id, target);
}

/// Dissolve a group when fewer than two members remain.
fn dissolve_if_small(scene: &mut Scene, group: GroupId) {
    let members = scene.group_members(group);
    if members.len() < 2 {
        for member in members {
            scene.set_group(member, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{MediaKind, Spatial};
    use crate::scene::Scene;

    fn video_item(start: f64, duration: f64) -> Item {
        Item::media(MediaKind::Video, "clip.mp4", Spatial::new(0.0, 0.0, 640.0, 360.0))
            .with_time_range(TimeRange::new(start, duration))
    }

    fn scene_with_clip(start: f64, duration: f64) -> (Scene, ItemId) {
        let mut scene = Scene::new(60.0);
        let id = scene.add_item(video_item(start, duration));
        scene.set_selection(vec![id], Some(id));
        (scene, id)
    }

    #[test]
    fn test_split_inside_range() {
        let (mut scene, id) = scene_with_clip(10.0, 30.0);
        let created = split_at(&mut scene, 25.0).unwrap();
        assert_eq!(created.len(), 1);

        let first = scene.item(id).unwrap().temporal.unwrap();
        assert_eq!(first.start_time, 10.0);
        assert_eq!(first.duration, 15.0);

        let second = scene.item(created[0]).unwrap().temporal.unwrap();
        assert_eq!(second.start_time, 25.0);
        assert_eq!(second.end_time(), 40.0);

        // Selection stays on the first half
        assert_eq!(scene.selection().ids(), &[id]);
    }

    #[test]
    fn test_split_at_boundary_is_rejected() {
        let (mut scene, id) = scene_with_clip(10.0, 30.0);
        assert!(split_at(&mut scene, 10.0).is_err());
        assert!(split_at(&mut scene, 40.0).is_err());
        assert_eq!(scene.item_count(), 1);
        assert_eq!(scene.item(id).unwrap().temporal.unwrap().duration, 30.0);
    }

    #[test]
    fn test_split_skips_locked() {
        let (mut scene, id) = scene_with_clip(10.0, 30.0);
        scene.set_item_locked(id, true);
        assert!(split_at(&mut scene, 25.0).is_err());
        assert_eq!(scene.item_count(), 1);
    }

    #[test]
    fn test_duplicate_offsets_and_selects_copies() {
        let (mut scene, id) = scene_with_clip(0.0, 10.0);
        let copies = duplicate_selection(&mut scene).unwrap();
        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], id);

        let copy = scene.item(copies[0]).unwrap();
        let original = scene.item(id).unwrap();
        assert_eq!(copy.spatial.x, original.spatial.x + DUPLICATE_OFFSET);
        assert_eq!(copy.spatial.y, original.spatial.y + DUPLICATE_OFFSET);
        assert!(copy.z_index > original.z_index);
        assert_eq!(scene.selection().ids(), copies.as_slice());
    }

    #[test]
    fn test_duplicate_remaps_groups() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        scene.set_selection(vec![a, b], Some(a));
        let original_group = group_selection(&mut scene).unwrap();

        let copies = duplicate_selection(&mut scene).unwrap();
        let ga = scene.item(copies[0]).unwrap().group_id.unwrap();
        let gb = scene.item(copies[1]).unwrap().group_id.unwrap();
        assert_eq!(ga, gb);
        assert_ne!(ga, original_group);
    }

    #[test]
    fn test_group_requires_two_items() {
        let (mut scene, _id) = scene_with_clip(0.0, 10.0);
        assert_eq!(group_selection(&mut scene), Err(SceneError::GroupTooSmall));
    }

    #[test]
    fn test_regroup_dissolves_vacated_group() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        let c = scene.add_item(video_item(10.0, 5.0));
        scene.set_selection(vec![a, b], Some(a));
        group_selection(&mut scene).unwrap();

        // Pulling b into a new group with c leaves a alone; its group
        // dissolves.
        scene.set_selection(vec![b, c], Some(b));
        group_selection(&mut scene).unwrap();
        assert_eq!(scene.item(a).unwrap().group_id, None);
        assert_eq!(scene.item(b).unwrap().group_id, scene.item(c).unwrap().group_id);
    }

    #[test]
    fn test_ungroup_dissolves_remainder() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        scene.set_selection(vec![a, b], Some(a));
        group_selection(&mut scene).unwrap();

        scene.set_selection(vec![a], Some(a));
        ungroup_selection(&mut scene).unwrap();
        assert_eq!(scene.item(a).unwrap().group_id, None);
        assert_eq!(scene.item(b).unwrap().group_id, None);
    }

    fn z_of(scene: &Scene, id: ItemId) -> i64 {
        scene.item(id).unwrap().z_index
    }

    #[test]
    fn test_bring_forward_steps_past_neighbor() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0)); // z 1
        let b = scene.add_item(video_item(5.0, 5.0)); // z 2
        let c = scene.add_item(video_item(10.0, 5.0)); // z 3
        scene.set_selection(vec![a], Some(a));
        arrange_selection(&mut scene, Arrange::BringForward).unwrap();
        assert!(z_of(&scene, a) > z_of(&scene, b));
        assert!(scene.z_indices_distinct());
        // a now sits directly above b and below c
        let order: Vec<ItemId> = scene.items_by_z_order().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![b, a, c]);
    }

    #[test]
    fn test_forward_over_gap_neighbor() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        scene.set_z_index(a, 3);
        scene.set_z_index(b, 5);

        scene.set_selection(vec![a], Some(a));
        arrange_selection(&mut scene, Arrange::BringForward).unwrap();
        assert_eq!(z_of(&scene, a), 6);

        // Nothing sits below a anymore, so stepping it backward does
        // nothing either
        scene.set_selection(vec![b], Some(b));
        arrange_selection(&mut scene, Arrange::SendBackward).unwrap();
        assert_eq!(z_of(&scene, b), 5);
    }

    #[test]
    fn test_send_backward_at_bottom_is_noop() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let _b = scene.add_item(video_item(5.0, 5.0));
        let before = z_of(&scene, a);
        scene.set_selection(vec![a], Some(a));
        arrange_selection(&mut scene, Arrange::SendBackward).unwrap();
        assert_eq!(z_of(&scene, a), before);
    }

    #[test]
    fn test_front_and_back_extremes() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        let c = scene.add_item(video_item(10.0, 5.0));

        scene.set_selection(vec![a], Some(a));
        arrange_selection(&mut scene, Arrange::BringToFront).unwrap();
        let order: Vec<ItemId> = scene.items_by_z_order().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![b, c, a]);

        scene.set_selection(vec![c], Some(c));
        arrange_selection(&mut scene, Arrange::SendToBack).unwrap();
        let order: Vec<ItemId> = scene.items_by_z_order().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![c, b, a]);
        assert!(scene.z_indices_distinct());
    }

    #[test]
    fn test_multi_selection_keeps_relative_order() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        let c = scene.add_item(video_item(10.0, 5.0));
        scene.set_selection(vec![a, b], Some(a));
        arrange_selection(&mut scene, Arrange::BringToFront).unwrap();
        let order: Vec<ItemId> = scene.items_by_z_order().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![c, a, b]);
    }

    #[test]
    fn test_delete_skips_locked() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 5.0));
        let b = scene.add_item(video_item(5.0, 5.0));
        scene.set_item_locked(a, true);
        scene.set_selection(vec![a, b], Some(a));
        let removed = delete_selection(&mut scene).unwrap();
        assert_eq!(removed, 1);
        assert!(scene.contains_item(a));
        assert!(!scene.contains_item(b));
    }

    #[test]
    fn test_paste_reanchors_at_time() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(5.0, 10.0));
        let b = scene.add_item(video_item(8.0, 4.0));
        scene.set_selection(vec![a, b], Some(a));
        let clipboard = copy_selection(&scene).unwrap();

        let pasted = paste_items(&mut scene, &clipboard, 30.0).unwrap();
        assert_eq!(pasted.len(), 2);
        let pa = scene.item(pasted[0]).unwrap().temporal.unwrap();
        let pb = scene.item(pasted[1]).unwrap().temporal.unwrap();
        // Earliest start lands on the playhead, gaps preserved
        assert_eq!(pa.start_time, 30.0);
        assert_eq!(pb.start_time, 33.0);
        assert_eq!(scene.selection().ids(), pasted.as_slice());
    }

    #[test]
    fn test_paste_at_composition_end_keeps_positive_duration() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(5.0, 10.0));
        scene.set_selection(vec![a], Some(a));
        let clipboard = copy_selection(&scene).unwrap();

        let pasted = paste_items(&mut scene, &clipboard, 60.0).unwrap();
        let range = scene.item(pasted[0]).unwrap().temporal.unwrap();
        assert!(range.duration > 0.0);
        assert_eq!(range.start_time, 50.0);
        assert_eq!(range.end_time(), 60.0);
    }

    #[test]
    fn test_paste_survives_source_deletion() {
        let mut scene = Scene::new(60.0);
        let a = scene.add_item(video_item(0.0, 10.0));
        scene.set_selection(vec![a], Some(a));
        let clipboard = copy_selection(&scene).unwrap();
        scene.remove_items(&[a]);

        let pasted = paste_items(&mut scene, &clipboard, 0.0).unwrap();
        assert_eq!(pasted.len(), 1);
        assert!(scene.contains_item(pasted[0]));
    }
}

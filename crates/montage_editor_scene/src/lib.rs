// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene model for Montage Editor.
//!
//! This crate owns the canonical editing state:
//! - Items (video, image, text, audio) with spatial and temporal extents
//! - Fixed per-kind tracks with visibility/lock/collapse toggles
//! - Selection with a primary item
//! - Unique stacking order (z-index)
//! - Clip operations: split, duplicate, group, arrange, delete, paste
//!
//! ## Architecture
//!
//! The scene is the single writer; the interaction engine and the host
//! views read snapshots and feed mutations back through the narrow API
//! here. Geometry helpers are pure functions shared across crates.

pub mod error;
pub mod geometry;
pub mod item;
pub mod ops;
pub mod scene;
pub mod track;

pub use error::{OrderedTime, SceneError};
pub use geometry::{
    fit_within, normalize_degrees, pointer_angle, rotate_point, rotated_aabb, time_to_x, x_to_time,
    Rect, Vec2,
};
pub use item::{
    GroupId, Item, ItemId, ItemPayload, MediaKind, Spatial, TextAlign, TextStyle, TimeRange,
    MIN_ITEM_SIZE,
};
pub use ops::{
    arrange_selection, copy_selection, delete_selection, duplicate_selection, group_selection,
    paste_items, set_selection_locked, split_at, ungroup_selection, Arrange, DUPLICATE_OFFSET,
};
pub use scene::{Scene, Selection, SpatialPatch, TemporalPatch, DEFAULT_DURATION};
pub use track::{Track, TrackId, TrackState};

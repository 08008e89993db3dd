// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track definitions: one ordered lane per media kind.

use crate::item::{ItemId, MediaKind};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// A lane in the timeline grouping items of one media kind.
///
/// Tracks are created once at scene construction (one per kind) and
/// never destroyed during a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Media kind of every item on this track
    pub kind: MediaKind,
    /// Display name
    pub name: String,
    /// Items on this track, in insertion order
    pub items: Vec<ItemId>,
    /// Hidden tracks still hold their items
    pub visible: bool,
    /// Locked tracks refuse manipulation of their items
    pub locked: bool,
    /// Collapsed tracks render at a reduced height
    pub collapsed: bool,
}

impl Track {
    /// Create a new empty track for a media kind
    pub fn new(kind: MediaKind) -> Self {
        Self {
            id: TrackId::new(),
            kind,
            name: kind.name().to_string(),
            items: Vec::new(),
            visible: true,
            locked: false,
            collapsed: false,
        }
    }

    /// Whether the track holds the given item
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    /// Append an item reference
    pub(crate) fn push(&mut self, id: ItemId) {
        if !self.contains(id) {
            self.items.push(id);
        }
    }

    /// Remove an item reference
    pub(crate) fn remove(&mut self, id: ItemId) {
        self.items.retain(|i| *i != id);
    }

    /// Item count
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the track is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Persisted per-track toggles, keyed by media kind in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackState {
    /// Visibility toggle
    pub visible: bool,
    /// Lock toggle
    pub locked: bool,
    /// Collapse toggle
    pub collapsed: bool,
}

impl Default for TrackState {
    fn default() -> Self {
        Self {
            visible: true,
            locked: false,
            collapsed: false,
        }
    }
}

impl From<&Track> for TrackState {
    fn from(track: &Track) -> Self {
        Self {
            visible: track.visible,
            locked: track.locked,
            collapsed: track.collapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_idempotent() {
        let mut track = Track::new(MediaKind::Video);
        let id = ItemId::new();
        track.push(id);
        track.push(id);
        assert_eq!(track.len(), 1);
        track.remove(id);
        assert!(track.is_empty());
    }
}

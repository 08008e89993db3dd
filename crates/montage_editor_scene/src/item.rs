// SPDX-License-Identifier: MIT OR Apache-2.0
//! Item definitions: the composable unit placed on the canvas and the
//! timeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum width/height of an item in canvas pixels. Resize clamps to
/// this floor instead of producing degenerate rectangles.
pub const MIN_ITEM_SIZE: f64 = 20.0;

/// Unique identifier for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier shared by the members of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Create a new random group ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

/// Media kind of an item and of the track lane holding it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Video clip
    Video,
    /// Still image
    Image,
    /// Text element
    Text,
    /// Audio clip
    Audio,
}

impl MediaKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Image => "Image",
            Self::Text => "Text",
            Self::Audio => "Audio",
        }
    }

    /// Fixed lane stacking order in the timeline view
    pub fn all() -> &'static [MediaKind] {
        &[Self::Video, Self::Image, Self::Text, Self::Audio]
    }

    /// Whether items of this kind carry a temporal extent
    pub fn is_time_bearing(&self) -> bool {
        matches!(self, Self::Video | Self::Audio | Self::Text)
    }
}

/// Spatial placement of an item on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spatial {
    /// Left edge in canvas units
    pub x: f64,
    /// Top edge in canvas units
    pub y: f64,
    /// Width in canvas units (always > 0)
    pub width: f64,
    /// Height in canvas units (always > 0)
    pub height: f64,
    /// Rotation about the item center, degrees in `[0, 360)`
    pub rotation_degrees: f64,
}

impl Spatial {
    /// Create a spatial placement with no rotation
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation_degrees: 0.0,
        }
    }

    /// Width/height ratio
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Temporal extent of a time-bearing item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time in seconds, >= 0
    pub start_time: f64,
    /// Duration in seconds, > 0
    pub duration: f64,
}

impl TimeRange {
    /// Create a new time range
    pub fn new(start_time: f64, duration: f64) -> Self {
        Self { start_time, duration }
    }

    /// End of the range (exclusive)
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// Whether a time lies strictly inside the range
    pub fn contains_inside(&self, time: f64) -> bool {
        time > self.start_time && time < self.end_time()
    }
}

/// Horizontal alignment of text content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TextAlign {
    /// Left-aligned
    Left,
    /// Centered
    #[default]
    Center,
    /// Right-aligned
    Right,
}

/// Style attributes of a text item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// CSS-style color string (e.g. `#ffffff`)
    pub color: String,
    /// Font size in canvas pixels
    pub size_px: f64,
    /// Font family name
    pub family: String,
    /// Horizontal alignment
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            size_px: 36.0,
            family: "Arial, sans-serif".to_string(),
            align: TextAlign::Center,
        }
    }
}

/// Kind-specific payload of an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemPayload {
    /// Reference to an external media source (opaque handle)
    Media {
        /// Source handle understood by the host and the transcoder
        source: String,
    },
    /// Editable text content
    Text {
        /// The text to render
        content: String,
        /// Style attributes
        style: TextStyle,
    },
}

/// A single placed media/text element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item ID
    pub id: ItemId,
    /// Media kind (matches the containing track)
    pub kind: MediaKind,
    /// Spatial placement on the canvas
    pub spatial: Spatial,
    /// Temporal extent, present for time-bearing items
    pub temporal: Option<TimeRange>,
    /// Stacking order, unique across the scene
    pub z_index: i64,
    /// Locked items refuse manipulation
    pub locked: bool,
    /// Group membership, if any
    pub group_id: Option<GroupId>,
    /// Kind-specific payload
    pub payload: ItemPayload,
}

impl Item {
    /// Create a media item (video, image or audio)
    pub fn media(kind: MediaKind, source: impl Into<String>, spatial: Spatial) -> Self {
        Self {
            id: ItemId::new(),
            kind,
            spatial,
            temporal: None,
            z_index: 0,
            locked: false,
            group_id: None,
            payload: ItemPayload::Media { source: source.into() },
        }
    }

    /// Create a text item with default style
    pub fn text(content: impl Into<String>, spatial: Spatial) -> Self {
        Self {
            id: ItemId::new(),
            kind: MediaKind::Text,
            spatial,
            temporal: None,
            z_index: 0,
            locked: false,
            group_id: None,
            payload: ItemPayload::Text {
                content: content.into(),
                style: TextStyle::default(),
            },
        }
    }

    /// Attach a temporal extent
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        self.temporal = Some(range);
        self
    }

    /// Whether the item carries a temporal extent
    pub fn is_time_bearing(&self) -> bool {
        self.temporal.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_bounds() {
        let range = TimeRange::new(10.0, 30.0);
        assert_eq!(range.end_time(), 40.0);
        assert!(range.contains_inside(25.0));
        assert!(!range.contains_inside(10.0));
        assert!(!range.contains_inside(40.0));
    }

    #[test]
    fn test_item_ids_unique() {
        let a = Item::text("a", Spatial::new(0.0, 0.0, 100.0, 50.0));
        let b = Item::text("b", Spatial::new(0.0, 0.0, 100.0, 50.0));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_kind_order_fixed() {
        assert_eq!(
            MediaKind::all(),
            &[MediaKind::Video, MediaKind::Image, MediaKind::Text, MediaKind::Audio]
        );
    }
}

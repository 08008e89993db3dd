// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host-neutral input events.
//!
//! The host (a canvas widget, a timeline widget, a test harness) turns
//! its native events into these plain values; the engine never sees
//! platform event types.

use montage_editor_scene::{ItemId, MediaKind, Vec2};
use serde::{Deserialize, Serialize};

/// Modifier keys held during a pointer event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Shift key
    pub shift: bool,
    /// Ctrl (or Cmd) key
    pub ctrl: bool,
    /// Alt key
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };
}

/// One of the eight resize handles on a selected item's frame.
///
/// Corner handles preserve the aspect ratio; edge handles resize a
/// single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeHandle {
    /// Top-left corner
    TopLeft,
    /// Top edge
    Top,
    /// Top-right corner
    TopRight,
    /// Right edge
    Right,
    /// Bottom-right corner
    BottomRight,
    /// Bottom edge
    Bottom,
    /// Bottom-left corner
    BottomLeft,
    /// Left edge
    Left,
}

impl ResizeHandle {
    /// Whether this is a corner handle (aspect-locked)
    pub fn is_corner(&self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight | Self::BottomRight | Self::BottomLeft)
    }

    /// Whether the handle moves the left edge
    pub fn affects_left(&self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    /// Whether the handle moves the right edge
    pub fn affects_right(&self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    /// Whether the handle moves the top edge
    pub fn affects_top(&self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    /// Whether the handle moves the bottom edge
    pub fn affects_bottom(&self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }
}

/// Which edge of a clip a trim drag grabs in the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrimEdge {
    /// Adjust the start (left edge)
    Start,
    /// Adjust the end (right edge)
    End,
}

/// What the pointer went down on, as resolved by the host's hit test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitTarget {
    /// Empty canvas or timeline background
    Background,
    /// The body of an item on the canvas
    ItemBody(ItemId),
    /// A resize handle on the selection frame
    ItemResize(ItemId, ResizeHandle),
    /// The rotate handle above the selection frame
    ItemRotate(ItemId),
    /// The body of a clip in the timeline
    ClipBody(ItemId),
    /// A trim handle on a clip edge in the timeline
    ClipTrim(ItemId, TrimEdge),
    /// The time ruler
    Ruler,
    /// The divider below a track header (drag to resize the lane)
    TrackDivider(MediaKind),
}

/// A pointer event in host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Pointer position
    pub position: Vec2,
    /// Modifier keys held
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Event at a position with no modifiers
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            modifiers: Modifiers::NONE,
        }
    }

    /// Event at a position with modifiers
    pub fn with_modifiers(position: Vec2, modifiers: Modifiers) -> Self {
        Self { position, modifiers }
    }
}

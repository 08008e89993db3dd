// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interaction engine for Montage Editor.
//!
//! This crate turns pointer input into scene edits:
//! - Manipulation sessions (drag, resize, rotate, marquee, scrub,
//!   clip move/trim, lane resize) with preview and single commit
//! - Snap engine for timeline drags
//! - Canvas and timeline projections for the host painter
//! - Playback transport
//!
//! ## Architecture
//!
//! The host resolves hits and feeds [`input::PointerEvent`]s to a
//! [`session::Session`]; previews write straight into the scene and a
//! commit is reported back so the application layer can record one
//! undo entry per gesture.

pub mod input;
pub mod projection;
pub mod session;
pub mod snap;
pub mod transport;

pub use input::{HitTarget, Modifiers, PointerEvent, ResizeHandle, TrimEdge};
pub use projection::{
    project_canvas, project_timeline, CanvasItemVisual, CanvasViewport, CanvasVisual,
    TimelineClipVisual, TimelineLaneVisual, TimelineViewport, TimelineVisual, LANE_HEIGHT_COLLAPSED,
    LANE_HEIGHT_DEFAULT, LANE_HEIGHT_MAX, LANE_HEIGHT_MIN, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP,
};
pub use session::{EngineCtx, Session, SessionEvent, MIN_CLIP_SECONDS};
pub use snap::{candidates, snap_range, snap_value, SnapCandidate, SnapHit, SnapKind, SNAP_THRESHOLD_FRACTION};
pub use transport::{PlaybackState, Transport, FRAME_STEP, JUMP_SECONDS, SPEED_PRESETS};

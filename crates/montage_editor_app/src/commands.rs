// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor commands and the keyboard map.
//!
//! A [`Command`] is a self-contained editor operation; the state layer
//! dispatches it and records history. The keyboard map mirrors the
//! usual editing conventions (Ctrl+Z, Ctrl+D, Space, arrows).

use montage_editor_engine::Modifiers;
use montage_editor_scene::Arrange;
use serde::{Deserialize, Serialize};

/// A dispatchable editor operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Delete the selection (locked items survive)
    DeleteSelection,
    /// Duplicate the selection with an offset
    DuplicateSelection,
    /// Split selected clips at the playhead
    SplitAtPlayhead,
    /// Group the selection
    GroupSelection,
    /// Ungroup the selection
    UngroupSelection,
    /// Copy the selection to the clipboard
    CopySelection,
    /// Paste the clipboard at the playhead
    Paste,
    /// Change the stacking order of the selection
    ArrangeSelection(Arrange),
    /// Toggle the lock flag on the selection
    ToggleLock,
    /// Select every item
    SelectAll,
    /// Undo the last edit
    Undo,
    /// Redo the last undone edit
    Redo,
    /// Toggle play/pause
    TogglePlayback,
    /// Step one frame forward
    StepForward,
    /// Step one frame backward
    StepBackward,
    /// Jump forward five seconds
    JumpForward,
    /// Jump backward five seconds
    JumpBackward,
    /// Set the playback speed
    SetSpeed(f64),
    /// Zoom the canvas in
    ZoomIn,
    /// Zoom the canvas out
    ZoomOut,
    /// Reset the canvas zoom and pan
    ZoomReset,
    /// Cancel a running manipulation
    Cancel,
}

impl Command {
    /// Human-readable description, used for undo labels and logging
    pub fn description(&self) -> &'static str {
        match self {
            Self::DeleteSelection => "Delete selection",
            Self::DuplicateSelection => "Duplicate selection",
            Self::SplitAtPlayhead => "Split clip",
            Self::GroupSelection => "Group items",
            Self::UngroupSelection => "Ungroup items",
            Self::CopySelection => "Copy",
            Self::Paste => "Paste",
            Self::ArrangeSelection(Arrange::BringForward) => "Bring forward",
            Self::ArrangeSelection(Arrange::SendBackward) => "Send backward",
            Self::ArrangeSelection(Arrange::BringToFront) => "Bring to front",
            Self::ArrangeSelection(Arrange::SendToBack) => "Send to back",
            Self::ToggleLock => "Toggle lock",
            Self::SelectAll => "Select all",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::TogglePlayback => "Play/pause",
            Self::StepForward => "Step forward",
            Self::StepBackward => "Step backward",
            Self::JumpForward => "Jump forward",
            Self::JumpBackward => "Jump backward",
            Self::SetSpeed(_) => "Set speed",
            Self::ZoomIn => "Zoom in",
            Self::ZoomOut => "Zoom out",
            Self::ZoomReset => "Reset zoom",
            Self::Cancel => "Cancel",
        }
    }

    /// Whether dispatching this command edits the scene (and should
    /// record an undo entry)
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::DeleteSelection
                | Self::DuplicateSelection
                | Self::SplitAtPlayhead
                | Self::GroupSelection
                | Self::UngroupSelection
                | Self::Paste
                | Self::ArrangeSelection(_)
                | Self::ToggleLock
        )
    }
}

/// A pressed key, host-neutral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// A printable character (lowercased)
    Char(char),
    /// Delete key
    Delete,
    /// Backspace key
    Backspace,
    /// Space bar
    Space,
    /// Escape key
    Escape,
    /// Left arrow
    ArrowLeft,
    /// Right arrow
    ArrowRight,
}

/// Resolve a key press to a command, if it is bound
pub fn command_for_key(key: Key, mods: Modifiers) -> Option<Command> {
    match (key, mods.ctrl, mods.shift) {
        (Key::Delete | Key::Backspace, _, _) => Some(Command::DeleteSelection),
        (Key::Escape, _, _) => Some(Command::Cancel),
        (Key::Space, _, _) => Some(Command::TogglePlayback),

        (Key::ArrowLeft, false, false) => Some(Command::StepBackward),
        (Key::ArrowRight, false, false) => Some(Command::StepForward),
        (Key::ArrowLeft, false, true) => Some(Command::JumpBackward),
        (Key::ArrowRight, false, true) => Some(Command::JumpForward),

        (Key::Char('d'), true, _) => Some(Command::DuplicateSelection),
        (Key::Char('c'), true, _) => Some(Command::CopySelection),
        (Key::Char('v'), true, _) => Some(Command::Paste),
        (Key::Char('a'), true, _) => Some(Command::SelectAll),
        (Key::Char('g'), true, false) => Some(Command::GroupSelection),
        (Key::Char('g'), true, true) => Some(Command::UngroupSelection),
        (Key::Char('z'), true, false) => Some(Command::Undo),
        (Key::Char('z'), true, true) | (Key::Char('y'), true, _) => Some(Command::Redo),

        (Key::Char('s'), _, _) => Some(Command::SplitAtPlayhead),
        (Key::Char('u'), true, _) => Some(Command::UngroupSelection),
        (Key::Char('l'), false, _) => Some(Command::ToggleLock),

        (Key::Char(']'), false, _) => Some(Command::ArrangeSelection(Arrange::BringForward)),
        (Key::Char('['), false, _) => Some(Command::ArrangeSelection(Arrange::SendBackward)),
        (Key::Char(']'), true, _) => Some(Command::ArrangeSelection(Arrange::BringToFront)),
        (Key::Char('['), true, _) => Some(Command::ArrangeSelection(Arrange::SendToBack)),

        (Key::Char('=') | Key::Char('+'), _, _) => Some(Command::ZoomIn),
        (Key::Char('-'), _, _) => Some(Command::ZoomOut),
        (Key::Char('0'), _, _) => Some(Command::ZoomReset),

        (Key::Char('1'), false, _) => Some(Command::SetSpeed(0.5)),
        (Key::Char('2'), false, _) => Some(Command::SetSpeed(1.0)),
        (Key::Char('3'), false, _) => Some(Command::SetSpeed(1.5)),
        (Key::Char('4'), false, _) => Some(Command::SetSpeed(2.0)),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
    const CTRL_SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: true,
        alt: false,
    };

    #[test]
    fn test_basic_bindings() {
        assert_eq!(
            command_for_key(Key::Delete, Modifiers::NONE),
            Some(Command::DeleteSelection)
        );
        assert_eq!(
            command_for_key(Key::Char('d'), CTRL),
            Some(Command::DuplicateSelection)
        );
        assert_eq!(
            command_for_key(Key::Space, Modifiers::NONE),
            Some(Command::TogglePlayback)
        );
        assert_eq!(command_for_key(Key::Char('q'), Modifiers::NONE), None);
    }

    #[test]
    fn test_group_and_ungroup_share_key() {
        assert_eq!(command_for_key(Key::Char('g'), CTRL), Some(Command::GroupSelection));
        assert_eq!(
            command_for_key(Key::Char('g'), CTRL_SHIFT),
            Some(Command::UngroupSelection)
        );
    }

    #[test]
    fn test_redo_aliases() {
        assert_eq!(command_for_key(Key::Char('z'), CTRL_SHIFT), Some(Command::Redo));
        assert_eq!(command_for_key(Key::Char('y'), CTRL), Some(Command::Redo));
    }

    #[test]
    fn test_edit_classification() {
        assert!(Command::DeleteSelection.is_edit());
        assert!(Command::Paste.is_edit());
        assert!(!Command::Undo.is_edit());
        assert!(!Command::TogglePlayback.is_edit());
        assert!(!Command::CopySelection.is_edit());
    }
}

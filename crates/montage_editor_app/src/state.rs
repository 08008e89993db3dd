// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor state: scene, session, transport, viewports, history and
//! clipboard, wired together behind pointer and command entry points.
//!
//! Gestures record exactly one undo entry: the scene is snapshotted
//! when a session starts and committed against the post-gesture scene
//! on pointer-up. Commands snapshot around their dispatch.

use crate::commands::{command_for_key, Command, Key};
use crate::config::Preferences;
use crate::history::History;
use crate::playback::{self, PlaybackProgress};
use montage_editor_engine::{
    project_canvas, project_timeline, CanvasViewport, CanvasVisual, EngineCtx, HitTarget,
    Modifiers, PointerEvent, Session, SessionEvent, TimelineViewport, TimelineVisual, Transport,
};
use montage_editor_scene::{
    arrange_selection, copy_selection, delete_selection, duplicate_selection, fit_within,
    group_selection, paste_items, set_selection_locked, split_at, ungroup_selection, Item, ItemId,
    MediaKind, Scene, SceneError, Spatial, TimeRange,
};

/// Label used for pointer-gesture undo entries
const GESTURE_LABEL: &str = "Manipulate items";

/// The whole editor, wired together.
pub struct EditorState {
    /// The scene being edited
    pub scene: Scene,
    /// Pointer manipulation session
    pub session: Session,
    /// Playback transport
    pub transport: Transport,
    /// Canvas view transform
    pub canvas: CanvasViewport,
    /// Timeline geometry
    pub timeline: TimelineViewport,
    /// Undo/redo history
    pub history: History,
    /// User preferences
    pub preferences: Preferences,
    clipboard: Vec<Item>,
    gesture_before: Option<Scene>,
}

impl EditorState {
    /// Create a fresh editor from preferences
    pub fn new(preferences: Preferences) -> Self {
        let mut session = Session::new();
        session.set_snap_enabled(preferences.snap_enabled);
        Self {
            scene: Scene::new(preferences.default_duration),
            session,
            transport: Transport::new(),
            canvas: CanvasViewport::new(),
            timeline: TimelineViewport::new(800.0),
            history: History::new(),
            preferences,
            clipboard: Vec::new(),
            gesture_before: None,
        }
    }

    // --- pointer entry points -------------------------------------------

    /// Forward a pointer-down from the host's hit test
    pub fn pointer_down(&mut self, target: HitTarget, event: PointerEvent) -> SessionEvent {
        let was_active = self.session.is_active();
        let snapshot = if was_active { None } else { Some(self.scene.clone()) };
        let mut ctx = EngineCtx {
            transport: &mut self.transport,
            timeline: &mut self.timeline,
        };
        let outcome = self.session.pointer_down(&mut self.scene, target, event, &mut ctx);
        if !was_active && self.session.is_active() {
            self.gesture_before = snapshot;
        }
        outcome
    }

    /// Forward a pointer-move
    pub fn pointer_move(&mut self, event: PointerEvent) {
        let mut ctx = EngineCtx {
            transport: &mut self.transport,
            timeline: &mut self.timeline,
        };
        self.session.pointer_move(&mut self.scene, event, &mut ctx);
    }

    /// Forward a pointer-up; a committed gesture records one undo entry
    pub fn pointer_up(&mut self) -> SessionEvent {
        let outcome = self.session.pointer_up(&mut self.scene);
        match (outcome, self.gesture_before.take()) {
            (SessionEvent::Committed, Some(before)) => {
                if let Err(err) = self.history.record(GESTURE_LABEL, &before, &self.scene) {
                    tracing::warn!(%err, "failed to record gesture");
                }
            }
            _ => {}
        }
        outcome
    }

    /// Forward a key press
    pub fn key(&mut self, key: Key, mods: Modifiers) {
        if let Some(command) = command_for_key(key, mods) {
            self.apply(command);
        }
    }

    /// Advance playback by a wall-clock delta
    pub fn update(&mut self, delta_seconds: f64) {
        self.transport.update(delta_seconds, self.scene.duration);
    }

    /// Consume a backend time-progress report; while the reporting
    /// clip plays, its media clock drives the shared playhead
    pub fn playback_progress(&mut self, report: PlaybackProgress) {
        playback::apply_progress(&self.scene, &mut self.transport, report);
    }

    // --- command dispatch -----------------------------------------------

    /// Dispatch a command. Scene edits are ignored while a pointer
    /// session is running; Cancel always goes through.
    pub fn apply(&mut self, command: Command) {
        if self.session.is_active() && command != Command::Cancel {
            tracing::debug!(?command, "ignored during active session");
            return;
        }
        match command {
            Command::Cancel => {
                let mut ctx = EngineCtx {
                    transport: &mut self.transport,
                    timeline: &mut self.timeline,
                };
                self.session.cancel(&mut self.scene, &mut ctx);
                self.gesture_before = None;
            }
            Command::Undo => match self.history.undo() {
                Ok(scene) => self.scene = scene,
                Err(err) => tracing::debug!(%err, "undo unavailable"),
            },
            Command::Redo => match self.history.redo() {
                Ok(scene) => self.scene = scene,
                Err(err) => tracing::debug!(%err, "redo unavailable"),
            },
            Command::CopySelection => match copy_selection(&self.scene) {
                Ok(items) => self.clipboard = items,
                Err(err) => tracing::debug!(%err, "nothing to copy"),
            },
            Command::SelectAll => {
                let ids: Vec<ItemId> = self.scene.items().map(|item| item.id).collect();
                let primary = ids.first().copied();
                self.scene.set_selection(ids, primary);
            }
            Command::TogglePlayback => self.transport.toggle(),
            Command::StepForward => self.transport.step_frame(true, self.scene.duration),
            Command::StepBackward => self.transport.step_frame(false, self.scene.duration),
            Command::JumpForward => self.transport.jump(true, self.scene.duration),
            Command::JumpBackward => self.transport.jump(false, self.scene.duration),
            Command::SetSpeed(speed) => self.transport.set_speed(speed),
            Command::ZoomIn => self.canvas.zoom_in(),
            Command::ZoomOut => self.canvas.zoom_out(),
            Command::ZoomReset => self.canvas.reset(),
            edit if edit.is_edit() => self.run_edit(edit),
            other => tracing::debug!(command = other.description(), "command has no effect"),
        }
    }

    fn run_edit(&mut self, command: Command) {
        let before = self.scene.clone();
        let result = self.dispatch_edit(command);
        match result {
            Ok(()) => {
                if let Err(err) = self.history.record(command.description(), &before, &self.scene) {
                    tracing::warn!(%err, "failed to record edit");
                }
            }
            Err(err) => tracing::debug!(command = command.description(), %err, "edit ignored"),
        }
    }

    fn dispatch_edit(&mut self, command: Command) -> Result<(), SceneError> {
        match command {
            Command::DeleteSelection => delete_selection(&mut self.scene).map(|_| ()),
            Command::DuplicateSelection => duplicate_selection(&mut self.scene).map(|_| ()),
            Command::SplitAtPlayhead => {
                split_at(&mut self.scene, self.transport.playhead).map(|_| ())
            }
            Command::GroupSelection => group_selection(&mut self.scene).map(|_| ()),
            Command::UngroupSelection => ungroup_selection(&mut self.scene),
            Command::Paste => {
                if self.clipboard.is_empty() {
                    return Err(SceneError::EmptySelection);
                }
                let clipboard = self.clipboard.clone();
                paste_items(&mut self.scene, &clipboard, self.transport.playhead).map(|_| ())
            }
            Command::ArrangeSelection(direction) => {
                arrange_selection(&mut self.scene, direction)
            }
            Command::ToggleLock => {
                let any_unlocked = self
                    .scene
                    .selection()
                    .ids()
                    .iter()
                    .filter_map(|id| self.scene.item(*id))
                    .any(|item| !item.locked);
                set_selection_locked(&mut self.scene, any_unlocked)
            }
            _ => Ok(()),
        }
    }

    // --- import ---------------------------------------------------------

    /// Import a media file. The item is sized to fit the canvas,
    /// centered, selected, and time-bearing kinds get a clip starting
    /// at the playhead.
    pub fn import_media(
        &mut self,
        kind: MediaKind,
        source: &str,
        natural_width: f64,
        natural_height: f64,
        media_duration: Option<f64>,
    ) -> ItemId {
        let before = self.scene.clone();
        let (width, height) = fit_within(
            natural_width.max(1.0),
            natural_height.max(1.0),
            self.preferences.canvas_width,
            self.preferences.canvas_height,
        );
        let spatial = Spatial::new(
            (self.preferences.canvas_width - width) / 2.0,
            (self.preferences.canvas_height - height) / 2.0,
            width,
            height,
        );
        let mut item = Item::media(kind, source, spatial);
        if kind.is_time_bearing() {
            let duration = media_duration.unwrap_or(self.preferences.default_clip_seconds);
            item = item.with_time_range(TimeRange::new(self.transport.playhead, duration));
        }
        let id = self.scene.add_item(item);
        self.scene.set_selection(vec![id], Some(id));
        if let Err(err) = self.history.record("Import media", &before, &self.scene) {
            tracing::warn!(%err, "failed to record import");
        }
        tracing::info!(source, ?kind, "imported media");
        id
    }

    /// Add a text item at the center of the canvas
    pub fn add_text(&mut self, content: &str) -> ItemId {
        let before = self.scene.clone();
        let spatial = Spatial::new(
            (self.preferences.canvas_width - 320.0) / 2.0,
            (self.preferences.canvas_height - 80.0) / 2.0,
            320.0,
            80.0,
        );
        let item = Item::text(content, spatial).with_time_range(TimeRange::new(
            self.transport.playhead,
            self.preferences.default_clip_seconds,
        ));
        let id = self.scene.add_item(item);
        self.scene.set_selection(vec![id], Some(id));
        if let Err(err) = self.history.record("Add text", &before, &self.scene) {
            tracing::warn!(%err, "failed to record text");
        }
        id
    }

    // --- projections ----------------------------------------------------

    /// Project the canvas for the host painter
    pub fn canvas_visual(&self) -> CanvasVisual {
        let marquee = self
            .session
            .marquee_rect()
            .map(|rect| self.canvas.rect_to_screen(rect));
        project_canvas(
            &self.scene,
            &self.canvas,
            &self.session.manipulating_ids(),
            marquee,
        )
    }

    /// Project the timeline for the host painter
    pub fn timeline_visual(&self) -> TimelineVisual {
        project_timeline(
            &self.scene,
            &self.timeline,
            self.transport.playhead,
            self.session.snap_hit(),
        )
    }

    /// Items currently on the clipboard
    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }
}

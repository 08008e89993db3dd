// SPDX-License-Identifier: MIT OR Apache-2.0
//! Montage Editor - multi-track media composition editor
//!
//! The interactive core behind a canvas-plus-timeline editing UI:
//! - Scene model with per-kind tracks, selection and stacking order
//! - Pointer manipulation sessions with preview and single-commit undo
//! - Snap engine for timeline drags
//! - Clip operations: split, duplicate, group, arrange, lock, paste
//! - JSON projects, RON preferences, ffmpeg-style export jobs
//!
//! ## Architecture
//!
//! The binary wires the `montage_editor_scene` and
//! `montage_editor_engine` crates together behind [`state::EditorState`]
//! and runs a short scripted session; a host UI embeds the same state
//! type and feeds it real pointer and key events.

mod commands;
mod config;
mod export;
mod history;
mod playback;
mod project;
mod state;

use commands::{Command, Key};
use config::Preferences;
use export::{ExportSettings, Transcoder};
use montage_editor_engine::{HitTarget, Modifiers, PointerEvent};
use montage_editor_scene::{Arrange, ItemId, MediaKind, Vec2};
use playback::MediaPlayback;
use state::EditorState;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Transcoder that only logs the argument lists it would run
struct DryRunTranscoder;

impl Transcoder for DryRunTranscoder {
    fn run(&mut self, args: &[String]) -> Result<(), export::ExportError> {
        tracing::info!(args = %args.join(" "), "ffmpeg (dry run)");
        Ok(())
    }
}

/// Playback backend that only logs what it is told
struct DryRunPlayback;

impl MediaPlayback for DryRunPlayback {
    fn set_playing(&mut self, id: ItemId, playing: bool) {
        tracing::debug!(?id, playing, "playback");
    }
    fn seek(&mut self, id: ItemId, local_time: f64) {
        tracing::debug!(?id, local_time, "seek");
    }
    fn set_rate(&mut self, id: ItemId, rate: f64) {
        tracing::debug!(?id, rate, "rate");
    }
}

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("montage_editor=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let prefs_path = std::env::temp_dir().join("montage_preferences.ron");
    let preferences = match Preferences::load(&prefs_path) {
        Ok(prefs) => prefs,
        Err(err) => {
            tracing::warn!(%err, "could not load preferences, using defaults");
            Preferences::default()
        }
    };
    let mut editor = EditorState::new(preferences);

    // Build a small composition
    let clip = editor.import_media(MediaKind::Video, "intro.mp4", 1920.0, 1080.0, Some(12.0));
    editor.import_media(MediaKind::Image, "logo.png", 400.0, 400.0, None);
    editor.add_text("Montage Editor");

    // Drag the video 40px right, 20px down
    editor.pointer_down(HitTarget::ItemBody(clip), PointerEvent::at(Vec2::new(100.0, 100.0)));
    editor.pointer_move(PointerEvent::at(Vec2::new(140.0, 120.0)));
    editor.pointer_up();

    // Split the clip under the playhead, then stack the logo on top
    editor.transport.seek(6.0, editor.scene.duration);
    editor.scene.set_selection(vec![clip], Some(clip));
    editor.apply(Command::SplitAtPlayhead);
    editor.apply(Command::ArrangeSelection(Arrange::BringToFront));

    // Run a second of playback against the logging backend
    editor.key(Key::Space, Modifiers::NONE);
    let mut media = DryRunPlayback;
    for _ in 0..30 {
        editor.update(1.0 / 30.0);
        playback::sync(&editor.scene, &editor.transport, &mut media);
    }
    editor.key(Key::Space, Modifiers::NONE);

    let canvas = editor.canvas_visual();
    let timeline = editor.timeline_visual();
    let stats = editor.history.stats();
    tracing::info!(
        items = editor.scene.item_count(),
        canvas_items = canvas.items.len(),
        lanes = timeline.lanes.len(),
        undo_depth = stats.undo_count,
        history_bytes = stats.memory_used,
        "composition ready"
    );

    // Persist the project and preferences
    let project_path = std::env::temp_dir().join("montage_demo.json");
    let snapshot = project::ProjectSnapshot::from_scene("demo", &editor.scene);
    if let Err(err) = snapshot.save(&project_path) {
        tracing::error!(%err, "failed to save project");
    }
    if let Err(err) = editor.preferences.save(&prefs_path) {
        tracing::error!(%err, "failed to save preferences");
    }

    // Dry-run export
    let mut transcoder = DryRunTranscoder;
    if let Err(err) = export::run_export(
        &editor.scene,
        &ExportSettings::default(),
        &mut transcoder,
        |event| tracing::info!(?event, "export"),
    ) {
        tracing::error!(%err, "export failed");
    }
}

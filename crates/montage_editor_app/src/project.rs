// SPDX-License-Identifier: MIT OR Apache-2.0
//! Project persistence: JSON snapshots of the composition.
//!
//! A project file stores the items and per-track toggles; selection,
//! viewports and history are session state and stay out of the file.
//! Loading validates the snapshot before a scene is built from it, so
//! a bad file never produces a half-valid scene.

use montage_editor_scene::{Item, MediaKind, Scene, TrackState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Project file errors
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Snapshot failed validation
    #[error("invalid project: {0}")]
    Invalid(String),
}

/// A saved composition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Project name
    pub name: String,
    /// Composition duration in seconds
    pub duration: f64,
    /// All items, in stacking order
    pub items: Vec<Item>,
    /// Per-track toggles
    pub track_states: Vec<(MediaKind, TrackState)>,
    /// Unix timestamp of creation
    pub created: u64,
    /// Unix timestamp of the last save
    pub last_modified: u64,
}

impl ProjectSnapshot {
    /// Snapshot a scene
    pub fn from_scene(name: impl Into<String>, scene: &Scene) -> Self {
        let now = unix_now();
        Self {
            name: name.into(),
            duration: scene.duration,
            items: scene.items_by_z_order().into_iter().cloned().collect(),
            track_states: scene
                .tracks()
                .iter()
                .map(|track| (track.kind, TrackState::from(track)))
                .collect(),
            created: now,
            last_modified: now,
        }
    }

    /// Validate and build a scene. Items are re-stacked in their saved
    /// order; z-index values are normalized in the process.
    pub fn into_scene(self) -> Result<Scene, ProjectError> {
        self.validate()?;
        let mut scene = Scene::new(self.duration);
        let mut ordered = self.items;
        ordered.sort_by_key(|item| item.z_index);
        for item in ordered {
            scene.add_item(item);
        }
        for (kind, state) in self.track_states {
            scene.set_track_visible(kind, state.visible);
            scene.set_track_locked(kind, state.locked);
            scene.set_track_collapsed(kind, state.collapsed);
        }
        Ok(scene)
    }

    /// Check the snapshot's internal consistency
    pub fn validate(&self) -> Result<(), ProjectError> {
        if !(self.duration > 0.0 && self.duration.is_finite()) {
            return Err(ProjectError::Invalid(format!(
                "non-positive duration {}",
                self.duration
            )));
        }
        let mut seen_z = std::collections::HashSet::new();
        for item in &self.items {
            if item.spatial.width <= 0.0 || item.spatial.height <= 0.0 {
                return Err(ProjectError::Invalid(format!(
                    "item {:?} has a degenerate size",
                    item.id
                )));
            }
            if let Some(range) = item.temporal {
                if range.duration <= 0.0
                    || range.start_time < 0.0
                    || range.end_time() > self.duration
                {
                    return Err(ProjectError::Invalid(format!(
                        "item {:?} lies outside the composition",
                        item.id
                    )));
                }
            }
            if !seen_z.insert(item.z_index) {
                return Err(ProjectError::Invalid(format!(
                    "duplicate z-index {}",
                    item.z_index
                )));
            }
        }
        Ok(())
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let mut snapshot = self.clone();
        snapshot.last_modified = unix_now();
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), items = self.items.len(), "saved project");
        Ok(())
    }

    /// Load and validate from JSON
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let json = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&json)?;
        snapshot.validate()?;
        tracing::info!(path = %path.display(), items = snapshot.items.len(), "loaded project");
        Ok(snapshot)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_editor_scene::{Spatial, TimeRange};

    fn sample_scene() -> Scene {
        let mut scene = Scene::new(60.0);
        scene.add_item(
            Item::media(MediaKind::Video, "a.mp4", Spatial::new(0.0, 0.0, 640.0, 360.0))
                .with_time_range(TimeRange::new(5.0, 10.0)),
        );
        scene.add_item(Item::text("Title", Spatial::new(10.0, 10.0, 200.0, 60.0)));
        scene.set_track_collapsed(MediaKind::Audio, true);
        scene
    }

    #[test]
    fn test_scene_round_trip() {
        let scene = sample_scene();
        let snapshot = ProjectSnapshot::from_scene("demo", &scene);
        let restored = snapshot.into_scene().unwrap();
        assert_eq!(restored.item_count(), 2);
        assert_eq!(restored.duration, 60.0);
        assert!(restored.track(MediaKind::Audio).collapsed);
        // Stacking order survives even though z values are normalized
        let kinds: Vec<MediaKind> = restored.items_by_z_order().iter().map(|i| i.kind).collect();
        assert_eq!(kinds, vec![MediaKind::Video, MediaKind::Text]);
    }

    #[test]
    fn test_validation_rejects_out_of_range_clip() {
        let mut snapshot = ProjectSnapshot::from_scene("demo", &sample_scene());
        snapshot.items[0].temporal = Some(TimeRange::new(55.0, 10.0));
        assert!(matches!(snapshot.validate(), Err(ProjectError::Invalid(_))));
    }

    #[test]
    fn test_validation_rejects_duplicate_z() {
        let mut snapshot = ProjectSnapshot::from_scene("demo", &sample_scene());
        snapshot.items[1].z_index = snapshot.items[0].z_index;
        assert!(matches!(snapshot.validate(), Err(ProjectError::Invalid(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let scene = sample_scene();
        let snapshot = ProjectSnapshot::from_scene("demo", &scene);
        let dir = std::env::temp_dir();
        let path = dir.join("montage_project_test.json");
        snapshot.save(&path).unwrap();
        let loaded = ProjectSnapshot::load(&path).unwrap();
        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.items.len(), 2);
        std::fs::remove_file(&path).ok();
    }
}

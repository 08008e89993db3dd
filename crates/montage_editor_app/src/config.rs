// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor preferences, persisted as RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Preference file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON
    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),
}

/// A named canvas size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasPreset {
    /// Display name
    pub name: String,
    /// Canvas width in pixels
    pub width: f64,
    /// Canvas height in pixels
    pub height: f64,
}

/// Built-in canvas size presets
pub fn canvas_presets() -> Vec<CanvasPreset> {
    vec![
        CanvasPreset {
            name: "Standard (4:3)".to_string(),
            width: 640.0,
            height: 480.0,
        },
        CanvasPreset {
            name: "YouTube (16:9)".to_string(),
            width: 1920.0,
            height: 1080.0,
        },
        CanvasPreset {
            name: "Instagram (1:1)".to_string(),
            width: 1080.0,
            height: 1080.0,
        },
        CanvasPreset {
            name: "TikTok (9:16)".to_string(),
            width: 1080.0,
            height: 1920.0,
        },
    ]
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Canvas width in pixels
    pub canvas_width: f64,
    /// Canvas height in pixels
    pub canvas_height: f64,
    /// Whether timeline drags snap to candidates
    pub snap_enabled: bool,
    /// Default clip length for imported images and text, in seconds
    pub default_clip_seconds: f64,
    /// Composition duration for new projects, in seconds
    pub default_duration: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            canvas_width: 640.0,
            canvas_height: 480.0,
            snap_enabled: true,
            default_clip_seconds: 5.0,
            default_duration: 60.0,
        }
    }
}

impl Preferences {
    /// Load preferences, falling back to defaults when the file does
    /// not exist yet
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }

    /// Save preferences as pretty RON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, text)?;
        tracing::debug!(path = %path.display(), "saved preferences");
        Ok(())
    }

    /// Apply a canvas preset
    pub fn set_canvas_preset(&mut self, preset: &CanvasPreset) {
        self.canvas_width = preset.width;
        self.canvas_height = preset.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("montage_prefs_missing.ron");
        std::fs::remove_file(&path).ok();
        let prefs = Preferences::load(&path).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = std::env::temp_dir().join("montage_prefs_test.ron");
        let mut prefs = Preferences::default();
        prefs.set_canvas_preset(&canvas_presets()[1]);
        prefs.snap_enabled = false;
        prefs.save(&path).unwrap();
        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
        assert_eq!(loaded.canvas_width, 1920.0);
        std::fs::remove_file(&path).ok();
    }
}

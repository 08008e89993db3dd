// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history over whole-scene snapshots.
//!
//! Each gesture or command records the scene before and after as a
//! compact binary snapshot. Undo restores the before-state, redo the
//! after-state; memory use is tracked and the stack depth is capped.

use montage_editor_scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Maximum undo history depth
const MAX_HISTORY: usize = 100;

/// History errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Nothing to undo
    #[error("Nothing to undo")]
    NothingToUndo,

    /// Nothing to redo
    #[error("Nothing to redo")]
    NothingToRedo,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Serialized scene state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Serialized scene bytes
    pub data: Vec<u8>,
    /// Size in bytes
    pub size: usize,
}

impl StateSnapshot {
    /// Snapshot a scene
    pub fn capture(scene: &Scene) -> Result<Self> {
        let data = bincode::serialize(scene)?;
        let size = data.len();
        Ok(Self { data, size })
    }

    /// Restore the snapshotted scene
    pub fn restore(&self) -> Result<Scene> {
        Ok(bincode::deserialize(&self.data)?)
    }
}

/// One undoable edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Human-readable description ("Move 2 items", "Split clip")
    pub description: String,
    /// Scene before the edit
    pub before: StateSnapshot,
    /// Scene after the edit
    pub after: StateSnapshot,
    /// Unix timestamp in seconds
    pub timestamp: u64,
}

impl HistoryEntry {
    fn new(description: String, before: StateSnapshot, after: StateSnapshot) -> Self {
        Self {
            description,
            before,
            after,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
        }
    }

    /// Memory held by this entry
    pub fn memory_size(&self) -> usize {
        self.before.size + self.after.size
    }
}

/// History statistics for the status bar
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Entries on the undo stack
    pub undo_count: usize,
    /// Entries on the redo stack
    pub redo_count: usize,
    /// Total snapshot bytes held
    pub memory_used: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_depth: usize,
    memory_used: usize,
}

impl History {
    /// Create a new history manager with the default depth cap
    pub fn new() -> Self {
        Self::with_max_depth(MAX_HISTORY)
    }

    /// Create with a custom maximum depth
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_depth,
            memory_used: 0,
        }
    }

    /// Record an edit. Clears the redo stack and evicts the oldest
    /// entries past the depth cap.
    pub fn record(&mut self, description: &str, before: &Scene, after: &Scene) -> Result<()> {
        let entry = HistoryEntry::new(
            description.to_string(),
            StateSnapshot::capture(before)?,
            StateSnapshot::capture(after)?,
        );
        self.redo_stack.clear();
        self.memory_used += entry.memory_size();
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_depth {
            if let Some(old) = self.undo_stack.pop_front() {
                self.memory_used = self.memory_used.saturating_sub(old.memory_size());
            }
        }
        tracing::debug!(description, depth = self.undo_stack.len(), "recorded edit");
        Ok(())
    }

    /// Undo the most recent edit, returning the restored scene
    pub fn undo(&mut self) -> Result<Scene> {
        let entry = self.undo_stack.pop_back().ok_or(HistoryError::NothingToUndo)?;
        let scene = entry.before.restore()?;
        self.redo_stack.push_back(entry);
        tracing::info!(remaining = self.undo_stack.len(), "undo");
        Ok(scene)
    }

    /// Redo the most recently undone edit, returning the restored scene
    pub fn redo(&mut self) -> Result<Scene> {
        let entry = self.redo_stack.pop_back().ok_or(HistoryError::NothingToRedo)?;
        let scene = entry.after.restore()?;
        self.undo_stack.push_back(entry);
        tracing::info!(remaining = self.redo_stack.len(), "redo");
        Ok(scene)
    }

    /// Whether undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the edit undo would revert
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|entry| entry.description.as_str())
    }

    /// Current statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_stack.len(),
            redo_count: self.redo_stack.len(),
            memory_used: self.memory_used,
            max_depth: self.max_depth,
        }
    }

    /// Drop all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.memory_used = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for scene mutations.

use crate::item::ItemId;
use thiserror::Error;

/// Errors reported by clip operations. Callers that want silent
/// degradation can discard these; the scene is left unchanged whenever
/// an error is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// Referenced item does not exist
    #[error("unknown item {0:?}")]
    UnknownItem(ItemId),

    /// Nothing is selected
    #[error("selection is empty")]
    EmptySelection,

    /// Grouping needs at least two items
    #[error("grouping requires at least two selected items")]
    GroupTooSmall,

    /// No selected time-bearing item spans the requested time
    #[error("no selected clip spans {0} seconds")]
    NothingToSplit(OrderedTime),

    /// Every selected item was locked (directly or via its track)
    #[error("selection is locked")]
    SelectionLocked,
}

/// Seconds wrapper so the error enum can stay `Eq`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderedTime(u64);

impl OrderedTime {
    /// Wrap a time in seconds
    pub fn new(seconds: f64) -> Self {
        Self(seconds.to_bits())
    }

    /// The wrapped time in seconds
    pub fn seconds(self) -> f64 {
        f64::from_bits(self.0)
    }
}

impl std::fmt::Display for OrderedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.seconds())
    }
}

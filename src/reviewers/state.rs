//! Persistence for round-robin positions in `reviewer-state.json`.
//!
//! The file is a flat JSON object mapping group name to the index of the
//! member picked last. Read-modify-write is not locked; two concurrent
//! invocations drawing from the same group can lose a step.

use crate::config::write_json_atomic;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Group name → last selected member index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationState {
    positions: BTreeMap<String, usize>,
}

impl RotationState {
    /// Empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Last index picked for a group
    pub fn last_index(&self, group: &str) -> Option<usize> {
        self.positions.get(group).copied()
    }

    /// Record the index picked for a group
    pub fn set_last_index(&mut self, group: &str, index: usize) {
        self.positions.insert(group.to_string(), index);
    }

    /// Number of groups with a recorded position
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no group has been drawn from yet
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Loads and saves [`RotationState`] at a fixed path
#[derive(Debug, Clone)]
pub struct RotationStore {
    path: PathBuf,
}

impl RotationStore {
    /// Store backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state; a missing file is an empty state
    pub fn load(&self) -> Result<RotationState> {
        if !self.path.exists() {
            return Ok(RotationState::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            Error::RotationState(format!("failed to read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::RotationState(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    /// Save state atomically
    pub fn save(&self, state: &RotationState) -> Result<()> {
        write_json_atomic(&self.path, state).map_err(|e| {
            Error::RotationState(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}

//! Installation state collaborator
//!
//! The on-disk installation store belongs to the outer application; this
//! core only ever reads the previously-applied state so the resolver can
//! attach cross-run change warnings. The trait keeps the store injectable
//! and lets tests substitute a fixed in-memory state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::errors::{ForgeError, ForgeResult};

/// Snapshot of what the last successful apply installed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppliedState {
    /// Current profile ids of the applied selection.
    pub selection: Vec<String>,
    /// Field values the artifacts were generated from.
    #[serde(default)]
    pub field_values: HashMap<String, serde_json::Value>,
}

/// Read access to the previously-applied installation state.
#[async_trait]
pub trait InstallationStateStore: Send + Sync {
    /// The last applied state, or `None` on a fresh host.
    async fn load(&self) -> ForgeResult<Option<AppliedState>>;
}

/// Reads the state file the outer application maintains.
pub struct JsonStateReader {
    path: PathBuf,
}

impl JsonStateReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InstallationStateStore for JsonStateReader {
    async fn load(&self) -> ForgeResult<Option<AppliedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| ForgeError::StateStoreError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            )))?;
        let state: AppliedState = serde_json::from_str(&content)
            .map_err(|e| ForgeError::StateStoreError(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            )))?;
        Ok(Some(state))
    }
}

/// Fixed state for tests and dry runs.
pub struct StaticStateStore {
    state: Option<AppliedState>,
}

impl StaticStateStore {
    pub fn new(state: Option<AppliedState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl InstallationStateStore for StaticStateStore {
    async fn load(&self) -> ForgeResult<Option<AppliedState>> {
        Ok(self.state.clone())
    }
}

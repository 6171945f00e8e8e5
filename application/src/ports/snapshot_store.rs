//! Snapshot store port
//!
//! Opaque persistence of full consultation snapshots. The engine does not
//! depend on the storage medium; the JSON-file implementation lives in the
//! infrastructure layer.

use consilium_domain::ConsultationSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by snapshot persistence
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Index entry for one stored session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub id: String,
    pub name: String,
    /// Human phase label, e.g. "In discussion"
    pub status: String,
    /// RFC 3339 timestamps
    pub created_at: String,
    pub updated_at: String,
}

/// Key-value persistence of consultation snapshots
pub trait SnapshotStore: Send + Sync {
    /// Create a new session, returning its id
    fn create(&self, name: &str) -> Result<SessionMeta, StoreError>;

    /// Persist a snapshot under an existing session id
    fn save(&self, id: &str, status: &str, snapshot: &ConsultationSnapshot)
    -> Result<(), StoreError>;

    fn load(&self, id: &str) -> Result<ConsultationSnapshot, StoreError>;

    /// All sessions, most recently created first
    fn list(&self) -> Result<Vec<SessionMeta>, StoreError>;

    fn rename(&self, id: &str, new_name: &str) -> Result<(), StoreError>;

    fn remove(&self, id: &str) -> Result<(), StoreError>;
}

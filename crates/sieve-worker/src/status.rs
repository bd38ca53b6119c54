//! In-memory upload status store.
//!
//! Entries live for the lifetime of the process. There is no expiry.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use sieve_core::UploadStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEntry {
    pub status: UploadStatus,
    pub updated_at: DateTime<Utc>,
}

impl StatusEntry {
    fn now(status: UploadStatus) -> Self {
        Self {
            status,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Upload {0} has no recorded status")]
    UnknownUpload(Uuid),

    #[error("Illegal status transition {from} -> {to}")]
    Illegal {
        from: UploadStatus,
        to: UploadStatus,
    },
}

/// Concurrent map from upload id to its latest status.
///
/// Cloning is cheap and every clone sees the same entries. Reads from request handlers
/// run concurrently with writes from the worker and always observe a whole entry.
#[derive(Clone, Default)]
pub struct StatusStore {
    entries: Arc<DashMap<Uuid, StatusEntry>>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly accepted upload.
    pub fn insert_pending(&self, id: Uuid) {
        self.entries
            .insert(id, StatusEntry::now(UploadStatus::Pending));
    }

    /// Unconditional upsert. Last writer wins.
    pub fn set(&self, id: Uuid, status: UploadStatus) {
        self.entries.insert(id, StatusEntry::now(status));
    }

    pub fn get(&self, id: &Uuid) -> Option<UploadStatus> {
        self.entries.get(id).map(|entry| entry.status)
    }

    pub fn entry(&self, id: &Uuid) -> Option<StatusEntry> {
        self.entries.get(id).map(|entry| *entry.value())
    }

    /// Move an upload one step forward in its lifecycle.
    ///
    /// The check and the write happen under the same shard lock, so a concurrent
    /// writer cannot slip in between. Returns the previous status.
    pub fn advance(&self, id: Uuid, next: UploadStatus) -> Result<UploadStatus, TransitionError> {
        let mut entry = self
            .entries
            .get_mut(&id)
            .ok_or(TransitionError::UnknownUpload(id))?;

        let current = entry.status;
        if !current.can_transition_to(next) {
            return Err(TransitionError::Illegal {
                from: current,
                to: next,
            });
        }

        *entry = StatusEntry::now(next);
        Ok(current)
    }

    /// Drop an entry, used to roll back an upload that never made it onto the queue.
    pub fn remove(&self, id: &Uuid) -> Option<StatusEntry> {
        self.entries.remove(id).map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

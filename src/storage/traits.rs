//! Abstract storage traits for wordoink.
//!
//! Backends store one [`StoredMeta`] per [`MessageKey`]. The in-memory
//! backend is the only one shipped; the trait is the seam for others.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::key::MessageKey;
use crate::meta::Meta;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record for the key.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),

    /// Serialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// A metadata record as held by a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMeta {
    /// Stable identity, assigned on first write.
    pub id: Uuid,
    /// Address of the record.
    pub key: MessageKey,
    /// Merged metadata.
    pub meta: Meta,
    /// First write.
    pub created_at: DateTime<Utc>,
    /// Last merge.
    pub modified_at: DateTime<Utc>,
}

impl StoredMeta {
    /// Creates a fresh record for `key`.
    #[must_use]
    pub fn new(key: MessageKey, meta: Meta) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            key,
            meta,
            created_at: now,
            modified_at: now,
        }
    }

    /// Merges `meta` into this record and bumps `modified_at`.
    pub fn merge(&mut self, meta: Meta) {
        self.meta.merge_values(meta);
        let now = Utc::now();
        if now > self.modified_at {
            self.modified_at = now;
        }
    }
}

/// Storage trait for metadata records.
///
/// # Safety Considerations
/// - All mutations should be atomic where possible
/// - Implementations should handle concurrent access safely
pub trait MetaStore: Send + Sync {
    /// Get the record for a key.
    fn get(&self, key: &MessageKey) -> Result<Option<StoredMeta>, StorageError>;

    /// Upsert: merge into an existing record, or create one.
    ///
    /// Returns the record as stored.
    fn put(&self, key: &MessageKey, meta: Meta) -> Result<StoredMeta, StorageError>;

    /// Delete the record for a key. Returns error if not found.
    fn delete(&self, key: &MessageKey) -> Result<(), StorageError>;

    /// All keys stored under one resource and context, sorted by user key.
    fn keys_in_context(
        &self,
        resource_name: &str,
        user_context: &str,
    ) -> Result<Vec<MessageKey>, StorageError>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, StorageError>;

    /// Remove every record.
    fn clear(&self) -> Result<(), StorageError>;
}

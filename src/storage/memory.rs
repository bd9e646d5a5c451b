//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`MetaStore`]. It is intended for embedded usage, tests, and as a
//! reference implementation.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::key::MessageKey;
use crate::meta::Meta;
use crate::storage::traits::{MetaStore, StorageError, StoredMeta};

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// Thread-safe in-memory metadata store.
#[derive(Debug, Default)]
pub struct InMemoryMetaStore {
    records: RwLock<HashMap<MessageKey, StoredMeta>>,
}

impl InMemoryMetaStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetaStore for InMemoryMetaStore {
    fn get(&self, key: &MessageKey) -> Result<Option<StoredMeta>, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("meta.get"))?;
        Ok(records.get(key).cloned())
    }

    fn put(&self, key: &MessageKey, meta: Meta) -> Result<StoredMeta, StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("meta.put"))?;
        let stored = match records.entry(key.clone()) {
            Entry::Occupied(mut existing) => {
                existing.get_mut().merge(meta);
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(StoredMeta::new(key.clone(), meta)).clone(),
        };
        log::trace!("stored {key}: count={}", stored.meta.count());
        Ok(stored)
    }

    fn delete(&self, key: &MessageKey) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("meta.delete"))?;
        records
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    fn keys_in_context(
        &self,
        resource_name: &str,
        user_context: &str,
    ) -> Result<Vec<MessageKey>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| lock_err("meta.keys_in_context"))?;
        let mut keys: Vec<MessageKey> = records
            .keys()
            .filter(|k| k.resource_name() == resource_name && k.user_context() == user_context)
            .cloned()
            .collect();
        keys.sort_by(|a, b| a.user_key().cmp(b.user_key()));
        Ok(keys)
    }

    fn len(&self) -> Result<usize, StorageError> {
        let records = self.records.read().map_err(|_| lock_err("meta.len"))?;
        Ok(records.len())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut records = self.records.write().map_err(|_| lock_err("meta.clear"))?;
        records.clear();
        Ok(())
    }
}

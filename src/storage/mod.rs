//! Storage for metadata records.
//!
//! [`MetaStore`] is the abstract interface; [`InMemoryMetaStore`] is the
//! bundled backend.

mod memory;
mod traits;

pub use memory::InMemoryMetaStore;
pub use traits::{MetaStore, StorageError, StoredMeta};

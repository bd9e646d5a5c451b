//! # wordoink - prefix stemming with occurrence counts
//!
//! wordoink decomposes short words into prefix stems and keeps an
//! occurrence count per word and per stem.
//!
//! ## Core Concepts
//!
//! - **Stem behavior**: turns a word into its proper non-empty prefixes and
//!   counts one occurrence on the word's metadata
//! - **Persist callback**: returned with the stems; counts one occurrence on
//!   each stem's own metadata when the consumer runs it
//! - **Message key**: `//resource-name/user-context/user-key` address of a record
//! - **Processor**: FIFO job queue that runs word, stem and delete jobs over a store
//! - **Job**: tracked submission, `Created -> Queued -> Processing -> Complete | Error`
//!
//! ## Usage
//!
//! ```rust
//! use wordoink::{stem_word, Meta, StemOutcome};
//!
//! let mut meta = Meta::new();
//! match stem_word(Some("testing"), &mut meta) {
//!     StemOutcome::Stems(set) => {
//!         assert_eq!(set.len(), 6);
//!         let mut stem_meta = Meta::new();
//!         assert!(set.records[0].persist.call("t", &mut stem_meta));
//!         assert_eq!(stem_meta.count(), 1);
//!     }
//!     StemOutcome::Rejected(reason) => panic!("unexpected rejection: {reason}"),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod job;
pub mod key;
pub mod meta;
pub mod processor;
pub mod stem;
pub mod storage;

// Re-export primary types at crate root for convenience
pub use config::StemConfig;
pub use error::{ExecutionError, ValidationError, WordoinkError, WordoinkResult};
pub use job::{BehaviorKind, Job, JobId, JobState};
pub use key::MessageKey;
pub use meta::Meta;
pub use processor::{Behavior, ProcessingResult, StemProcessor};
pub use stem::{stem_word, PersistFn, RejectReason, StemBehavior, StemOutcome, StemRecord, StemSet};
pub use storage::{InMemoryMetaStore, MetaStore, StorageError, StoredMeta};

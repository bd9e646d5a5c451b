//! Stem generation.
//!
//! [`StemBehavior::apply`] takes a word and its metadata record, bumps the
//! record's counter, and decomposes the word into every proper non-empty
//! prefix. Each prefix comes back as a [`StemRecord`] carrying the persist
//! callback the consumer runs later against the stem's own record.
//!
//! ```
//! use wordoink::{stem_word, Meta, StemOutcome};
//!
//! let mut meta = Meta::new();
//! let StemOutcome::Stems(set) = stem_word(Some("cat"), &mut meta) else {
//!     panic!("cat is a valid word");
//! };
//! let keys: Vec<&str> = set.records.iter().map(|r| r.key.as_str()).collect();
//! assert_eq!(keys, ["c", "ca"]);
//! assert_eq!(meta.count(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::meta::Meta;

/// Longest word accepted by the default behavior, in characters.
pub const DEFAULT_MAX_WORD_LEN: usize = 7;

/// Callback that records an occurrence against a metadata record.
///
/// Returns true when the record should be persisted.
#[derive(Clone)]
pub struct PersistFn(Arc<dyn Fn(&str, &mut Meta) -> bool + Send + Sync>);

impl PersistFn {
    /// Wraps a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str, &mut Meta) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// The callback installed by the stem behavior: increments `count`.
    #[must_use]
    pub fn count_occurrence() -> Self {
        Self::new(|_word, meta| {
            meta.increment_count();
            true
        })
    }

    /// Runs the callback; true means persist `meta`.
    pub fn call(&self, word: &str, meta: &mut Meta) -> bool {
        (self.0)(word, meta)
    }

    /// Returns true if both handles point at the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for PersistFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistFn").finish_non_exhaustive()
    }
}

/// One stem produced from a word.
#[derive(Debug, Clone)]
pub struct StemRecord {
    /// The prefix itself.
    pub key: String,
    /// Callback to run against the prefix's record.
    pub persist: PersistFn,
}

/// Successful decomposition of a word.
#[derive(Debug, Clone)]
pub struct StemSet {
    /// Callback the consumer runs against each stem's record.
    pub persist: PersistFn,
    /// Prefixes of increasing length, shortest first.
    pub records: Vec<StemRecord>,
}

impl StemSet {
    /// Prefixes in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.key.as_str())
    }

    /// Number of stems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True for one-character words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Why a word was not decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No word, or an empty one.
    Missing,
    /// Longer than the configured limit.
    TooLong {
        /// Length of the word in characters.
        len: usize,
        /// Configured limit.
        max: usize,
    },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "word is missing"),
            Self::TooLong { len, max } => {
                write!(f, "word has {len} characters, limit is {max}")
            }
        }
    }
}

/// Result of applying the stem behavior.
#[derive(Debug, Clone)]
pub enum StemOutcome {
    /// Word refused; metadata untouched.
    Rejected(RejectReason),
    /// Word counted and decomposed.
    Stems(StemSet),
}

impl StemOutcome {
    /// True for [`StemOutcome::Rejected`].
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Borrowed stems, if any.
    #[must_use]
    pub fn stems(&self) -> Option<&StemSet> {
        match self {
            Self::Stems(set) => Some(set),
            Self::Rejected(_) => None,
        }
    }

    /// Owned stems, if any.
    #[must_use]
    pub fn into_stems(self) -> Option<StemSet> {
        match self {
            Self::Stems(set) => Some(set),
            Self::Rejected(_) => None,
        }
    }
}

/// Prefix decomposition with a word-length limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StemBehavior {
    max_word_len: usize,
}

impl Default for StemBehavior {
    fn default() -> Self {
        Self {
            max_word_len: DEFAULT_MAX_WORD_LEN,
        }
    }
}

impl StemBehavior {
    /// Behavior accepting words up to `max_word_len` characters.
    #[must_use]
    pub const fn new(max_word_len: usize) -> Self {
        Self { max_word_len }
    }

    /// Configured limit.
    #[must_use]
    pub const fn max_word_len(&self) -> usize {
        self.max_word_len
    }

    /// Decomposes `word` into stems and counts one occurrence on `meta`.
    ///
    /// Rejected words leave `meta` untouched.
    pub fn apply(&self, word: Option<&str>, meta: &mut Meta) -> StemOutcome {
        let word = match word {
            Some(w) if !w.is_empty() => w,
            _ => return StemOutcome::Rejected(RejectReason::Missing),
        };
        let len = word.chars().count();
        if len > self.max_word_len {
            return StemOutcome::Rejected(RejectReason::TooLong {
                len,
                max: self.max_word_len,
            });
        }

        let persist = PersistFn::count_occurrence();
        meta.increment_count();

        // Byte offsets of every char boundary except 0 and the end.
        let records = word
            .char_indices()
            .skip(1)
            .map(|(end, _)| StemRecord {
                key: word[..end].to_string(),
                persist: persist.clone(),
            })
            .collect();

        StemOutcome::Stems(StemSet { persist, records })
    }
}

/// Applies the default behavior (words up to 7 characters).
pub fn stem_word(word: Option<&str>, meta: &mut Meta) -> StemOutcome {
    StemBehavior::default().apply(word, meta)
}

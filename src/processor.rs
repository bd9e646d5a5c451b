//! Job processing for words and stems.
//!
//! A word message runs the stem behavior against its stored metadata. Every
//! stem it produces becomes a follow-up job at a sibling key, which runs the
//! returned persist callback against that stem's own stored metadata. A
//! summary of the most recent word is kept at the `latest` sibling key.
//!
//! Each submission is tracked as a [`Job`] and can be looked up by the
//! [`JobId`] returned from `submit`.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use wordoink::{InMemoryMetaStore, JobState, MessageKey, StemConfig, StemProcessor};
//!
//! let store = Arc::new(InMemoryMetaStore::new());
//! let mut processor = StemProcessor::new(store, StemConfig::default()).unwrap();
//!
//! let job = processor
//!     .submit_word(MessageKey::parse("//s3/wordoink/cat").unwrap())
//!     .unwrap();
//! processor.run_until_idle().unwrap();
//!
//! assert_eq!(processor.query_job(job).unwrap().state, JobState::Complete);
//! let count = processor
//!     .query_meta(&MessageKey::parse("//s3/wordoink/ca").unwrap(), "count")
//!     .unwrap();
//! assert_eq!(count, Some(serde_json::json!(1)));
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde_json::{json, Value as JsonValue};

use crate::config::StemConfig;
use crate::error::{ExecutionError, WordoinkResult};
use crate::job::{BehaviorKind, Job, JobId};
use crate::key::MessageKey;
use crate::meta::Meta;
use crate::stem::{PersistFn, StemBehavior, StemOutcome};
use crate::storage::{MetaStore, StorageError};

/// Field of the summary record holding `{word, count}`.
pub const SUMMARY_FIELD: &str = "summary";

/// What a job does with its message.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Decompose the message's user key into stems.
    Stem(StemBehavior),
    /// Record an occurrence on a stem produced earlier.
    Persist(PersistFn),
    /// Remove the message's stored record.
    Delete,
}

impl Behavior {
    /// Kind label recorded on the job.
    #[must_use]
    pub const fn kind(&self) -> BehaviorKind {
        match self {
            Self::Stem(_) => BehaviorKind::Stem,
            Self::Persist(_) => BehaviorKind::Persist,
            Self::Delete => BehaviorKind::Delete,
        }
    }
}

/// Outcome of one processed job.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Job that was run.
    pub job_id: JobId,
    /// Key of the processed message.
    pub key: MessageKey,
    /// Metadata as stored after processing, if anything was stored.
    pub meta: Option<Meta>,
    /// Keys written or enqueued as a consequence of this job.
    pub messages: Vec<MessageKey>,
    /// False when the behavior declined and nothing was propagated.
    pub continue_processing: bool,
    /// Why the job halted, when it did.
    pub status: Option<String>,
}

impl ProcessingResult {
    fn done(job_id: JobId, key: MessageKey, meta: Option<Meta>, messages: Vec<MessageKey>) -> Self {
        Self {
            job_id,
            key,
            meta,
            messages,
            continue_processing: true,
            status: None,
        }
    }

    fn halted(job_id: JobId, key: MessageKey, status: impl Into<String>) -> Self {
        Self {
            job_id,
            key,
            meta: None,
            messages: Vec::new(),
            continue_processing: false,
            status: Some(status.into()),
        }
    }
}

/// FIFO processor over a [`MetaStore`].
pub struct StemProcessor {
    store: Arc<dyn MetaStore>,
    config: StemConfig,
    behavior: StemBehavior,
    queue: VecDeque<(JobId, Behavior)>,
    jobs: HashMap<JobId, Job>,
}

impl StemProcessor {
    /// Creates a processor after validating `config`.
    ///
    /// # Errors
    /// Returns a validation error for an invalid configuration.
    pub fn new(store: Arc<dyn MetaStore>, config: StemConfig) -> WordoinkResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            store,
            behavior: StemBehavior::new(config.max_word_len),
            config,
            queue: VecDeque::new(),
            jobs: HashMap::new(),
        })
    }

    /// Validated configuration in use.
    pub fn config(&self) -> &StemConfig {
        &self.config
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<dyn MetaStore> {
        &self.store
    }

    /// Number of jobs waiting.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Enqueues a job and returns its id.
    ///
    /// # Errors
    /// Returns an execution error if the new job cannot be queued.
    pub fn submit(&mut self, key: MessageKey, behavior: Behavior) -> WordoinkResult<JobId> {
        let mut job = Job::new(key, behavior.kind());
        job.queue()?;
        let id = job.id;
        log::debug!("queued job {id} for {}", job.key);
        self.jobs.insert(id, job);
        self.queue.push_back((id, behavior));
        Ok(id)
    }

    /// Enqueues a word job using the configured stem behavior.
    ///
    /// # Errors
    /// As [`StemProcessor::submit`].
    pub fn submit_word(&mut self, key: MessageKey) -> WordoinkResult<JobId> {
        self.submit(key, Behavior::Stem(self.behavior))
    }

    /// Enqueues removal of the record at `key`.
    ///
    /// # Errors
    /// As [`StemProcessor::submit`].
    pub fn submit_delete(&mut self, key: MessageKey) -> WordoinkResult<JobId> {
        self.submit(key, Behavior::Delete)
    }

    /// Snapshot of a job's current state.
    ///
    /// # Errors
    /// Returns [`ExecutionError::JobNotFound`] for an unknown id.
    pub fn query_job(&self, id: JobId) -> WordoinkResult<Job> {
        self.jobs
            .get(&id)
            .cloned()
            .ok_or_else(|| ExecutionError::JobNotFound { id }.into())
    }

    /// Forgets finished jobs. Returns how many were dropped.
    pub fn prune_finished(&mut self) -> usize {
        let before = self.jobs.len();
        self.jobs.retain(|_, job| !job.state.is_terminal());
        before - self.jobs.len()
    }

    /// Pops and runs one job. Returns `None` when the queue is empty.
    ///
    /// A failing job is moved to `Error` with the failure as its status.
    ///
    /// # Errors
    /// Returns storage errors, or a validation error if a stem key cannot be
    /// formed.
    pub fn process_next(&mut self) -> WordoinkResult<Option<ProcessingResult>> {
        let Some((id, behavior)) = self.queue.pop_front() else {
            return Ok(None);
        };
        let key = {
            let job = self.job_mut(id)?;
            job.start()?;
            job.key.clone()
        };

        let outcome = match behavior {
            Behavior::Stem(stem) => self.process_word(id, key, stem),
            Behavior::Persist(persist) => self.process_stem(id, key, &persist),
            Behavior::Delete => self.process_delete(id, key),
        };

        let job = self.job_mut(id)?;
        match outcome {
            Ok(result) => {
                job.status.clone_from(&result.status);
                job.complete()?;
                Ok(Some(result))
            }
            Err(err) => {
                log::warn!("job {id} failed: {err}");
                job.fail(err.to_string())?;
                Err(err)
            }
        }
    }

    /// Runs jobs until the queue is empty. Returns the number processed.
    ///
    /// # Errors
    /// Stops at the first failing job and returns its error; later jobs stay
    /// queued.
    pub fn run_until_idle(&mut self) -> WordoinkResult<usize> {
        let mut processed = 0;
        while self.process_next()?.is_some() {
            processed += 1;
        }
        log::info!("processed {processed} jobs");
        Ok(processed)
    }

    /// Reads one top-level field from the stored record for `key`.
    ///
    /// # Errors
    /// Returns storage errors.
    pub fn query_meta(&self, key: &MessageKey, field: &str) -> WordoinkResult<Option<JsonValue>> {
        Ok(self
            .store
            .get(key)?
            .and_then(|stored| stored.meta.get(field)))
    }

    fn job_mut(&mut self, id: JobId) -> WordoinkResult<&mut Job> {
        self.jobs
            .get_mut(&id)
            .ok_or_else(|| ExecutionError::JobNotFound { id }.into())
    }

    fn load_meta(&self, key: &MessageKey) -> WordoinkResult<Meta> {
        Ok(self
            .store
            .get(key)?
            .map(|stored| stored.meta)
            .unwrap_or_default())
    }

    fn process_word(
        &mut self,
        id: JobId,
        key: MessageKey,
        behavior: StemBehavior,
    ) -> WordoinkResult<ProcessingResult> {
        let mut meta = self.load_meta(&key)?;
        let word = key.user_key().to_string();

        let set = match behavior.apply(Some(&word), &mut meta) {
            StemOutcome::Rejected(reason) => {
                log::debug!("skipping {key}: {reason}");
                return Ok(ProcessingResult::halted(id, key, reason.to_string()));
            }
            StemOutcome::Stems(set) => set,
        };

        let count = meta.count();
        let stored = self.store.put(&key, meta)?;
        let stem_count = set.len();
        let mut messages = Vec::with_capacity(stem_count + 1);

        for record in set.records {
            let stem_key = key.sibling(&record.key)?;
            messages.push(stem_key.clone());
            self.submit(stem_key, Behavior::Persist(record.persist))?;
        }

        if let Some(latest) = self.config.latest_key.as_deref() {
            let latest_key = key.sibling(latest)?;
            let mut summary = Meta::new();
            summary.insert(SUMMARY_FIELD, json!({ "word": word, "count": count }));
            self.store.put(&latest_key, summary)?;
            messages.push(latest_key);
        }

        log::debug!("stemmed {key} into {stem_count} stems (count={count})");
        Ok(ProcessingResult::done(id, key, Some(stored.meta), messages))
    }

    fn process_stem(
        &self,
        id: JobId,
        key: MessageKey,
        persist: &PersistFn,
    ) -> WordoinkResult<ProcessingResult> {
        let mut meta = self.load_meta(&key)?;
        if !persist.call(key.user_key(), &mut meta) {
            log::trace!("persist declined for {key}");
            return Ok(ProcessingResult::halted(id, key, "persist declined"));
        }
        let stored = self.store.put(&key, meta)?;
        Ok(ProcessingResult::done(id, key, Some(stored.meta), Vec::new()))
    }

    fn process_delete(&self, id: JobId, key: MessageKey) -> WordoinkResult<ProcessingResult> {
        match self.store.delete(&key) {
            Ok(()) => {
                log::debug!("deleted {key}");
                Ok(ProcessingResult::done(id, key, None, Vec::new()))
            }
            Err(StorageError::NotFound(_)) => {
                Ok(ProcessingResult::halted(id, key, "no record to delete"))
            }
            Err(err) => Err(err.into()),
        }
    }
}

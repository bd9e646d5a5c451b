use std::sync::Arc;

use serde_json::json;

use wordoink::{
    Behavior, BehaviorKind, InMemoryMetaStore, JobState, MessageKey, Meta, MetaStore, PersistFn,
    StemConfig, StemProcessor,
};

fn key(raw: &str) -> MessageKey {
    MessageKey::parse(raw).unwrap()
}

fn processor_with_store() -> (StemProcessor, Arc<InMemoryMetaStore>) {
    let store = Arc::new(InMemoryMetaStore::new());
    let processor = StemProcessor::new(store.clone(), StemConfig::default()).unwrap();
    (processor, store)
}

#[test]
fn word_and_stems_are_counted() {
    let (mut processor, store) = processor_with_store();
    processor.submit_word(key("//s3/wordoink/testing")).unwrap();

    // One word job plus six stem jobs.
    assert_eq!(processor.run_until_idle().unwrap(), 7);

    let word = store.get(&key("//s3/wordoink/testing")).unwrap().unwrap();
    assert_eq!(word.meta.count(), 1);
    for stem in ["t", "te", "tes", "test", "testi", "testin"] {
        let stored = store.get(&key(&format!("//s3/wordoink/{stem}"))).unwrap();
        assert_eq!(stored.map(|s| s.meta.count()), Some(1), "stem {stem}");
    }
}

#[test]
fn latest_summary_tracks_most_recent_word() {
    let (mut processor, _store) = processor_with_store();
    processor.submit_word(key("//s3/wordoink/testing")).unwrap();
    processor.run_until_idle().unwrap();

    let summary = processor
        .query_meta(&key("//s3/wordoink/latest"), "summary")
        .unwrap();
    assert_eq!(summary, Some(json!({"word": "testing", "count": 1})));

    processor.submit_word(key("//s3/wordoink/testing")).unwrap();
    processor.submit_word(key("//s3/wordoink/cat")).unwrap();
    processor.run_until_idle().unwrap();

    let summary = processor
        .query_meta(&key("//s3/wordoink/latest"), "summary")
        .unwrap();
    assert_eq!(summary, Some(json!({"word": "cat", "count": 1})));
}

#[test]
fn shared_stems_accumulate_across_words() {
    let (mut processor, _store) = processor_with_store();
    for word in ["cat", "car", "cart"] {
        processor.submit_word(key(&format!("//s3/wordoink/{word}"))).unwrap();
    }
    processor.run_until_idle().unwrap();

    let count = |user_key: &str| {
        processor
            .query_meta(&key(&format!("//s3/wordoink/{user_key}")), "count")
            .unwrap()
    };
    assert_eq!(count("c"), Some(json!(3)));
    assert_eq!(count("ca"), Some(json!(3)));
    // "car" is a word once and a stem of "cart" once.
    assert_eq!(count("car"), Some(json!(2)));
    assert_eq!(count("cart"), Some(json!(1)));
}

#[test]
fn rejected_word_leaves_store_empty() {
    let (mut processor, store) = processor_with_store();
    processor.submit_word(key("//s3/wordoink/overlong")).unwrap();

    assert_eq!(processor.run_until_idle().unwrap(), 1);
    assert_eq!(store.len().unwrap(), 0);
}

#[test]
fn existing_fields_survive_processing() {
    let (mut processor, store) = processor_with_store();
    let word_key = key("//s3/wordoink/cat");
    let mut seeded = Meta::with_count(4);
    seeded.insert("tag", json!("animal"));
    let before = store.put(&word_key, seeded).unwrap();

    processor.submit_word(word_key.clone()).unwrap();
    processor.run_until_idle().unwrap();

    let after = store.get(&word_key).unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.meta.count(), 5);
    assert_eq!(after.meta.get("tag"), Some(json!("animal")));
}

#[test]
fn contexts_are_isolated() {
    let (mut processor, store) = processor_with_store();
    processor.submit_word(key("//s3/en/cat")).unwrap();
    processor.submit_word(key("//s3/fr/chat")).unwrap();
    processor.run_until_idle().unwrap();

    let en: Vec<String> = store
        .keys_in_context("s3", "en")
        .unwrap()
        .iter()
        .map(|k| k.user_key().to_string())
        .collect();
    assert_eq!(en, ["c", "ca", "cat", "latest"]);
    assert_eq!(store.keys_in_context("s3", "fr").unwrap().len(), 5);
}

#[test]
fn custom_persist_behavior_runs_against_stored_meta() {
    let (mut processor, store) = processor_with_store();
    let stem_key = key("//s3/wordoink/ca");
    store.put(&stem_key, Meta::with_count(10)).unwrap();

    let persist = PersistFn::new(|word, meta| {
        meta.insert("last_seen", word);
        meta.increment_count();
        true
    });
    processor.submit(stem_key.clone(), Behavior::Persist(persist)).unwrap();
    processor.run_until_idle().unwrap();

    let stored = store.get(&stem_key).unwrap().unwrap();
    assert_eq!(stored.meta.count(), 11);
    assert_eq!(stored.meta.get("last_seen"), Some(json!("ca")));
}

#[test]
fn configured_limit_and_latest_key() {
    let store = Arc::new(InMemoryMetaStore::new());
    let config =
        StemConfig::from_json_str(r#"{"max_word_len": 3, "latest_key": "recent"}"#).unwrap();
    let mut processor = StemProcessor::new(store.clone(), config).unwrap();

    processor.submit_word(key("//s3/wordoink/cats")).unwrap();
    processor.submit_word(key("//s3/wordoink/cat")).unwrap();
    processor.run_until_idle().unwrap();

    assert!(store.get(&key("//s3/wordoink/cats")).unwrap().is_none());
    assert_eq!(
        processor
            .query_meta(&key("//s3/wordoink/recent"), "summary")
            .unwrap(),
        Some(json!({"word": "cat", "count": 1}))
    );
}

#[test]
fn submitted_jobs_can_be_queried_through_their_lifecycle() {
    let (mut processor, _store) = processor_with_store();
    let word_job = processor.submit_word(key("//s3/wordoink/cat")).unwrap();
    let rejected_job = processor.submit_word(key("//s3/wordoink/overlong")).unwrap();

    let queued = processor.query_job(word_job).unwrap();
    assert_eq!(queued.state, JobState::Queued);
    assert_eq!(queued.tries, 0);
    assert_eq!(queued.key, key("//s3/wordoink/cat"));

    processor.run_until_idle().unwrap();

    let done = processor.query_job(word_job).unwrap();
    assert_eq!(done.state, JobState::Complete);
    assert_eq!(done.tries, 1);
    assert!(done.status.is_none());

    let rejected = processor.query_job(rejected_job).unwrap();
    assert_eq!(rejected.state, JobState::Complete);
    assert_eq!(
        rejected.status.as_deref(),
        Some("word has 8 characters, limit is 7")
    );
}

#[test]
fn delete_job_removes_stored_record() {
    let (mut processor, store) = processor_with_store();
    processor.submit_word(key("//s3/wordoink/cat")).unwrap();
    processor.run_until_idle().unwrap();
    assert!(store.get(&key("//s3/wordoink/ca")).unwrap().is_some());

    let job = processor.submit_delete(key("//s3/wordoink/ca")).unwrap();
    let result = processor.process_next().unwrap().unwrap();
    assert!(result.continue_processing);
    assert!(result.meta.is_none());

    assert!(store.get(&key("//s3/wordoink/ca")).unwrap().is_none());
    assert!(store.get(&key("//s3/wordoink/cat")).unwrap().is_some());
    let job = processor.query_job(job).unwrap();
    assert_eq!(job.kind, BehaviorKind::Delete);
    assert_eq!(job.state, JobState::Complete);

    // A second delete finds nothing and halts.
    processor
        .submit(key("//s3/wordoink/ca"), Behavior::Delete)
        .unwrap();
    let result = processor.process_next().unwrap().unwrap();
    assert!(!result.continue_processing);
    assert_eq!(result.status.as_deref(), Some("no record to delete"));
}

//! Integration tests for the storage layer
//!
//! These tests verify schema initialization, seeding, attempt persistence
//! and progress queries across multiple operations.

use dictation::error::Error;
use dictation::storage::{RECENT_ATTEMPTS_LIMIT, Storage};
use dictation::types::NewAttempt;
use std::sync::Arc;
use std::thread;

fn attempt(level_id: i64, accuracy: u32) -> NewAttempt {
    NewAttempt {
        level_id,
        accuracy,
        ok: accuracy / 10,
        wrong: 1,
        missing: 0,
        extra: 0,
    }
}

// ============ Schema Initialization Tests ============

#[test]
fn test_fresh_database_initialization() {
    let storage = Storage::in_memory().expect("Failed to create in-memory storage");

    assert_eq!(storage.get_attempt_count().unwrap(), 0);
    assert_eq!(storage.get_levels().unwrap().len(), 3);
}

#[test]
fn test_database_seeds_default_levels() {
    let storage = Storage::in_memory().unwrap();

    let texts: Vec<String> = storage
        .get_levels()
        .unwrap()
        .into_iter()
        .map(|l| l.text)
        .collect();

    assert_eq!(
        texts,
        vec![
            "The quick brown fox jumps over the lazy dog.",
            "I enjoy learning English through daily dictation practice.",
            "Consistency beats intensity when building long-term skills.",
        ]
    );
}

#[test]
fn test_reopen_does_not_reseed() {
    let path = std::env::temp_dir().join(format!(
        "dictation_storage_reopen_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let storage = Storage::open(&path).unwrap();
        storage
            .add_level("Level 4", "One more sentence.", None, Some(85))
            .unwrap();
        storage.save_attempt(&attempt(1, 70)).unwrap();
    }

    let storage = Storage::open(&path).unwrap();
    assert_eq!(storage.get_levels().unwrap().len(), 4);
    assert_eq!(storage.get_attempt_count().unwrap(), 1);

    drop(storage);
    let _ = std::fs::remove_file(&path);
}

// ============ Attempt Tests ============

#[test]
fn test_save_and_retrieve_attempt() {
    let storage = Storage::in_memory().unwrap();

    let saved = NewAttempt {
        level_id: 2,
        accuracy: 88,
        ok: 7,
        wrong: 1,
        missing: 0,
        extra: 2,
    };
    let id = storage.save_attempt(&saved).unwrap();

    let recent = storage.get_recent_attempts(2, 10).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, id);
    assert_eq!(recent[0].level_id, 2);
    assert_eq!(recent[0].accuracy, 88);
    assert_eq!(
        (recent[0].ok, recent[0].wrong, recent[0].missing, recent[0].extra),
        (7, 1, 0, 2)
    );
}

#[test]
fn test_attempt_ordering_and_limit() {
    let storage = Storage::in_memory().unwrap();

    for accuracy in 0..30 {
        storage.save_attempt(&attempt(1, accuracy)).unwrap();
    }

    let recent = storage.get_recent_attempts(1, RECENT_ATTEMPTS_LIMIT).unwrap();
    assert_eq!(recent.len(), 20);
    // newest first
    assert_eq!(recent[0].accuracy, 29);
    assert_eq!(recent[19].accuracy, 10);
}

#[test]
fn test_attempts_are_per_level() {
    let storage = Storage::in_memory().unwrap();

    storage.save_attempt(&attempt(1, 50)).unwrap();
    storage.save_attempt(&attempt(2, 60)).unwrap();

    assert_eq!(storage.get_recent_attempts(1, 10).unwrap().len(), 1);
    assert_eq!(storage.get_recent_attempts(3, 10).unwrap().len(), 0);
}

#[test]
fn test_invalid_attempt_rejected() {
    let storage = Storage::in_memory().unwrap();

    let result = storage.save_attempt(&attempt(1, 150));
    assert!(matches!(result, Err(Error::InvalidAttempt(_))));
    assert_eq!(storage.get_attempt_count().unwrap(), 0);
}

// ============ Progress Tests ============

#[test]
fn test_best_accuracy_and_passed_flag() {
    let storage = Storage::in_memory().unwrap();

    assert_eq!(storage.best_accuracy(1).unwrap(), None);

    storage.save_attempt(&attempt(1, 60)).unwrap();
    storage.save_attempt(&attempt(1, 89)).unwrap();
    assert_eq!(storage.best_accuracy(1).unwrap(), Some(89));
    assert!(!storage.has_passed(1).unwrap());

    storage.save_attempt(&attempt(1, 90)).unwrap();
    storage.save_attempt(&attempt(1, 40)).unwrap();
    assert_eq!(storage.best_accuracy(1).unwrap(), Some(90));
    assert!(storage.has_passed(1).unwrap());
}

#[test]
fn test_level_progress_uses_level_pass_score() {
    let storage = Storage::in_memory().unwrap();
    let easy = storage
        .add_level("Easy", "Hi there.", None, Some(50))
        .unwrap();

    storage.save_attempt(&attempt(1, 80)).unwrap();
    storage.save_attempt(&attempt(easy, 50)).unwrap();

    let progress = storage.get_level_progress().unwrap();
    assert_eq!(progress.len(), 4);
    assert_eq!(progress[0].best_accuracy, Some(80));
    assert!(!progress[0].passed);
    assert_eq!(progress[3].level.id, easy);
    assert!(progress[3].passed);
    assert_eq!(progress[1].best_accuracy, None);
}

#[test]
fn test_reset_clears_progress() {
    let storage = Storage::in_memory().unwrap();

    storage.save_attempt(&attempt(1, 100)).unwrap();
    storage.save_attempt(&attempt(2, 100)).unwrap();
    assert_eq!(storage.reset_attempts().unwrap(), 2);

    let progress = storage.get_level_progress().unwrap();
    assert!(progress.iter().all(|p| !p.passed && p.best_accuracy.is_none()));
    // levels survive a reset
    assert_eq!(progress.len(), 3);
}

// ============ Concurrency Tests ============

#[test]
fn test_concurrent_attempt_writes() {
    let storage = Arc::new(Storage::in_memory().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || {
                for i in 0..10 {
                    storage.save_attempt(&attempt(1, t * 10 + i)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(storage.get_attempt_count().unwrap(), 40);
    assert_eq!(storage.best_accuracy(1).unwrap(), Some(39));
}

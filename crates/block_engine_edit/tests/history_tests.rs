//! Tests for the snapshot history (commit, undo/redo, debounce, persistence)

use std::time::{Duration, Instant};

use block_engine_edit::{HistoryConfig, HistoryManager, PersistedHistory};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_commit_initial_state_is_noop(initial in any::<i64>()) {
        let mut history = HistoryManager::new(initial);
        prop_assert!(!history.commit(initial));
        prop_assert_eq!(history.len(), 1);
    }

    #[test]
    fn prop_undo_then_redo_restores_state(values in proptest::collection::vec(any::<i64>(), 1..30), k in 0usize..30) {
        let mut history = HistoryManager::new(i64::MIN);
        let mut n = 0;
        for value in values {
            if history.commit(value) {
                n += 1;
            }
        }
        let k = k.min(n);
        let before = *history.current();

        for _ in 0..k {
            prop_assert!(history.undo());
        }
        for _ in 0..k {
            prop_assert!(history.redo());
        }
        prop_assert_eq!(*history.current(), before);
        prop_assert!(!history.can_redo());
    }

    #[test]
    fn prop_commit_after_undo_clears_redo(count in 2usize..20, undos in 1usize..20) {
        let mut history = HistoryManager::new(0usize);
        for i in 1..=count {
            history.commit(i);
        }
        for _ in 0..undos.min(count) {
            history.undo();
        }
        prop_assert!(history.can_redo());
        history.commit(usize::MAX);
        prop_assert!(!history.can_redo());
        prop_assert_eq!(*history.current(), usize::MAX);
    }

    #[test]
    fn prop_save_restore_round_trip(values in proptest::collection::vec(0u8..8, 0..20), undos in 0usize..5) {
        let mut history = HistoryManager::new(255u8);
        for value in values {
            history.commit(value);
        }
        for _ in 0..undos {
            history.undo();
        }

        let saved = history.save();
        let restored = HistoryManager::restore(saved.clone()).unwrap();
        prop_assert_eq!(restored.save(), saved);
        prop_assert_eq!(restored.entries(), history.entries());
        prop_assert_eq!(restored.cursor(), history.cursor());
    }

    #[test]
    fn prop_cursor_stays_in_range(ops in proptest::collection::vec(0u8..4, 0..60), depth in 1usize..6) {
        let mut history = HistoryManager::with_config(0u32, HistoryConfig::with_max_depth(depth));
        let mut next = 1u32;
        for op in ops {
            match op {
                0 | 1 => {
                    history.commit(next);
                    next += 1;
                }
                2 => {
                    history.undo();
                }
                _ => {
                    history.redo();
                }
            }
            prop_assert!(history.cursor() < history.len());
            prop_assert!(history.len() <= depth.max(history.cursor() + 1));
        }
    }
}

// ============================================================================
// Debounced commits
// ============================================================================

#[test]
fn test_burst_of_debounced_commits_yields_one_entry() {
    let start = Instant::now();
    let delay = Duration::from_millis(300);
    let mut history = HistoryManager::new(0u32);

    // 50 slider events, 5 ms apart
    let mut now = start;
    for value in 1..=50u32 {
        history.commit_debounced_at("opacity", value, delay, now);
        now += Duration::from_millis(5);
    }
    assert_eq!(history.len(), 1);

    // still inside the window of the last event
    assert_eq!(history.poll_at(now + Duration::from_millis(100)), 0);

    // 400 ms pause
    assert_eq!(history.poll_at(now + Duration::from_millis(400)), 1);
    assert_eq!(history.len(), 2);
    assert_eq!(*history.current(), 50);
    assert!(!history.has_pending());
}

#[test]
fn test_streams_are_independent() {
    let start = Instant::now();
    let mut history = HistoryManager::new((0u32, 0u32));

    history.commit_debounced_at("width", (10, 0), Duration::from_millis(100), start);
    history.commit_debounced_at("height", (10, 20), Duration::from_millis(300), start);

    assert_eq!(history.next_deadline(), Some(start + Duration::from_millis(100)));
    assert_eq!(history.poll_at(start + Duration::from_millis(150)), 1);
    assert_eq!(*history.current(), (10, 0));
    assert!(history.is_pending("height"));

    assert_eq!(history.poll_at(start + Duration::from_millis(350)), 1);
    assert_eq!(*history.current(), (10, 20));
}

#[test]
fn test_streams_fire_in_deadline_order() {
    let start = Instant::now();
    let mut history = HistoryManager::new(0u32);

    // scheduled later but due first
    history.commit_debounced_at("slow", 1, Duration::from_millis(300), start);
    history.commit_debounced_at("fast", 2, Duration::from_millis(50), start + Duration::from_millis(10));

    assert_eq!(history.poll_at(start + Duration::from_secs(1)), 2);
    assert_eq!(history.entries(), &[0, 2, 1]);

    history.commit_debounced_at("slow", 3, Duration::from_millis(300), start);
    history.commit_debounced_at("fast", 4, Duration::from_millis(300), start);
    assert!(history.flush("fast"));
    assert_eq!(*history.current(), 4);
    assert!(history.is_pending("slow"));
}

#[test]
fn test_debounced_value_equal_to_current_is_dropped() {
    let start = Instant::now();
    let mut history = HistoryManager::new(7);
    history.commit_debounced_at("x", 7, Duration::from_millis(10), start);
    assert_eq!(history.poll_at(start + Duration::from_secs(1)), 0);
    assert_eq!(history.len(), 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_single_entry_history_round_trips() {
    let history = HistoryManager::new(String::from("only"));
    let json = history.save().to_json().unwrap();
    let restored = HistoryManager::restore(PersistedHistory::<String>::from_json(&json).unwrap()).unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored.current(), "only");
    assert!(!restored.can_undo());
}

#[test]
fn test_restore_keeps_redo_branch() {
    let persisted = PersistedHistory {
        history: vec![1, 2, 3, 4],
        index: 1,
    };
    let mut history = HistoryManager::restore(persisted).unwrap();
    assert_eq!(*history.current(), 2);
    assert!(history.redo());
    assert!(history.redo());
    assert_eq!(*history.current(), 4);
}

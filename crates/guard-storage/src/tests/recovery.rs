//! Emergency clear and restore.

use super::harness::{guard, FakeHostStore};
use crate::{HostError, RecoveryOutcome, StorageKeys};

#[test]
fn protected_values_survive_emergency_recover() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.seed(StorageKeys::USER, "{\"id\":7}");
    store.seed(StorageKeys::THEME, "dark");
    store.seed(StorageKeys::ACTIVE_INTERVIEW, "session-42");
    store.seed(StorageKeys::DAILY_WORD, "{}");
    store.seed("orphan", "1");
    let guard = guard(&store);

    let outcome = guard.emergency_recover();

    assert!(outcome.is_success());
    assert_eq!(
        outcome,
        RecoveryOutcome::Recovered {
            restored: vec![
                StorageKeys::THEME.to_string(),
                StorageKeys::TOKEN.to_string(),
                StorageKeys::USER.to_string(),
            ]
        }
    );
    assert_eq!(guard.get(StorageKeys::TOKEN), Some("abc".to_string()));
    assert_eq!(guard.get(StorageKeys::USER), Some("{\"id\":7}".to_string()));
    assert_eq!(guard.get(StorageKeys::THEME), Some("dark".to_string()));
    assert_eq!(store.key_set().len(), 3);
    assert_eq!(guard.stats().emergency_recoveries, 1);
}

#[test]
fn absent_protected_keys_are_not_invented() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.seed(StorageKeys::THEME, "");
    store.seed("orphan", "1");
    let guard = guard(&store);

    let outcome = guard.emergency_recover();

    assert_eq!(
        outcome,
        RecoveryOutcome::Recovered {
            restored: vec![StorageKeys::TOKEN.to_string()]
        }
    );
    assert_eq!(store.key_set(), vec![StorageKeys::TOKEN.to_string()]);
}

#[test]
fn clear_failure_leaves_store_untouched() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.seed("orphan", "1");
    store.fail_clear();
    let guard = guard(&store);

    let outcome = guard.emergency_recover();

    assert_eq!(
        outcome,
        RecoveryOutcome::ClearFailed {
            reason: "clear failed".to_string()
        }
    );
    assert!(!outcome.is_success());
    assert_eq!(store.key_set().len(), 2);
    assert_eq!(store.set_calls(), 0, "nothing restored after a failed clear");
}

#[test]
fn restore_failure_is_reported_distinctly() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.seed(StorageKeys::USER, "{}");
    // `protected_keys` yields theme, token, user; theme is absent, so the
    // first restore is `token`.
    store.fail_next_set(HostError::new("write failed"));
    let guard = guard(&store);

    let outcome = guard.emergency_recover();

    assert_eq!(
        outcome,
        RecoveryOutcome::RestoreFailed {
            restored: vec![StorageKeys::USER.to_string()],
            lost: vec![StorageKeys::TOKEN.to_string()],
        }
    );
    assert_eq!(store.value(StorageKeys::TOKEN), None);
    assert_eq!(store.value(StorageKeys::USER), Some("{}".to_string()));
}

#[test]
fn outcome_serializes_with_status_tag() {
    let outcome = RecoveryOutcome::RestoreFailed {
        restored: vec![],
        lost: vec!["token".to_string()],
    };
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "restore_failed");
    assert_eq!(json["lost"][0], "token");
}

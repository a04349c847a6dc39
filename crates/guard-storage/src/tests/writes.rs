//! Read/write/delete behaviour and write-failure escalation.

use super::harness::{guard, guard_with, FakeHostStore, RecordingPrompt};
use crate::{HostError, StorageKeys};

#[test]
fn set_get_remove_roundtrip() {
    let store = FakeHostStore::new();
    let guard = guard(&store);

    assert!(guard.set(StorageKeys::THEME, "dark"));
    assert_eq!(guard.get(StorageKeys::THEME), Some("dark".to_string()));

    assert!(guard.set(StorageKeys::THEME, "light"));
    assert_eq!(guard.get(StorageKeys::THEME), Some("light".to_string()));

    assert!(guard.remove(StorageKeys::THEME));
    assert_eq!(guard.get(StorageKeys::THEME), None);
    assert_eq!(guard.stats().cleanups, 0);
}

#[test]
fn empty_key_is_rejected_without_touching_host() {
    let store = FakeHostStore::new();
    let guard = guard(&store);

    assert!(!guard.set("", "value"));
    assert_eq!(store.set_calls(), 0);
}

#[test]
fn read_errors_are_absent_values() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.fail_gets();
    let guard = guard(&store);

    assert_eq!(guard.get(StorageKeys::TOKEN), None);
    assert_eq!(guard.stats().cleanups, 0);
}

#[test]
fn remove_errors_report_false() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.fail_removes();
    let guard = guard(&store);

    assert!(!guard.remove(StorageKeys::TOKEN));
    assert_eq!(store.value(StorageKeys::TOKEN), Some("abc".to_string()));
    assert_eq!(guard.stats().cleanups, 0);
}

#[test]
fn non_quota_error_fails_immediately() {
    let store = FakeHostStore::new();
    store.seed("random_extension_key", "x");
    store.fail_every_set(HostError::new("storage disabled").with_name("SecurityError"));
    let prompt = RecordingPrompt::answering(true);
    let guard = guard_with(&store, &prompt);

    assert!(!guard.set(StorageKeys::TOKEN, "abc"));

    assert_eq!(store.set_calls(), 1, "no retry");
    assert_eq!(store.keys_calls(), 0, "no cleanup");
    assert_eq!(guard.stats().cleanups, 0);
    assert_eq!(guard.stats().write_retries, 0);
    assert_eq!(prompt.confirmations(), 0, "no recovery");
    assert_eq!(store.value("random_extension_key"), Some("x".to_string()));
}

#[test]
fn quota_error_then_success_after_cleanup() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::DASHBOARD_SENTENCE, "draft text");
    store.fail_next_set(HostError::quota_exceeded("full"));
    let prompt = RecordingPrompt::answering(true);
    let guard = guard_with(&store, &prompt);

    assert!(guard.set(StorageKeys::USER, "{\"id\":1}"));

    assert_eq!(store.value(StorageKeys::USER), Some("{\"id\":1}".to_string()));
    assert_eq!(store.value(StorageKeys::DASHBOARD_SENTENCE), None);
    assert_eq!(guard.stats().cleanups, 1);
    assert_eq!(guard.stats().write_retries, 1);
    assert_eq!(guard.stats().quota_failures, 0);
    assert_eq!(prompt.confirmations(), 0, "success after cleanup is silent");
}

#[test]
fn persistent_quota_error_cleans_once_and_retries_once() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.fail_every_set(HostError::new("x").with_code(22));
    let prompt = RecordingPrompt::answering(false);
    let guard = guard_with(&store, &prompt);

    assert!(!guard.set(StorageKeys::THEME, "dark"));

    assert_eq!(store.set_calls(), 2, "initial write plus one retry");
    assert_eq!(store.keys_calls(), 1, "exactly one cleanup sweep");
    let stats = guard.stats();
    assert_eq!(stats.cleanups, 1);
    assert_eq!(stats.write_retries, 1);
    assert_eq!(stats.quota_failures, 1);
    assert_eq!(prompt.confirmations(), 1, "recovery offered after the retry");
    // Declined: nothing cleared
    assert_eq!(stats.emergency_recoveries, 0);
    assert_eq!(store.clear_calls(), 0);
    assert_eq!(store.value(StorageKeys::TOKEN), Some("abc".to_string()));
}

#[test]
fn persistent_quota_error_with_confirmed_recovery_reports_lost_session() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.fail_every_set(HostError::new("Quota exceeded"));
    let prompt = RecordingPrompt::answering(true);
    let guard = guard_with(&store, &prompt);

    assert!(!guard.set(StorageKeys::THEME, "dark"));

    assert_eq!(guard.stats().cleanups, 1);
    assert_eq!(guard.stats().emergency_recoveries, 1);
    assert_eq!(store.clear_calls(), 1);
    // Restore of `token` also hit the full store
    assert_eq!(store.set_calls(), 3);
    assert_eq!(store.value(StorageKeys::TOKEN), None);

    let notifications = prompt.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("session may be lost"));
    assert_eq!(prompt.reloads(), 0);
}

#[test]
fn quota_error_with_successful_recovery_requests_reload() {
    let store = FakeHostStore::new();
    store.seed(StorageKeys::TOKEN, "abc");
    store.seed("random_extension_key", "x");
    // Initial write and retry fail; the restore of `token` goes through
    store.fail_next_set(HostError::quota_exceeded("full"));
    store.fail_next_set(HostError::quota_exceeded("full"));
    let prompt = RecordingPrompt::answering(true);
    let guard = guard_with(&store, &prompt);

    assert!(!guard.set(StorageKeys::USER, "huge"));

    assert_eq!(store.key_set(), vec![StorageKeys::TOKEN.to_string()]);
    assert_eq!(prompt.reloads(), 1);
    assert!(prompt.notifications()[0].contains("reload"));
}

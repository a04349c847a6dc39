//! Behavioural tests for `StorageGuard`.
//!
//! - `harness.rs`  - scriptable fake host store, recording prompt, guard builder
//! - `writes.rs`   - set/get/remove and write-failure escalation
//! - `cleanup.rs`  - cleanup policy
//! - `recovery.rs` - emergency clear and restore
//! - `health.rs`   - usage estimates, lifecycle and reports

mod recovery;
mod writes;

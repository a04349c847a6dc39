//! Host error signal and quota classification.

use thiserror::Error;

/// Numeric codes hosts use for a full store.
const QUOTA_CODES: [u32; 2] = [22, 1014];

/// Symbolic names hosts use for a full store.
const QUOTA_NAMES: [&str; 2] = ["QuotaExceededError", "NS_ERROR_DOM_QUOTA_REACHED"];

/// Error raised by a [`HostStore`](crate::HostStore).
///
/// Hosts disagree on how they report a full store, so the raw signal is kept
/// as-is and only [`classify`] interprets it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    pub code: Option<u32>,
    pub name: Option<String>,
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            name: None,
            message: message.into(),
        }
    }

    /// The canonical quota signal, used by the stores in this crate.
    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(message)
            .with_code(QUOTA_CODES[0])
            .with_name(QUOTA_NAMES[0])
    }

    pub fn with_code(mut self, code: u32) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Why a write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailure {
    /// The store is full; cleanup may help.
    QuotaExceeded,
    /// Anything else (store disabled, permissions, I/O). Cleanup will not help.
    Other,
}

/// Classify a host error. A match on any known quota signal wins.
pub fn classify(error: &HostError) -> WriteFailure {
    let code_matches = error.code.is_some_and(|code| QUOTA_CODES.contains(&code));
    let name_matches = error
        .name
        .as_deref()
        .is_some_and(|name| QUOTA_NAMES.contains(&name));
    let message_matches =
        error.message.to_lowercase().contains("quota") || error.message.contains("NO_SPACE");

    if code_matches || name_matches || message_matches {
        WriteFailure::QuotaExceeded
    } else {
        WriteFailure::Other
    }
}

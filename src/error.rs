//! Error types surfaced to callers.
//!
//! Graph-resolution faults never show up here: they degrade to empty branches
//! and are reported through [`crate::SortMetrics`] instead. Only per-trigger
//! compilation faults, the version gate and input-contract violations are
//! errors.

use thiserror::Error;

/// Result type for colloquy operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The pattern compiler could not tokenize a trigger or `%previous` pattern.
    #[error("malformed pattern '{pattern}': {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// A script declared a format version newer than the one supported.
    #[error("script version {declared} is newer than supported version {supported}")]
    VersionIncompatible { declared: f64, supported: f64 },

    /// A `! version` directive whose value is not a number.
    #[error("invalid script version '{0}'")]
    InvalidVersion(String),

    /// Matching was requested against a topic that was never registered.
    #[error("unknown topic '{0}'")]
    UnknownTopic(String),

    /// The topic's sorted lists are stale; `sort_all` must run first.
    #[error("topic '{0}' has not been sorted since its last change")]
    SortRequired(String),
}

impl Error {
    pub(crate) fn malformed(pattern: &str, reason: impl Into<String>) -> Self {
        Error::MalformedPattern { pattern: pattern.to_string(), reason: reason.into() }
    }
}

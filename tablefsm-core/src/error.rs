//! Core error types.

use std::fmt;
use thiserror::Error;

/// What kind of entry an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    State,
    Condition,
    Transition,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::State => f.write_str("state"),
            EntryKind::Condition => f.write_str("condition"),
            EntryKind::Transition => f.write_str("transition"),
        }
    }
}

/// Which tracked state a setup override targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateRole {
    Current,
    Previous,
}

impl fmt::Display for StateRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateRole::Current => f.write_str("current"),
            StateRole::Previous => f.write_str("previous"),
        }
    }
}

/// Errors from the transition engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{kind} already exists: {}", .names.join(", "))]
    DuplicateEntry { kind: EntryKind, names: Vec<String> },

    #[error("{kind} not found: {name}")]
    NotFound { kind: EntryKind, name: String },

    #[error("invalid transition: no '{condition}' transition from state '{state}'")]
    NoTransition { state: String, condition: String },

    #[error("invalid {role} state: '{state}' is not a known state")]
    UnknownState { role: StateRole, state: String },

    #[error("state conflict: expected '{expected}', actual '{actual}'")]
    StateConflict { expected: String, actual: String },

    #[error("invalid label '{label}': {reason}")]
    InvalidLabel { label: String, reason: String },

    #[error("invalid transition key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("snapshot checksum mismatch: expected {expected}, actual {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("{codec} codec error: {reason}")]
    Codec { codec: &'static str, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Returns true for lookups that fell outside the table or state set.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            CoreError::NoTransition { .. } | CoreError::UnknownState { .. }
        )
    }

    /// Returns a stable error code suitable for display or host-side matching.
    pub fn error_code(&self) -> &'static str {
        match self {
            CoreError::DuplicateEntry { .. } => "DUPLICATE_ENTRY",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::NoTransition { .. } => "OUT_OF_RANGE",
            CoreError::UnknownState { .. } => "OUT_OF_RANGE",
            CoreError::StateConflict { .. } => "CONFLICT",
            CoreError::InvalidLabel { .. } => "BAD_REQUEST",
            CoreError::InvalidKey { .. } => "BAD_REQUEST",
            CoreError::ChecksumMismatch { .. } => "BAD_REQUEST",
            CoreError::Codec { .. } => "BAD_REQUEST",
            CoreError::Json(_) => "BAD_REQUEST",
        }
    }
}

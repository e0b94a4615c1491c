//! Unified application error types for Box Office.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The requested seat was not found.
    NotFound,
    /// Input validation failed.
    Validation,
    /// A seat state precondition did not hold.
    Conflict,
    /// An internal invariant was violated.
    Internal,
    /// A configuration error occurred.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Configuration => write!(f, "CONFIGURATION"),
        }
    }
}

/// Why a lease operation was refused by the seat state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictReason {
    /// The seat is held by a live lease.
    AlreadyHeld,
    /// The seat has been committed and can no longer change.
    AlreadyCommitted,
    /// The caller is not the holder of the live lease.
    NotHolder,
    /// There is no live lease to confirm.
    Expired,
}

impl ConflictReason {
    /// Whether a caller may reasonably retry the operation later.
    ///
    /// A held seat may lapse and an expired lease may be re-acquired;
    /// a committed seat or someone else's lease will not change in the
    /// caller's favour.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::AlreadyHeld | Self::Expired)
    }

    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            Self::AlreadyHeld => "ALREADY_HELD",
            Self::AlreadyCommitted => "ALREADY_COMMITTED",
            Self::NotHolder => "NOT_HOLDER",
            Self::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The unified application error used throughout Box Office.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Conflict sub-kind; set iff `kind` is [`ErrorKind::Conflict`].
    pub conflict: Option<ConflictReason>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            conflict: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            conflict: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error with its sub-kind.
    pub fn conflict(reason: ConflictReason, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Conflict,
            message: message.into(),
            conflict: Some(reason),
            source: None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Whether the caller may retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        self.conflict.is_some_and(ConflictReason::is_retryable)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            conflict: self.conflict,
            source: None,
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

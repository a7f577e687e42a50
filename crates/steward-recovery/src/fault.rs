//! Fault values, classification, and the immutable exception record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use thiserror::Error;

/// Classification bucket assigned to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    Connection,
    Timeout,
    Validation,
    Business,
    System,
    Unknown,
}

impl FaultKind {
    /// Lowercase label used in logs and classification.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Timeout => "timeout",
            Self::Validation => "validation",
            Self::Business => "business",
            Self::System => "system",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Policy applied after a fault is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    /// Re-invoke the failed operation with exponential backoff.
    Retry,
    /// Run the configured alternate operation instead.
    Fallback,
    /// Convert the fault into a propagating failure for the caller above.
    Escalate,
    /// Suppress the fault and yield the configured sentinel.
    Ignore,
}

impl RecoveryStrategy {
    /// Lowercase label used in logs and user-facing boundary text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retry => "retry",
            Self::Fallback => "fallback",
            Self::Escalate => "escalate",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for RecoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Free-form context captured alongside a fault.
pub type FaultContext = HashMap<String, serde_json::Value>;

/// A failure observed while serving a request.
///
/// Prefer [`Fault::new`], which tags the kind explicitly at the origin.
/// [`Fault::named`] exists for failures that only carry a categorical name
/// (say, one lifted from an upstream error type); those are classified by
/// name matching. Construction captures the caller's source location so
/// records can point back at the origin.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{name}: {message}")]
pub struct Fault {
    /// Explicit classification, when the origin knows it.
    pub kind: Option<FaultKind>,
    /// Categorical name, used as the classification fallback.
    pub name: String,
    /// Failure detail. Internal only; never shown to end users.
    pub message: String,
    /// Source location where the fault was constructed.
    pub origin: String,
}

impl Fault {
    /// Create a fault with an explicit kind.
    #[track_caller]
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            name: kind.label().to_string(),
            message: message.into(),
            origin: Location::caller().to_string(),
        }
    }

    /// Create a fault that only carries a categorical name.
    #[track_caller]
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: None,
            name: name.into(),
            message: message.into(),
            origin: Location::caller().to_string(),
        }
    }

    /// Resolve this fault's kind.
    ///
    /// An explicit tag wins. Otherwise the categorical name is matched
    /// case-insensitively against each kind in fixed precedence order
    /// (connection, timeout, validation, business, system); the first
    /// match wins and anything else is [`FaultKind::Unknown`].
    pub fn classify(&self) -> FaultKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        let name = self.name.to_lowercase();
        if name.contains("connect") {
            FaultKind::Connection
        } else if name.contains("timeout") {
            FaultKind::Timeout
        } else if name.contains("validation") || name.contains("value") {
            FaultKind::Validation
        } else if name.contains("business") {
            FaultKind::Business
        } else if name.contains("system") {
            FaultKind::System
        } else {
            FaultKind::Unknown
        }
    }
}

/// Immutable record of one handled exception.
///
/// Produced by the engine's `handle_exception` and never mutated afterward;
/// recovery execution only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionRecord {
    /// Resolved classification.
    pub kind: FaultKind,
    /// The fault's internal message.
    pub message: String,
    /// Caller-supplied context.
    pub context: FaultContext,
    /// Strategy chosen from the engine's table at handling time.
    pub strategy: RecoveryStrategy,
    /// When the record was produced.
    pub timestamp: DateTime<Utc>,
    /// Source location where the fault originated.
    pub origin: String,
}

impl ExceptionRecord {
    /// Boundary-safe text for end users: a generic apology plus the
    /// attempted strategy label. Raw internal failure text never leaks
    /// through here.
    pub fn user_facing_message(&self) -> String {
        format!(
            "We're sorry, something went wrong while handling your request. \
             Recovery attempted: {}.",
            self.strategy
        )
    }
}

//! Error types for recovery execution.

use thiserror::Error;

use crate::fault::{Fault, FaultKind};

/// Result type for recovery operations.
pub type RecoveryResult<T> = Result<T, RecoveryError>;

/// Failures that escape the recovery engine to its caller.
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// The operation kept failing through the final retry attempt. Carries
    /// the fault from that last attempt.
    #[error("operation still failing after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Fault,
    },

    /// The configured fallback operation itself failed.
    #[error("fallback operation failed")]
    FallbackFailed(#[source] Fault),

    /// Deliberate non-recovery: the fault was converted into a propagating
    /// failure for a higher layer to handle.
    #[error("escalated {kind} fault: {message}")]
    Escalated { kind: FaultKind, message: String },
}

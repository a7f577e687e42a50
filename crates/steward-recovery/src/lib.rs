//! # Steward Recovery
//!
//! Fault classification and recovery execution for the Steward
//! orchestration kernel.
//!
//! A [`Fault`] is the failure value agents hand to the engine. Faults carry
//! an explicit [`FaultKind`] tag where possible; faults that only carry a
//! categorical name are classified by precedence-ordered substring matching
//! as a compatibility fallback. The [`RecoveryEngine`] maps each kind to a
//! [`RecoveryStrategy`] through an overridable table, records the decision
//! in an immutable [`ExceptionRecord`], and executes the strategy against a
//! caller-supplied async operation.
//!
//! ## Example
//!
//! ```
//! use steward_recovery::{Fault, FaultKind, RecoveryConfig, RecoveryEngine, RecoveryStrategy};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let engine = RecoveryEngine::new();
//! let fault = Fault::new(FaultKind::Validation, "order id is malformed");
//! let record = engine.handle_exception(&fault, Default::default()).await;
//! assert_eq!(record.strategy, RecoveryStrategy::Ignore);
//!
//! let outcome = engine
//!     .apply_recovery_strategy(&record, || async { Err(fault.clone()) }, &RecoveryConfig::default())
//!     .await
//!     .unwrap();
//! assert!(outcome.is_none());
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod fault;

pub use engine::{FallbackFn, FaultHook, RecoveryConfig, RecoveryEngine};
pub use error::{RecoveryError, RecoveryResult};
pub use fault::{ExceptionRecord, Fault, FaultContext, FaultKind, RecoveryStrategy};

//! The recovery engine: strategy table, hooks, and strategy execution.

use chrono::Utc;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::error::{RecoveryError, RecoveryResult};
use crate::fault::{ExceptionRecord, Fault, FaultContext, FaultKind, RecoveryStrategy};

/// Stored fallible async operation used as the fallback path. Arguments are
/// captured by the closure.
pub type FallbackFn = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, Fault>> + Send + Sync>;

/// Side-effecting hook invoked once per handled exception.
///
/// Hooks are telemetry only: they run after the record is built and cannot
/// alter it or the engine's control flow.
pub trait FaultHook: Send + Sync {
    fn on_fault(&self, record: &ExceptionRecord);
}

/// Default hook: structured logging at the severity the kind warrants.
struct TracingHook;

impl FaultHook for TracingHook {
    fn on_fault(&self, record: &ExceptionRecord) {
        match record.kind {
            FaultKind::Connection | FaultKind::Timeout | FaultKind::Validation => warn!(
                kind = %record.kind,
                strategy = %record.strategy,
                message = %record.message,
                "recoverable fault"
            ),
            FaultKind::Business => error!(
                kind = %record.kind,
                strategy = %record.strategy,
                message = %record.message,
                "business fault"
            ),
            // tracing has no level above error; mark criticality as a field.
            FaultKind::System => error!(
                severity = "critical",
                strategy = %record.strategy,
                message = %record.message,
                "system fault"
            ),
            FaultKind::Unknown => {}
        }
    }
}

/// Knobs for [`RecoveryEngine::apply_recovery_strategy`].
///
/// `max_retries` caps Retry invocations (default 3). `backoff_unit` is the
/// base of the exponential backoff between attempts (default one second;
/// the wait before attempt `n + 1` is `backoff_unit * 2^(n - 1)`).
/// `fallback_operation` and `default_return_value` feed the Fallback and
/// Ignore strategies respectively.
#[derive(Clone)]
pub struct RecoveryConfig {
    pub max_retries: u32,
    pub backoff_unit: Duration,
    pub fallback_operation: Option<FallbackFn>,
    pub default_return_value: Option<Value>,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(1),
            fallback_operation: None,
            default_return_value: None,
        }
    }
}

impl fmt::Debug for RecoveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryConfig")
            .field("max_retries", &self.max_retries)
            .field("backoff_unit", &self.backoff_unit)
            .field("fallback_operation", &self.fallback_operation.is_some())
            .field("default_return_value", &self.default_return_value)
            .finish()
    }
}

impl RecoveryConfig {
    /// Cap the number of Retry invocations.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the exponential backoff base.
    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Supply the alternate operation run by the Fallback strategy.
    pub fn with_fallback<F, Fut>(mut self, fallback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Fault>> + Send + 'static,
    {
        self.fallback_operation = Some(Arc::new(move || Box::pin(fallback())));
        self
    }

    /// Supply the sentinel returned by the Ignore strategy.
    pub fn with_default_return(mut self, value: Value) -> Self {
        self.default_return_value = Some(value);
        self
    }
}

/// Classifies faults, picks a recovery strategy, and executes it.
///
/// Cheap to clone; clones share the strategy and hook tables. Both tables
/// are overridable at runtime.
#[derive(Clone)]
pub struct RecoveryEngine {
    strategies: Arc<RwLock<HashMap<FaultKind, RecoveryStrategy>>>,
    hooks: Arc<RwLock<HashMap<FaultKind, Arc<dyn FaultHook>>>>,
}

impl Default for RecoveryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecoveryEngine {
    /// Create an engine with the default strategy table and logging hooks.
    ///
    /// Defaults: Connection and Timeout retry, Validation is ignored,
    /// Business and System escalate. Unknown faults fall through to Ignore
    /// and carry no hook.
    pub fn new() -> Self {
        let strategies = HashMap::from([
            (FaultKind::Connection, RecoveryStrategy::Retry),
            (FaultKind::Timeout, RecoveryStrategy::Retry),
            (FaultKind::Validation, RecoveryStrategy::Ignore),
            (FaultKind::Business, RecoveryStrategy::Escalate),
            (FaultKind::System, RecoveryStrategy::Escalate),
        ]);

        let hook: Arc<dyn FaultHook> = Arc::new(TracingHook);
        let hooks = HashMap::from([
            (FaultKind::Connection, Arc::clone(&hook)),
            (FaultKind::Timeout, Arc::clone(&hook)),
            (FaultKind::Validation, Arc::clone(&hook)),
            (FaultKind::Business, Arc::clone(&hook)),
            (FaultKind::System, hook),
        ]);

        Self {
            strategies: Arc::new(RwLock::new(strategies)),
            hooks: Arc::new(RwLock::new(hooks)),
        }
    }

    /// Override the strategy applied to one fault kind.
    pub async fn set_strategy(&self, kind: FaultKind, strategy: RecoveryStrategy) {
        self.strategies.write().await.insert(kind, strategy);
    }

    /// The strategy currently mapped to a kind. Unmapped kinds are ignored.
    pub async fn strategy_for(&self, kind: FaultKind) -> RecoveryStrategy {
        self.strategies
            .read()
            .await
            .get(&kind)
            .copied()
            .unwrap_or(RecoveryStrategy::Ignore)
    }

    /// Replace the hook invoked for one fault kind.
    pub async fn set_hook(&self, kind: FaultKind, hook: Arc<dyn FaultHook>) {
        self.hooks.write().await.insert(kind, hook);
    }

    /// Classify a fault, choose its strategy, and produce the immutable
    /// record of the decision.
    ///
    /// The per-kind hook fires after the record is built; hook output is
    /// telemetry only and never changes the returned record.
    pub async fn handle_exception(&self, fault: &Fault, context: FaultContext) -> ExceptionRecord {
        let kind = fault.classify();
        let strategy = self.strategy_for(kind).await;

        let record = ExceptionRecord {
            kind,
            message: fault.message.clone(),
            context,
            strategy,
            timestamp: Utc::now(),
            origin: fault.origin.clone(),
        };

        let hook = self.hooks.read().await.get(&kind).cloned();
        if let Some(hook) = hook {
            hook.on_fault(&record);
        }
        record
    }

    /// Execute the record's strategy against a caller-supplied operation.
    ///
    /// - **Retry**: invoke `operation` up to `config.max_retries` times,
    ///   suspending `backoff_unit * 2^attempt_index` between attempts; the
    ///   final failure propagates as [`RecoveryError::RetriesExhausted`].
    /// - **Fallback**: run `config.fallback_operation` if present, else
    ///   return nothing.
    /// - **Escalate**: always fail with a new error wrapping the record's
    ///   message; this strategy never yields a value.
    /// - **Ignore**: return `config.default_return_value`.
    pub async fn apply_recovery_strategy<F, Fut>(
        &self,
        record: &ExceptionRecord,
        operation: F,
        config: &RecoveryConfig,
    ) -> RecoveryResult<Option<Value>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Value, Fault>>,
    {
        match record.strategy {
            RecoveryStrategy::Retry => {
                let attempts = config.max_retries.max(1);
                let mut attempt = 0;
                loop {
                    match operation().await {
                        Ok(value) => return Ok(Some(value)),
                        Err(fault) => {
                            attempt += 1;
                            if attempt >= attempts {
                                warn!(attempts, kind = %record.kind, "retry budget exhausted");
                                return Err(RecoveryError::RetriesExhausted {
                                    attempts,
                                    source: fault,
                                });
                            }
                            let backoff = config
                                .backoff_unit
                                .saturating_mul(2u32.saturating_pow(attempt - 1));
                            debug!(
                                attempt,
                                backoff_ms = backoff.as_millis() as u64,
                                "operation failed, backing off"
                            );
                            tokio::time::sleep(backoff).await;
                        }
                    }
                }
            }
            RecoveryStrategy::Fallback => match &config.fallback_operation {
                Some(fallback) => fallback()
                    .await
                    .map(Some)
                    .map_err(RecoveryError::FallbackFailed),
                None => Ok(None),
            },
            RecoveryStrategy::Escalate => {
                error!(kind = %record.kind, "escalating fault");
                Err(RecoveryError::Escalated {
                    kind: record.kind,
                    message: record.message.clone(),
                })
            }
            RecoveryStrategy::Ignore => Ok(config.default_return_value.clone()),
        }
    }
}

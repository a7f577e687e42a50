//! # Steward
//!
//! Orchestration kernel for a small set of cooperating customer-service
//! agents. This meta crate re-exports the three kernel components and their
//! shared vocabulary:
//!
//! - [`GoalTracker`] — tracks long-running intents, estimates progress, and
//!   raises monitoring alerts.
//! - [`RecoveryEngine`] — classifies faults, maps them to recovery
//!   strategies, and executes those strategies against caller-supplied
//!   operations.
//! - [`CommunicationHub`] — registers agents, delivers point-to-point and
//!   broadcast messages, and runs topic subscriptions plus the
//!   pending-queue drain loop.
//!
//! The components hold no references to each other; an orchestrating layer
//! wires them together per agent. Agents only need to implement
//! [`AgentEndpoint`] to participate.

pub use steward_core::{
    AgentEndpoint, AgentId, DEFAULT_TOPIC, EndpointError, IdValidationError, Message, MessageId,
    MessageMetadata, RecordingEndpoint, TOPIC_KEY, Topic,
};
pub use steward_goal::{AlertKind, Goal, GoalAlert, GoalMetadata, GoalStatus, GoalTracker};
pub use steward_hub::{CommunicationHub, DeliveryReceipt, HandlerError, TopicHandler};
pub use steward_recovery::{
    ExceptionRecord, FallbackFn, Fault, FaultContext, FaultHook, FaultKind, RecoveryConfig,
    RecoveryEngine, RecoveryError, RecoveryResult, RecoveryStrategy,
};

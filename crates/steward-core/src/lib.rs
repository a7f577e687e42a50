//! # Steward Core
//!
//! Shared vocabulary for the Steward orchestration kernel.
//!
//! This crate defines the types every kernel component speaks: validated
//! [`AgentId`] and [`Topic`] identifiers, the immutable [`Message`] exchanged
//! between agents, and the [`AgentEndpoint`] capability contract that any
//! participant must implement to be addressable by the communication hub.
//!
//! The kernel components themselves live in their own crates
//! (`steward-goal`, `steward-recovery`, `steward-hub`) and do not depend on
//! each other; this crate is their only shared dependency.

pub mod endpoint;
pub mod message;
pub mod recording;
pub mod types;

pub use endpoint::{AgentEndpoint, EndpointError};
pub use message::{DEFAULT_TOPIC, Message, MessageId, MessageMetadata, TOPIC_KEY};
pub use recording::RecordingEndpoint;
pub use types::{AgentId, IdValidationError, Topic};

//! Capability contract implemented by every addressable participant.
//!
//! The kernel deliberately has no notion of agent specialization: billing,
//! tech-support, escalation and friends are distinct values implementing
//! this trait, selected at registration time. The hub only ever calls
//! [`AgentEndpoint::receive`] and [`AgentEndpoint::history`];
//! [`AgentEndpoint::process`] belongs to the orchestrating layer.

use async_trait::async_trait;
use serde_json::Value;

use crate::message::Message;

/// Error surfaced by an endpoint's domain logic.
pub type EndpointError = Box<dyn std::error::Error + Send + Sync>;

/// Minimal contract for a participant in the agent network.
#[async_trait]
pub trait AgentEndpoint: Send + Sync {
    /// Run the agent's domain logic against one input.
    ///
    /// Never called by the kernel; orchestrating layers invoke it when they
    /// dispatch work to a registered agent.
    async fn process(&self, input: Value) -> Result<Value, EndpointError>;

    /// Accept a message delivered by the communication hub.
    async fn receive(&self, message: Message);

    /// Messages this agent has seen, oldest first.
    ///
    /// Endpoints without an inspectable history keep the default, which
    /// reports none.
    async fn history(&self) -> Vec<Message> {
        Vec::new()
    }
}

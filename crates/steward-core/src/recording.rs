//! In-memory endpoint that records everything it receives.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::endpoint::{AgentEndpoint, EndpointError};
use crate::message::Message;
use crate::types::AgentId;

/// Reference [`AgentEndpoint`] backed by an in-memory history.
///
/// `process` echoes its input. Clones share the same history, so a test can
/// keep a handle while the hub owns another.
#[derive(Clone)]
pub struct RecordingEndpoint {
    name: AgentId,
    history: Arc<RwLock<Vec<Message>>>,
}

impl RecordingEndpoint {
    /// Create a new endpoint with an empty history.
    pub fn new(name: impl Into<AgentId>) -> Self {
        Self {
            name: name.into(),
            history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// The agent name this endpoint was created with.
    pub fn name(&self) -> &AgentId {
        &self.name
    }

    /// Number of messages recorded so far.
    pub async fn received_count(&self) -> usize {
        self.history.read().await.len()
    }
}

#[async_trait]
impl AgentEndpoint for RecordingEndpoint {
    async fn process(&self, input: Value) -> Result<Value, EndpointError> {
        Ok(input)
    }

    async fn receive(&self, message: Message) {
        self.history.write().await.push(message);
    }

    async fn history(&self) -> Vec<Message> {
        self.history.read().await.clone()
    }
}

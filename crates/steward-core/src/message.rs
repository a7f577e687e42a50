//! The immutable message unit exchanged between registered agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::types::AgentId;

/// Metadata key that routes a queued message to a topic handler.
pub const TOPIC_KEY: &str = "topic";

/// Topic assumed for messages whose metadata carries no [`TOPIC_KEY`].
pub const DEFAULT_TOPIC: &str = "default";

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Create a new random message id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the message id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-form message metadata (arbitrary string key-value pairs).
pub type MessageMetadata = HashMap<String, String>;

/// A message sent from one agent to another.
///
/// Messages are immutable once constructed: build them with [`Message::new`]
/// plus the `with_*` combinators, then hand them to the hub. The timestamp
/// is taken at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier.
    pub id: MessageId,
    /// Name of the sending agent.
    pub sender: AgentId,
    /// Name of the receiving agent.
    pub recipient: AgentId,
    /// Message body.
    pub content: String,
    /// When the message was created.
    pub timestamp: DateTime<Utc>,
    /// Metadata key-value pairs; may carry a [`TOPIC_KEY`] entry.
    #[serde(default)]
    pub metadata: MessageMetadata,
}

impl Message {
    /// Create a new message with an empty metadata map.
    pub fn new(
        sender: impl Into<AgentId>,
        recipient: impl Into<AgentId>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            sender: sender.into(),
            recipient: recipient.into(),
            content: content.into(),
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Add a single metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merge a whole metadata map into the message.
    pub fn with_metadata_map(mut self, metadata: MessageMetadata) -> Self {
        self.metadata.extend(metadata);
        self
    }

    /// Get a metadata value by key.
    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// The topic this message belongs to, falling back to [`DEFAULT_TOPIC`]
    /// when the metadata carries none.
    pub fn topic(&self) -> &str {
        self.get_metadata(TOPIC_KEY).unwrap_or(DEFAULT_TOPIC)
    }
}

//! # Steward Hub
//!
//! Inter-agent communication for the Steward orchestration kernel.
//!
//! The [`CommunicationHub`] keeps a registry of addressable
//! [`AgentEndpoint`](steward_core::AgentEndpoint)s and moves messages
//! between them: synchronous point-to-point delivery, broadcast,
//! topic-keyed publish/subscribe, and a cooperative drain loop over a
//! pending-message queue for deferred delivery.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use steward_core::{AgentId, RecordingEndpoint};
//! use steward_hub::CommunicationHub;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let hub = CommunicationHub::new();
//! let triage = RecordingEndpoint::new("triage");
//! hub.register_agent(AgentId::from("triage"), Arc::new(triage.clone()))
//!     .await;
//!
//! let receipt = hub
//!     .send_message(&AgentId::from("billing"), &AgentId::from("triage"), "hello", None)
//!     .await;
//! assert!(receipt.success);
//! assert_eq!(triage.received_count().await, 1);
//! # }
//! ```

pub mod hub;
pub mod receipt;

pub use hub::{CommunicationHub, HandlerError, TopicHandler};
pub use receipt::DeliveryReceipt;

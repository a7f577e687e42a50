//! The communication hub: registry, delivery, pub/sub, and the drain loop.

use futures::future::BoxFuture;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use steward_core::{AgentEndpoint, AgentId, Message, MessageMetadata, TOPIC_KEY, Topic};

use crate::receipt::DeliveryReceipt;

/// Error surfaced by a topic handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Stored handler bound to one `(agent, topic)` subscription.
pub type TopicHandler = Arc<dyn Fn(Message) -> BoxFuture<'static, Result<(), HandlerError>> + Send + Sync>;

/// Routes messages between registered agents.
///
/// Point-to-point sends deliver synchronously: the recipient's `receive`
/// completes before the call returns. Deferred delivery goes through
/// [`CommunicationHub::enqueue_message`] and the cooperative
/// [`CommunicationHub::drain_queue`] loop; a message travels exactly one of
/// the two paths, never both.
///
/// Cheap to clone; clones share the registry, queue, and subscriptions.
/// Each table sits behind its own lock.
#[derive(Clone, Default)]
pub struct CommunicationHub {
    endpoints: Arc<RwLock<HashMap<AgentId, Arc<dyn AgentEndpoint>>>>,
    /// Registration order, for deterministic broadcast iteration.
    order: Arc<RwLock<Vec<AgentId>>>,
    pending: Arc<RwLock<VecDeque<Message>>>,
    subscriptions: Arc<RwLock<HashMap<(AgentId, Topic), TopicHandler>>>,
}

impl CommunicationHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under a name. Re-registering a name replaces the
    /// previous endpoint (last write wins) without changing its position in
    /// the broadcast order.
    pub async fn register_agent(&self, name: AgentId, endpoint: Arc<dyn AgentEndpoint>) {
        let mut endpoints = self.endpoints.write().await;
        let mut order = self.order.write().await;
        if endpoints.insert(name.clone(), endpoint).is_none() {
            order.push(name.clone());
        }
        debug!(agent = %name, "agent registered");
    }

    /// Remove an agent from the registry. Unknown names are a no-op.
    pub async fn unregister_agent(&self, name: &AgentId) {
        let mut endpoints = self.endpoints.write().await;
        let mut order = self.order.write().await;
        if endpoints.remove(name).is_some() {
            order.retain(|n| n != name);
            debug!(agent = %name, "agent unregistered");
        }
    }

    /// Names of all registered agents, in registration order.
    pub async fn registered_agents(&self) -> Vec<AgentId> {
        self.order.read().await.clone()
    }

    /// Number of messages waiting in the pending queue.
    pub async fn pending_len(&self) -> usize {
        self.pending.read().await.len()
    }

    /// Send a message and deliver it synchronously.
    ///
    /// Fails without mutating anything when the recipient is not
    /// registered. On success the recipient's `receive` has completed by
    /// the time the receipt is returned; the receipt data carries the
    /// message id.
    pub async fn send_message(
        &self,
        sender: &AgentId,
        recipient: &AgentId,
        content: impl Into<String>,
        metadata: Option<MessageMetadata>,
    ) -> DeliveryReceipt {
        let endpoint = self.endpoints.read().await.get(recipient).cloned();
        let Some(endpoint) = endpoint else {
            return DeliveryReceipt::failed(
                format!("recipient '{recipient}' not found"),
                format!("agent '{recipient}' is not registered"),
            );
        };

        let message = build_message(sender, recipient, content, metadata);
        let id = message.id.clone();
        endpoint.receive(message).await;
        debug!(from = %sender, to = %recipient, message_id = %id, "message delivered");
        DeliveryReceipt::delivered(
            format!("message delivered to '{recipient}'"),
            Some(json!({ "message_id": id.as_str() })),
        )
    }

    /// Send a message to every registered agent except those in `exclude`,
    /// in registration order. Returns one receipt per addressed recipient.
    pub async fn broadcast_message(
        &self,
        sender: &AgentId,
        content: &str,
        metadata: Option<MessageMetadata>,
        exclude: &[AgentId],
    ) -> Vec<DeliveryReceipt> {
        let order = self.order.read().await.clone();
        let mut receipts = Vec::new();
        for name in order {
            if exclude.contains(&name) {
                continue;
            }
            receipts.push(
                self.send_message(sender, &name, content, metadata.clone())
                    .await,
            );
        }
        receipts
    }

    /// Queue a message for deferred delivery by [`drain_queue`].
    ///
    /// Applies the same registration check as [`send_message`] but does not
    /// deliver anything itself.
    ///
    /// [`drain_queue`]: CommunicationHub::drain_queue
    /// [`send_message`]: CommunicationHub::send_message
    pub async fn enqueue_message(
        &self,
        sender: &AgentId,
        recipient: &AgentId,
        content: impl Into<String>,
        metadata: Option<MessageMetadata>,
    ) -> DeliveryReceipt {
        if !self.endpoints.read().await.contains_key(recipient) {
            return DeliveryReceipt::failed(
                format!("recipient '{recipient}' not found"),
                format!("agent '{recipient}' is not registered"),
            );
        }

        let message = build_message(sender, recipient, content, metadata);
        let id = message.id.clone();
        self.pending.write().await.push_back(message);
        debug!(from = %sender, to = %recipient, message_id = %id, "message queued");
        DeliveryReceipt::delivered(
            format!("message queued for '{recipient}'"),
            Some(json!({ "message_id": id.as_str() })),
        )
    }

    /// Bind a handler to the exact `(agent, topic)` pair, replacing any
    /// previous handler at that key.
    pub async fn subscribe_to_topic<F, Fut>(&self, agent: AgentId, topic: Topic, handler: F)
    where
        F: Fn(Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let handler: TopicHandler = Arc::new(move |message| Box::pin(handler(message)));
        self.subscriptions
            .write()
            .await
            .insert((agent, topic), handler);
    }

    /// Drop the subscription at the exact `(agent, topic)` pair, if any.
    pub async fn unsubscribe_from_topic(&self, agent: &AgentId, topic: &Topic) {
        self.subscriptions
            .write()
            .await
            .remove(&(agent.clone(), topic.clone()));
    }

    /// Invoke every handler subscribed to exactly `topic`, one receipt per
    /// subscriber (ordered by subscriber name). A failing handler is
    /// reported in its own receipt and does not stop the others.
    ///
    /// Each subscriber's handler gets its own message, addressed to that
    /// subscriber and tagged with the topic in its metadata.
    pub async fn publish_to_topic(
        &self,
        sender: &AgentId,
        topic: &Topic,
        content: &str,
        metadata: Option<MessageMetadata>,
    ) -> Vec<DeliveryReceipt> {
        let mut subscribers: Vec<(AgentId, TopicHandler)> = self
            .subscriptions
            .read()
            .await
            .iter()
            .filter(|((_, t), _)| t == topic)
            .map(|((agent, _), handler)| (agent.clone(), Arc::clone(handler)))
            .collect();
        subscribers.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

        let mut receipts = Vec::new();
        for (agent, handler) in subscribers {
            let message = build_message(sender, &agent, content, metadata.clone())
                .with_metadata(TOPIC_KEY, topic.as_str());
            match handler(message).await {
                Ok(()) => receipts.push(DeliveryReceipt::delivered(
                    format!("published '{topic}' to '{agent}'"),
                    None,
                )),
                Err(err) => {
                    warn!(agent = %agent, topic = %topic, error = %err, "topic handler failed");
                    receipts.push(DeliveryReceipt::failed(
                        format!("handler for '{agent}' on '{topic}' failed"),
                        err.to_string(),
                    ));
                }
            }
        }
        receipts
    }

    /// The most recent `limit` messages of the named agent's own history,
    /// oldest first. Unknown agents and endpoints without a history yield
    /// an empty sequence.
    pub async fn get_message_history(&self, name: &AgentId, limit: usize) -> Vec<Message> {
        let endpoint = self.endpoints.read().await.get(name).cloned();
        let Some(endpoint) = endpoint else {
            return Vec::new();
        };
        let history = endpoint.history().await;
        let start = history.len().saturating_sub(limit);
        history[start..].to_vec()
    }

    /// Drain the pending queue cooperatively, returning how many messages
    /// were processed.
    ///
    /// Each message goes to the handler subscribed at
    /// `(recipient, topic-from-metadata-or-default)` when one exists
    /// (handler failures are logged, not propagated), otherwise straight to
    /// the recipient's `receive`. The loop yields after every message and
    /// stops once the queue is empty; it never blocks waiting for new
    /// arrivals, so schedulers must re-invoke it to pick up later traffic.
    pub async fn drain_queue(&self) -> usize {
        let mut drained = 0;
        loop {
            let Some(message) = self.pending.write().await.pop_front() else {
                break;
            };

            let handler = match Topic::parse(message.topic()) {
                Ok(topic) => self
                    .subscriptions
                    .read()
                    .await
                    .get(&(message.recipient.clone(), topic))
                    .cloned(),
                // An unparseable topic can never have been subscribed to.
                Err(_) => None,
            };

            if let Some(handler) = handler {
                if let Err(err) = handler(message).await {
                    warn!(error = %err, "queued message handler failed");
                }
            } else {
                let endpoint = self.endpoints.read().await.get(&message.recipient).cloned();
                match endpoint {
                    Some(endpoint) => endpoint.receive(message).await,
                    None => {
                        warn!(recipient = %message.recipient, "dropping queued message for unknown agent")
                    }
                }
            }

            drained += 1;
            tokio::task::yield_now().await;
        }
        if drained > 0 {
            debug!(drained, "pending queue drained");
        }
        drained
    }
}

fn build_message(
    sender: &AgentId,
    recipient: &AgentId,
    content: impl Into<String>,
    metadata: Option<MessageMetadata>,
) -> Message {
    let message = Message::new(sender.clone(), recipient.clone(), content);
    match metadata {
        Some(metadata) => message.with_metadata_map(metadata),
        None => message,
    }
}

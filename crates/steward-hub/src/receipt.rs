//! Delivery outcome reporting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one delivery attempt.
///
/// A receipt is returned for every addressed recipient of a send,
/// broadcast, or publish; failed deliveries carry an error description
/// instead of data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Whether the delivery succeeded.
    pub success: bool,
    /// Human-readable outcome summary.
    pub detail: String,
    /// Extra payload on success (for example the message id).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// What went wrong, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryReceipt {
    /// Build a success receipt.
    pub fn delivered(detail: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            detail: detail.into(),
            data,
            error: None,
        }
    }

    /// Build a failure receipt.
    pub fn failed(detail: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            detail: detail.into(),
            data: None,
            error: Some(error.into()),
        }
    }
}

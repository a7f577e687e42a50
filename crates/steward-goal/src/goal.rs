//! Goal record and lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle status of a tracked goal.
///
/// No legality constraints are placed on transitions: any status may follow
/// any other. The three terminal states only determine membership in the
/// active index, not whether further updates are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl GoalStatus {
    /// Whether this status removes the goal from the active index.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{label}")
    }
}

/// Free-form metadata attached to a goal.
pub type GoalMetadata = HashMap<String, serde_json::Value>;

/// A tracked intent with lifecycle state.
///
/// `completed_at` is set exactly once, on the first transition to
/// [`GoalStatus::Completed`], and never cleared by later transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Caller-assigned unique key. Creating a goal with an existing id
    /// overwrites the previous entry.
    pub id: String,
    /// Human-readable description of the intent.
    pub description: String,
    /// Current lifecycle status.
    pub status: GoalStatus,
    /// When the goal was created.
    pub created_at: DateTime<Utc>,
    /// When the goal first transitioned to Completed, if ever.
    pub completed_at: Option<DateTime<Utc>>,
    /// Optional deadline used for progress estimation and expiry alerts.
    pub deadline: Option<DateTime<Utc>>,
    /// Free-form metadata.
    #[serde(default)]
    pub metadata: GoalMetadata,
    /// Owned sub-goals, in order.
    #[serde(default)]
    pub subgoals: Vec<Goal>,
}

impl Goal {
    /// Create a new pending goal with no deadline or metadata.
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status: GoalStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
            deadline: None,
            metadata: HashMap::new(),
            subgoals: Vec::new(),
        }
    }

    /// Attach a deadline.
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: GoalMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Whether the goal's deadline has passed. Goals without a deadline
    /// never expire.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Deterministic variant of [`Goal::is_expired`] for a given instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }
}

//! # Steward Goal
//!
//! Goal lifecycle tracking for the Steward orchestration kernel.
//!
//! A [`Goal`] is a tracked intent with a lifecycle status, an optional
//! deadline, and optional owned sub-goals. The [`GoalTracker`] owns the goal
//! table and the insertion-ordered active index, computes time-based
//! progress estimates, and raises [`GoalAlert`]s for goals that expired or
//! stalled.
//!
//! ## Example
//!
//! ```
//! use steward_goal::{GoalStatus, GoalTracker};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let tracker = GoalTracker::new();
//! tracker
//!     .create_goal("ticket-42", "resolve billing dispute", None, None)
//!     .await;
//! tracker
//!     .update_goal_status("ticket-42", GoalStatus::InProgress)
//!     .await;
//! assert_eq!(tracker.get_goal_progress("ticket-42").await, 0.5);
//! # }
//! ```

pub mod goal;
pub mod tracker;

pub use goal::{Goal, GoalMetadata, GoalStatus};
pub use tracker::{AlertKind, GoalAlert, GoalTracker};

//! The goal table, active index, and monitoring loop.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::goal::{Goal, GoalMetadata, GoalStatus};

/// Progress reported for a live goal without a deadline: in progress,
/// magnitude unknown.
const UNKNOWN_PROGRESS: f64 = 0.5;

/// Below this progress a goal older than [`SLOW_PROGRESS_AGE_SECS`] is
/// flagged as slow.
const SLOW_PROGRESS_THRESHOLD: f64 = 0.10;

/// Age after which slow progress starts being flagged (one hour).
const SLOW_PROGRESS_AGE_SECS: i64 = 3600;

/// What a monitoring alert is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The goal's deadline has passed and it is not completed.
    Expiration,
    /// The goal is over an hour old with progress below 10%.
    SlowProgress,
}

/// Alert raised by [`GoalTracker::monitor_goals`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAlert {
    /// Id of the goal the alert concerns.
    pub goal_id: String,
    /// Human-readable alert text.
    pub message: String,
    /// Alert category.
    pub kind: AlertKind,
}

/// Owns the goal table and the insertion-ordered active index.
///
/// Cheap to clone; clones share the same underlying tables. All methods
/// take `&self` and guard each table with its own lock.
#[derive(Clone, Default)]
pub struct GoalTracker {
    goals: Arc<RwLock<HashMap<String, Goal>>>,
    active: Arc<RwLock<Vec<String>>>,
}

impl GoalTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new goal, overwriting any previous goal with the same id.
    ///
    /// Duplicate ids are not an error: callers own id uniqueness, and the
    /// newest entry wins. The goal joins the active index because it starts
    /// out pending.
    pub async fn create_goal(
        &self,
        id: impl Into<String>,
        description: impl Into<String>,
        deadline: Option<DateTime<Utc>>,
        metadata: Option<GoalMetadata>,
    ) -> Goal {
        let mut goal = Goal::new(id, description);
        goal.deadline = deadline;
        if let Some(metadata) = metadata {
            goal.metadata = metadata;
        }

        let mut goals = self.goals.write().await;
        let mut active = self.active.write().await;
        if goal.status == GoalStatus::Pending && !active.iter().any(|g| *g == goal.id) {
            active.push(goal.id.clone());
        }
        debug!(goal_id = %goal.id, "tracking goal");
        goals.insert(goal.id.clone(), goal.clone());
        goal
    }

    /// Update a goal's status.
    ///
    /// Unknown ids are silently ignored. The completed timestamp is set on
    /// the first transition to Completed and kept through any later
    /// transitions. Terminal statuses remove the goal from the active
    /// index; other non-pending statuses (re-)add it if absent.
    pub async fn update_goal_status(&self, id: &str, status: GoalStatus) {
        let mut goals = self.goals.write().await;
        let Some(goal) = goals.get_mut(id) else {
            return;
        };
        goal.status = status;
        if status == GoalStatus::Completed && goal.completed_at.is_none() {
            goal.completed_at = Some(Utc::now());
        }
        drop(goals);

        let mut active = self.active.write().await;
        if status.is_terminal() {
            active.retain(|g| g != id);
        } else if status != GoalStatus::Pending && !active.iter().any(|g| g == id) {
            active.push(id.to_string());
        }
    }

    /// Look up a single goal by id.
    pub async fn get_goal(&self, id: &str) -> Option<Goal> {
        self.goals.read().await.get(id).cloned()
    }

    /// All live goals, in active-index insertion order.
    pub async fn get_active_goals(&self) -> Vec<Goal> {
        let active = self.active.read().await.clone();
        let goals = self.goals.read().await;
        active.iter().filter_map(|id| goals.get(id).cloned()).collect()
    }

    /// Progress estimate in `[0, 1]` for the given goal.
    ///
    /// Completed goals report 1.0; failed, cancelled, and unknown goals
    /// report 0.0. Live goals with a deadline report elapsed time over
    /// total duration, clamped to `[0, 1]`; live goals without one report
    /// the 0.5 sentinel.
    pub async fn get_goal_progress(&self, id: &str) -> f64 {
        self.goal_progress_at(id, Utc::now()).await
    }

    /// Deterministic variant of [`GoalTracker::get_goal_progress`] for a
    /// given instant.
    pub async fn goal_progress_at(&self, id: &str, now: DateTime<Utc>) -> f64 {
        let goals = self.goals.read().await;
        goals.get(id).map_or(0.0, |goal| progress_at(goal, now))
    }

    /// Scan the active index and report goals needing attention.
    ///
    /// A goal past its deadline (and not completed) raises an expiration
    /// alert; a goal older than an hour with progress below 10% raises a
    /// slow-progress alert. One goal may raise both in the same scan.
    pub async fn monitor_goals(&self) -> Vec<GoalAlert> {
        self.monitor_goals_at(Utc::now()).await
    }

    /// Deterministic variant of [`GoalTracker::monitor_goals`] for a given
    /// instant.
    pub async fn monitor_goals_at(&self, now: DateTime<Utc>) -> Vec<GoalAlert> {
        let active = self.active.read().await.clone();
        let goals = self.goals.read().await;

        let mut alerts = Vec::new();
        for id in &active {
            let Some(goal) = goals.get(id) else {
                continue;
            };
            if goal.is_expired_at(now) && goal.status != GoalStatus::Completed {
                warn!(goal_id = %goal.id, "goal deadline passed");
                alerts.push(GoalAlert {
                    goal_id: goal.id.clone(),
                    message: format!("Goal \"{}\" has expired", goal.description),
                    kind: AlertKind::Expiration,
                });
            }
            let age = now - goal.created_at;
            if age > Duration::seconds(SLOW_PROGRESS_AGE_SECS)
                && progress_at(goal, now) < SLOW_PROGRESS_THRESHOLD
            {
                warn!(goal_id = %goal.id, "goal progress is too slow");
                alerts.push(GoalAlert {
                    goal_id: goal.id.clone(),
                    message: format!("Goal \"{}\" progress is too slow", goal.description),
                    kind: AlertKind::SlowProgress,
                });
            }
        }
        alerts
    }
}

fn progress_at(goal: &Goal, now: DateTime<Utc>) -> f64 {
    match goal.status {
        GoalStatus::Completed => 1.0,
        GoalStatus::Failed | GoalStatus::Cancelled => 0.0,
        GoalStatus::Pending | GoalStatus::InProgress => match goal.deadline {
            Some(deadline) => {
                let total = (deadline - goal.created_at).num_milliseconds() as f64;
                if total <= 0.0 {
                    return 0.0;
                }
                let elapsed = (now - goal.created_at).num_milliseconds() as f64;
                (elapsed / total).clamp(0.0, 1.0)
            }
            None => UNKNOWN_PROGRESS,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn active_index_tracks_lifecycle() {
        let tracker = GoalTracker::new();
        tracker.create_goal("g1", "first", None, None).await;
        tracker.create_goal("g2", "second", None, None).await;
        tracker.create_goal("g3", "third", None, None).await;

        tracker.update_goal_status("g2", GoalStatus::Completed).await;

        let active: Vec<String> = tracker
            .get_active_goals()
            .await
            .into_iter()
            .map(|g| g.id)
            .collect();
        assert_eq!(active, vec!["g1", "g3"]);
    }

    #[tokio::test]
    async fn terminal_goals_never_linger_in_active_index() {
        let tracker = GoalTracker::new();
        tracker.create_goal("g1", "x", None, None).await;
        tracker.update_goal_status("g1", GoalStatus::Failed).await;
        assert!(tracker.get_active_goals().await.is_empty());

        tracker.create_goal("g2", "y", None, None).await;
        tracker.update_goal_status("g2", GoalStatus::Cancelled).await;
        assert!(tracker.get_active_goals().await.is_empty());
    }

    #[tokio::test]
    async fn reopened_goal_rejoins_active_index_once() {
        let tracker = GoalTracker::new();
        tracker.create_goal("g1", "x", None, None).await;
        tracker.update_goal_status("g1", GoalStatus::Completed).await;
        tracker.update_goal_status("g1", GoalStatus::InProgress).await;
        tracker.update_goal_status("g1", GoalStatus::InProgress).await;

        let active = tracker.get_active_goals().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "g1");
    }

    #[tokio::test]
    async fn completed_at_is_set_exactly_once() {
        let tracker = GoalTracker::new();
        tracker.create_goal("g1", "x", None, None).await;

        tracker.update_goal_status("g1", GoalStatus::Completed).await;
        let first = tracker.get_goal("g1").await.unwrap().completed_at;
        assert!(first.is_some());

        tracker.update_goal_status("g1", GoalStatus::InProgress).await;
        let reopened = tracker.get_goal("g1").await.unwrap();
        assert_eq!(reopened.completed_at, first);

        tracker.update_goal_status("g1", GoalStatus::Completed).await;
        assert_eq!(tracker.get_goal("g1").await.unwrap().completed_at, first);
    }

    #[tokio::test]
    async fn unknown_goal_updates_are_ignored() {
        let tracker = GoalTracker::new();
        tracker.update_goal_status("missing", GoalStatus::Completed).await;
        assert!(tracker.get_goal("missing").await.is_none());
        assert_eq!(tracker.get_goal_progress("missing").await, 0.0);
    }

    #[tokio::test]
    async fn duplicate_id_overwrites_previous_goal() {
        let tracker = GoalTracker::new();
        tracker.create_goal("g1", "old intent", None, None).await;
        tracker.update_goal_status("g1", GoalStatus::InProgress).await;
        tracker.create_goal("g1", "new intent", None, None).await;

        let goal = tracker.get_goal("g1").await.unwrap();
        assert_eq!(goal.description, "new intent");
        assert_eq!(goal.status, GoalStatus::Pending);

        // The overwrite must not duplicate the active-index entry.
        let active = tracker.get_active_goals().await;
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn progress_is_exact_for_settled_goals() {
        let tracker = GoalTracker::new();
        tracker.create_goal("done", "x", None, None).await;
        tracker.create_goal("failed", "x", None, None).await;
        tracker.create_goal("cancelled", "x", None, None).await;
        tracker.update_goal_status("done", GoalStatus::Completed).await;
        tracker.update_goal_status("failed", GoalStatus::Failed).await;
        tracker
            .update_goal_status("cancelled", GoalStatus::Cancelled)
            .await;

        assert_eq!(tracker.get_goal_progress("done").await, 1.0);
        assert_eq!(tracker.get_goal_progress("failed").await, 0.0);
        assert_eq!(tracker.get_goal_progress("cancelled").await, 0.0);
    }

    #[tokio::test]
    async fn progress_without_deadline_is_the_sentinel() {
        let tracker = GoalTracker::new();
        tracker.create_goal("g1", "x", None, None).await;
        assert_eq!(tracker.get_goal_progress("g1").await, UNKNOWN_PROGRESS);
    }

    #[tokio::test]
    async fn progress_with_deadline_is_a_clamped_time_ratio() {
        let tracker = GoalTracker::new();
        let goal = tracker
            .create_goal("g1", "x", Some(Utc::now() + Duration::hours(10)), None)
            .await;

        let quarter = goal.created_at + Duration::hours(2) + Duration::minutes(30);
        let progress = tracker.goal_progress_at("g1", quarter).await;
        assert!((progress - 0.25).abs() < 0.01);

        // Past the deadline the ratio clamps to 1.0.
        let late = goal.created_at + Duration::hours(20);
        assert_eq!(tracker.goal_progress_at("g1", late).await, 1.0);
    }

    #[tokio::test]
    async fn monitor_flags_expired_goals_immediately() {
        let tracker = GoalTracker::new();
        tracker
            .create_goal(
                "g1",
                "desc",
                Some(Utc::now() - Duration::seconds(1)),
                None,
            )
            .await;

        let alerts = tracker.monitor_goals().await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Expiration);
        assert_eq!(alerts[0].goal_id, "g1");
    }

    #[tokio::test]
    async fn monitor_flags_slow_goals_after_an_hour() {
        let tracker = GoalTracker::new();
        let goal = tracker
            .create_goal("g1", "x", Some(Utc::now() + Duration::hours(100)), None)
            .await;

        // Two hours in, progress is ~0.02: old enough and slow enough.
        let later = goal.created_at + Duration::hours(2);
        let alerts = tracker.monitor_goals_at(later).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::SlowProgress);
    }

    #[tokio::test]
    async fn one_goal_can_raise_both_alerts() {
        let tracker = GoalTracker::new();
        // A deadline that predates creation pins progress at 0.0, so an old
        // enough goal is both expired and slow.
        let goal = tracker
            .create_goal("g1", "x", Some(Utc::now() - Duration::minutes(5)), None)
            .await;

        let later = goal.created_at + Duration::hours(2);
        let alerts = tracker.monitor_goals_at(later).await;
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::Expiration));
        assert!(alerts.iter().any(|a| a.kind == AlertKind::SlowProgress));
    }

    #[tokio::test]
    async fn fresh_goals_raise_no_alerts() {
        let tracker = GoalTracker::new();
        tracker
            .create_goal("g1", "x", Some(Utc::now() + Duration::hours(1)), None)
            .await;
        assert!(tracker.monitor_goals().await.is_empty());
    }
}

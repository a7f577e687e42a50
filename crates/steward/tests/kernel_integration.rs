//! End-to-end scenarios across the three kernel components.

use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use steward::{
    AgentEndpoint, AgentId, CommunicationHub, Fault, FaultContext, FaultKind, GoalStatus,
    GoalTracker, RecordingEndpoint, RecoveryConfig, RecoveryEngine, RecoveryError,
    RecoveryStrategy, Topic,
};

#[tokio::test]
async fn register_two_agents_and_exchange_a_message() {
    let hub = CommunicationHub::new();
    let a = RecordingEndpoint::new("A");
    let b = RecordingEndpoint::new("B");
    hub.register_agent(AgentId::from("A"), Arc::new(a)).await;
    hub.register_agent(AgentId::from("B"), Arc::new(b.clone())).await;

    let receipt = hub
        .send_message(&AgentId::from("A"), &AgentId::from("B"), "hello", None)
        .await;

    assert!(receipt.success);
    let history = b.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "hello");
}

#[tokio::test]
async fn expired_goal_is_flagged_on_the_next_monitor_pass() {
    let tracker = GoalTracker::new();
    tracker
        .create_goal("g1", "desc", Some(Utc::now() - Duration::seconds(1)), None)
        .await;

    let alerts = tracker.monitor_goals().await;
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].goal_id, "g1");
    assert_eq!(alerts[0].kind, steward::AlertKind::Expiration);
}

#[tokio::test(start_paused = true)]
async fn a_flaky_operation_is_retried_while_its_goal_stays_open() {
    let tracker = GoalTracker::new();
    let engine = RecoveryEngine::new();

    tracker
        .create_goal("lookup-42", "fetch order status", None, None)
        .await;
    tracker
        .update_goal_status("lookup-42", GoalStatus::InProgress)
        .await;

    let fault = Fault::new(FaultKind::Connection, "order service unreachable");
    let record = engine.handle_exception(&fault, FaultContext::new()).await;
    assert_eq!(record.strategy, RecoveryStrategy::Retry);

    let calls = Arc::new(AtomicU32::new(0));
    let config = RecoveryConfig::default()
        .with_backoff_unit(std::time::Duration::from_millis(50));
    let outcome = engine
        .apply_recovery_strategy(
            &record,
            || {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(Fault::new(FaultKind::Connection, "still unreachable"))
                    } else {
                        Ok(json!({"order": 42, "status": "shipped"}))
                    }
                }
            },
            &config,
        )
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(outcome, Some(json!({"order": 42, "status": "shipped"})));

    tracker
        .update_goal_status("lookup-42", GoalStatus::Completed)
        .await;
    assert!(tracker.get_active_goals().await.is_empty());
    assert_eq!(tracker.get_goal_progress("lookup-42").await, 1.0);
}

#[tokio::test]
async fn an_escalated_fault_reaches_the_user_as_an_apology() {
    let engine = RecoveryEngine::new();
    let fault = Fault::new(FaultKind::Business, "refund exceeds remaining balance");
    let record = engine.handle_exception(&fault, FaultContext::new()).await;

    let result = engine
        .apply_recovery_strategy(
            &record,
            || async { Ok(json!(null)) },
            &RecoveryConfig::default(),
        )
        .await;
    assert!(matches!(result, Err(RecoveryError::Escalated { .. })));

    let user_text = record.user_facing_message();
    assert!(user_text.contains("escalate"));
    assert!(!user_text.contains("refund exceeds"));
}

#[tokio::test]
async fn broadcast_fans_out_and_the_queue_drains_once() {
    let hub = CommunicationHub::new();
    let names = ["triage", "billing", "escalation"];
    let mut endpoints = Vec::new();
    for name in names {
        let endpoint = RecordingEndpoint::new(name);
        hub.register_agent(AgentId::from(name), Arc::new(endpoint.clone()))
            .await;
        endpoints.push(endpoint);
    }

    let receipts = hub
        .broadcast_message(
            &AgentId::from("triage"),
            "new ticket",
            None,
            &[AgentId::from("triage")],
        )
        .await;
    assert_eq!(receipts.len(), 2);

    hub.enqueue_message(
        &AgentId::from("triage"),
        &AgentId::from("billing"),
        "follow-up",
        None,
    )
    .await;
    assert_eq!(hub.drain_queue().await, 1);
    assert_eq!(hub.drain_queue().await, 0);

    // billing: one broadcast + one drained follow-up.
    assert_eq!(endpoints[1].received_count().await, 2);
}

#[tokio::test]
async fn topic_publish_notifies_only_exact_subscribers() {
    let hub = CommunicationHub::new();
    let analytics = RecordingEndpoint::new("analytics");
    hub.register_agent(AgentId::from("analytics"), Arc::new(analytics.clone()))
        .await;

    let sink = analytics.clone();
    hub.subscribe_to_topic(
        AgentId::from("analytics"),
        Topic::from("goal.completed"),
        move |message| {
            let sink = sink.clone();
            async move {
                sink.receive(message).await;
                Ok(())
            }
        },
    )
    .await;

    let receipts = hub
        .publish_to_topic(
            &AgentId::from("tracker"),
            &Topic::from("goal.completed"),
            "lookup-42 done",
            None,
        )
        .await;
    assert_eq!(receipts.len(), 1);
    assert!(receipts[0].success);

    let seen = analytics.history().await;
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].topic(), "goal.completed");
}

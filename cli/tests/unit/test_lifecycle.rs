//! start / stop / restart and run-state preconditions

use unms_cli::errors::CliError;

use crate::support::{FakeConntrack, Harness};

#[tokio::test]
async fn test_start_resets_conntrack_then_brings_up_primary_services() {
    let mut h = Harness::new();
    h.run(&["start"]).await.unwrap();

    assert_eq!(*h.conntrack.flushed.lock().unwrap(), vec![2055]);
    assert_eq!(h.orchestrator.calls(), vec!["up unms nginx"]);
    assert!(h.output().contains("UNMS started."));
}

#[tokio::test]
async fn test_start_tolerates_conntrack_failure() {
    let mut h = Harness::new();
    h.conntrack = FakeConntrack {
        fail: true,
        ..Default::default()
    };
    h.run(&["start"]).await.unwrap();
    assert_eq!(h.orchestrator.calls(), vec!["up unms nginx"]);
}

#[tokio::test]
async fn test_clear_conntrack_reports_failure() {
    let mut h = Harness::new();
    h.conntrack = FakeConntrack {
        fail: true,
        ..Default::default()
    };
    let result = h.run(&["clear-conntrack"]).await;
    assert!(matches!(result, Err(CliError::AdapterError { .. })));
}

#[tokio::test]
async fn test_stop_prints_data_removal_reminder() {
    let mut h = Harness::running();
    h.run(&["stop"]).await.unwrap();

    assert_eq!(h.orchestrator.calls(), vec!["down"]);
    let out = h.output();
    assert!(out.contains(&h.ctx.app_dir.display().to_string()));
    assert!(out.contains(&h.ctx.data_dir.display().to_string()));
}

#[tokio::test]
async fn test_restart_stops_only_when_running() {
    let mut h = Harness::running();
    h.run(&["restart"]).await.unwrap();
    assert_eq!(h.orchestrator.calls(), vec!["down", "up unms nginx"]);

    let mut h = Harness::new();
    h.run(&["restart"]).await.unwrap();
    assert_eq!(h.orchestrator.calls(), vec!["up unms nginx"]);
}

#[tokio::test]
async fn test_running_precondition_fails_fast_with_remedy() {
    let mut h = Harness::new();
    let err = h.run(&["ip-whitelist", "--show"]).await.unwrap_err();

    match err {
        CliError::PreconditionError { remedy, .. } => assert!(remedy.contains("unms-cli start")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(h.orchestrator.calls().is_empty());
}

#[tokio::test]
async fn test_fix_redis_requires_stopped() {
    let mut h = Harness::running();
    let err = h.run(&["fix-redis-aof"]).await.unwrap_err();
    assert!(matches!(err, CliError::PreconditionError { .. }));
    assert!(h.orchestrator.calls().is_empty());
}

#[tokio::test]
async fn test_fix_redis_feeds_confirmation_to_repair_container() {
    let mut h = Harness::new();
    h.run(&["fix-redis-aof"]).await.unwrap();

    assert_eq!(
        h.orchestrator.calls(),
        vec!["run redis redis-check-aof --fix /data/appendonly.aof"]
    );
    assert_eq!(h.orchestrator.state.lock().unwrap().fed, vec!["y\n"]);
}

#[tokio::test]
async fn test_rewrite_redis_requires_running() {
    let mut h = Harness::new();
    assert!(h.run(&["rewrite-redis-aof"]).await.is_err());

    let mut h = Harness::running();
    h.run(&["rewrite-redis-aof"]).await.unwrap();
    assert_eq!(h.orchestrator.calls(), vec!["exec redis redis-cli BGREWRITEAOF"]);
}

#[tokio::test]
async fn test_usage_error_has_no_side_effects() {
    let mut h = Harness::running();
    let err = h.run(&["stop", "--now"]).await.unwrap_err();
    assert!(matches!(err, CliError::UsageError(_)));
    assert!(h.orchestrator.calls().is_empty());
}

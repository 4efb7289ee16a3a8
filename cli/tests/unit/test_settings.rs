//! Mirrored settings: set-workers, ucrm, ip-whitelist

use serde_json::json;
use unms_cli::config::conf_file::lookup;
use unms_cli::errors::CliError;

use crate::support::{Harness, CONFIG, DESCRIPTOR};

#[tokio::test]
async fn test_set_workers_persists_to_both_files() {
    for count in ["1", "2", "3", "4", "5", "6", "7", "8", "auto"] {
        let mut h = Harness::new();
        h.run(&["set-workers", count]).await.unwrap();

        assert_eq!(lookup(&h.config(), "WORKERS").as_deref(), Some(count));
        assert!(h.descriptor().contains(&format!("      - WORKERS={}\n", count)));
        assert!(h.output().contains("Restart UNMS"));
        assert!(h.database.settings.lock().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_set_workers_rejects_invalid_counts_without_writing() {
    for count in ["0", "9", "12", "-1", "many", "Auto"] {
        let mut h = Harness::new();
        let err = h.run(&["set-workers", count]).await.unwrap_err();
        assert!(matches!(err, CliError::UsageError(_)), "{} accepted", count);
        assert_eq!(h.config(), CONFIG);
        assert_eq!(h.descriptor(), DESCRIPTOR);
    }
}

#[tokio::test]
async fn test_set_workers_reports_old_and_new() {
    let mut h = Harness::new();
    h.run(&["set-workers", "4"]).await.unwrap();
    assert!(h.take_output().contains("auto -> 4"));
    h.run(&["set-workers", "2"]).await.unwrap();
    assert!(h.output().contains("4 -> 2"));
}

#[tokio::test]
async fn test_config_write_is_idempotent() {
    let mut h = Harness::new();
    h.run(&["set-workers", "3"]).await.unwrap();
    h.run(&["set-workers", "3"]).await.unwrap();
    assert_eq!(h.config().matches("WORKERS=").count(), 1);
}

#[tokio::test]
async fn test_ucrm_enable_then_disable() {
    let mut h = Harness::running();
    h.run(&["ucrm", "--enable"]).await.unwrap();
    assert!(h.take_output().contains("UCRM is enabled."));
    assert_eq!(h.database.setting("ucrmEnabled"), Some(json!(true)));

    h.run(&["ucrm", "--disable"]).await.unwrap();
    assert!(h.output().contains("UCRM is disabled."));
    assert_eq!(lookup(&h.config(), "UCRM_ENABLED").as_deref(), Some("false"));
    assert!(h.descriptor().contains("- UCRM_ENABLED=false\n"));
    assert_eq!(h.database.setting("ucrmEnabled"), Some(json!(false)));
}

#[tokio::test]
async fn test_ucrm_without_flags_is_read_only() {
    let mut h = Harness::new();
    h.run(&["ucrm"]).await.unwrap();

    let out = h.output();
    assert!(out.contains("UCRM is disabled."));
    assert!(!out.contains("Restart"));
    assert_eq!(h.config(), CONFIG);
    assert!(h.orchestrator.calls().is_empty());
}

#[tokio::test]
async fn test_ucrm_change_requires_running() {
    let mut h = Harness::new();
    let err = h.run(&["ucrm", "--enable"]).await.unwrap_err();
    assert!(matches!(err, CliError::PreconditionError { .. }));
    assert_eq!(h.config(), CONFIG);
}

#[tokio::test]
async fn test_ucrm_live_store_failure_leaves_files_untouched() {
    let mut h = Harness::running();
    h.database.unreachable = true;

    let err = h.run(&["ucrm", "--enable"]).await.unwrap_err();
    assert!(err.to_string().contains("ucrmEnabled"));
    assert_eq!(h.config(), CONFIG);
    assert_eq!(h.descriptor(), DESCRIPTOR);
}

#[tokio::test]
async fn test_missing_descriptor_entry_aborts_before_any_write() {
    let mut h = Harness::running();
    std::fs::write(h.ctx.descriptor_file().path(), "services: {}\n").unwrap();

    assert!(h.run(&["ucrm", "--enable"]).await.is_err());
    assert_eq!(h.config(), CONFIG);
    assert!(h.database.setting("ucrmEnabled").is_none());
}

#[tokio::test]
async fn test_ip_whitelist_set_then_show() {
    let mut h = Harness::running();
    h.run(&["ip-whitelist", "--set", "10.0.0.1,192.168.1.0/24"]).await.unwrap();
    h.take_output();

    h.run(&["ip-whitelist", "--show"]).await.unwrap();
    let out = h.output();
    assert!(out.contains("  10.0.0.1\n"));
    assert!(out.contains("  192.168.1.0/24\n"));

    assert_eq!(
        lookup(&h.config(), "IP_WHITELIST").as_deref(),
        Some("10.0.0.1,192.168.1.0/24")
    );
    assert_eq!(
        h.descriptor().matches("- IP_WHITELIST=10.0.0.1,192.168.1.0/24\n").count(),
        2
    );
}

#[tokio::test]
async fn test_ip_whitelist_clear_then_show() {
    let mut h = Harness::running();
    h.run(&["ip-whitelist", "--set", "10.0.0.1"]).await.unwrap();
    h.run(&["ip-whitelist", "--clear"]).await.unwrap();
    h.take_output();

    h.run(&["ip-whitelist", "--show"]).await.unwrap();
    assert!(h.output().contains("any address allowed"));
    assert_eq!(lookup(&h.config(), "IP_WHITELIST").as_deref(), Some(""));
}

#[tokio::test]
async fn test_ip_whitelist_rejects_invalid_list() {
    let mut h = Harness::running();
    let err = h.run(&["ip-whitelist", "--set", "10.0.0.1,not-an-ip"]).await.unwrap_err();
    assert!(matches!(err, CliError::UsageError(_)));
    assert!(h.orchestrator.calls().is_empty());
}

#[tokio::test]
async fn test_mirrored_write_keeps_file_modes() {
    use std::os::unix::fs::PermissionsExt;

    let mut h = Harness::new();
    let config = h.ctx.config_file().path().to_path_buf();
    let descriptor = h.ctx.descriptor_file().path().to_path_buf();
    std::fs::set_permissions(&config, std::fs::Permissions::from_mode(0o600)).unwrap();
    std::fs::set_permissions(&descriptor, std::fs::Permissions::from_mode(0o640)).unwrap();

    h.run(&["set-workers", "4"]).await.unwrap();

    let mode = |path: &std::path::Path| std::fs::metadata(path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&config), 0o600);
    assert_eq!(mode(&descriptor), 0o640);
    assert_eq!(lookup(&h.config(), "WORKERS").as_deref(), Some("4"));
}

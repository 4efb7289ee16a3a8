//! clear-device-backups retention and batching

use std::path::Path;
use std::time::{Duration, SystemTime};

use crate::support::Harness;

/// Create `count` backups for a device, file `i` being `i` minutes newer than
/// file 0, and register them in the fake index
fn seed(h: &Harness, device: &str, count: usize) -> std::path::PathBuf {
    let dir = h.ctx.device_backups_dir().path().join(device);
    std::fs::create_dir_all(&dir).unwrap();
    let base = SystemTime::now() - Duration::from_secs(86_400);

    let mut index = h.database.backup_index.lock().unwrap();
    for i in 0..count {
        let name = format!("backup-{:04}.tar.gz", i);
        let path = dir.join(&name);
        let file = std::fs::File::create(&path).unwrap();
        file.set_modified(base + Duration::from_secs(60 * i as u64)).unwrap();
        index.push(name);
    }
    dir
}

fn remaining(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_device_with_five_backups_is_untouched() {
    let mut h = Harness::running();
    let dir = seed(&h, "device-a", 5);

    h.run(&["clear-device-backups"]).await.unwrap();

    assert_eq!(remaining(&dir).len(), 5);
    assert!(h.database.delete_calls.lock().unwrap().is_empty());
    assert!(h.output().contains("Deleted 0 device backups in total."));
    assert!(!h.output().contains("Restart"));
}

#[tokio::test]
async fn test_six_backups_keeps_five_newest() {
    let mut h = Harness::running();
    let dir = seed(&h, "device-a", 6);

    h.run(&["clear-device-backups"]).await.unwrap();

    let left = remaining(&dir);
    assert_eq!(left.len(), 5);
    assert!(!left.contains(&"backup-0000.tar.gz".to_string()));
    assert_eq!(h.database.backup_index.lock().unwrap().len(), 5);
    assert!(h.output().contains("device-a: deleted 1 backups"));
}

#[tokio::test]
async fn test_large_backlog_is_deleted_in_batches() {
    let mut h = Harness::running();
    let dir = seed(&h, "device-a", 255);

    h.run(&["clear-device-backups"]).await.unwrap();

    assert_eq!(*h.database.delete_calls.lock().unwrap(), vec![100, 100, 50]);
    let left = remaining(&dir);
    assert_eq!(
        left,
        (250..255).map(|i| format!("backup-{:04}.tar.gz", i)).collect::<Vec<_>>()
    );
    assert!(h.output().contains("Deleted 250 device backups in total."));
}

#[tokio::test]
async fn test_devices_are_pruned_independently() {
    let mut h = Harness::running();
    let a = seed(&h, "device-a", 7);
    let b = seed(&h, "device-b", 3);

    h.run(&["clear-device-backups"]).await.unwrap();

    assert_eq!(remaining(&a).len(), 5);
    assert_eq!(remaining(&b).len(), 3);
    let out = h.output();
    assert!(out.contains("device-a: deleted 2 backups"));
    assert!(!out.contains("device-b:"));
    assert!(out.contains("Restart UNMS"));
}

#[tokio::test]
async fn test_missing_backup_root() {
    let mut h = Harness::running();
    h.run(&["clear-device-backups"]).await.unwrap();
    assert!(h.output().contains("No device backups found"));
}

#[tokio::test]
async fn test_requires_running() {
    let mut h = Harness::new();
    let dir = seed(&h, "device-a", 8);
    assert!(h.run(&["clear-device-backups"]).await.is_err());
    assert_eq!(remaining(&dir).len(), 8);
}

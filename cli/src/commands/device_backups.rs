//! clear-device-backups
//!
//! Each device directory keeps its newest backups; older files are removed
//! from disk together with their rows in the backup index.

use std::io::Write;
use std::time::SystemTime;

use tracing::{info, warn};

use crate::app::runtime::Runtime;
use crate::commands::restart_reminder;
use crate::errors::CliError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Backups kept per device
pub const RETAINED_PER_DEVICE: usize = 5;

/// Files deleted (and index ids sent) per round
pub const DELETE_BATCH_SIZE: usize = 100;

/// Backups removed for one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePrune {
    pub device: String,
    pub files_deleted: u64,
    pub rows_deleted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub devices: Vec<DevicePrune>,
}

impl PruneReport {
    pub fn files_deleted(&self) -> u64 {
        self.devices.iter().map(|d| d.files_deleted).sum()
    }

    pub fn rows_deleted(&self) -> u64 {
        self.devices.iter().map(|d| d.rows_deleted).sum()
    }
}

#[derive(Debug, Clone)]
struct BackupFile {
    file: File,
    id: String,
    modified: SystemTime,
}

impl BackupFile {
    /// Sort key: newer first, ties broken by name
    fn rank(&self) -> (SystemTime, &str) {
        (self.modified, self.id.as_str())
    }
}

pub async fn clear_device_backups(rt: &mut Runtime<'_>) -> Result<PruneReport, CliError> {
    let root = rt.ctx.device_backups_dir();
    let mut report = PruneReport::default();

    if !root.exists().await {
        writeln!(rt.out, "No device backups found in {}.", root.path().display())?;
        return Ok(report);
    }

    let mut device_dirs = root.list_dirs().await?;
    device_dirs.sort_by(|a, b| a.path().cmp(b.path()));

    for dir in device_dirs {
        if let Some(pruned) = prune_device(rt, &dir).await? {
            writeln!(
                rt.out,
                "{}: deleted {} backups",
                pruned.device, pruned.files_deleted
            )?;
            report.devices.push(pruned);
        }
    }

    let files = report.files_deleted();
    let rows = report.rows_deleted();
    writeln!(rt.out, "Deleted {} device backups in total.", files)?;
    if rows != files {
        warn!("Deleted {} files but {} index rows", files, rows);
    }
    if files > 0 {
        restart_reminder(rt)?;
    }
    Ok(report)
}

/// Prune one device directory. Directories holding no more than the retained
/// number of files are left alone.
async fn prune_device(rt: &mut Runtime<'_>, dir: &Dir) -> Result<Option<DevicePrune>, CliError> {
    let backups = list_backups(dir).await?;
    if backups.len() <= RETAINED_PER_DEVICE {
        return Ok(None);
    }

    let cutoff = &backups[RETAINED_PER_DEVICE - 1];
    let (cutoff_modified, cutoff_id) = (cutoff.modified, cutoff.id.clone());
    let device = dir
        .path()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!("Pruning backups of device {} older than {}", device, cutoff_id);

    let mut pruned = DevicePrune {
        device,
        files_deleted: 0,
        rows_deleted: 0,
    };

    loop {
        let batch: Vec<BackupFile> = list_backups(dir)
            .await?
            .into_iter()
            .filter(|b| b.rank() < (cutoff_modified, cutoff_id.as_str()))
            .take(DELETE_BATCH_SIZE)
            .collect();
        if batch.is_empty() {
            break;
        }

        for backup in &batch {
            backup.file.delete().await?;
        }
        let ids: Vec<String> = batch.into_iter().map(|b| b.id).collect();
        pruned.rows_deleted += rt.database.delete_device_backups(&ids).await?;
        pruned.files_deleted += ids.len() as u64;
    }

    Ok(Some(pruned))
}

/// Files in the directory, newest first
async fn list_backups(dir: &Dir) -> Result<Vec<BackupFile>, CliError> {
    let mut backups = Vec::new();
    for file in dir.list_files().await? {
        let Some(id) = file.name().map(str::to_string) else {
            continue;
        };
        let modified = file.modified().await?;
        backups.push(BackupFile { file, id, modified });
    }
    backups.sort_by(|a, b| b.rank().cmp(&a.rank()));
    Ok(backups)
}

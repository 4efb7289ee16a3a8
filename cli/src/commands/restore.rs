//! restore-backup

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use colored::Colorize;
use tracing::info;

use crate::app::context::Context;
use crate::app::runtime::Runtime;
use crate::commands::lifecycle::restart_services;
use crate::errors::CliError;
use crate::filesys::archive::extract_tar_gz;
use crate::filesys::file::File;
use crate::prompt::confirm::Confirmation;

/// Name endings of backup archives; anything else in the backups directory
/// (partial downloads, notes) is never picked implicitly
const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz"];

fn is_archive_name(name: &str) -> bool {
    ARCHIVE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// The explicitly named archive, or the last one by file name in the backups
/// directory. Archive names embed a sortable timestamp, so the last name is
/// taken to be the newest; the modification time is shown to the operator
/// before anything happens.
pub async fn resolve_archive(ctx: &Context, file: Option<&Path>) -> Result<File, CliError> {
    if let Some(path) = file {
        let archive = File::new(path);
        if !archive.is_regular().await {
            return Err(CliError::NotFound(format!(
                "backup file {} does not exist or is not a regular file",
                path.display()
            )));
        }
        return Ok(archive);
    }

    let dir = ctx.backups_dir();
    if !dir.exists().await {
        return Err(CliError::NotFound(format!("no backups in {}", dir.path().display())));
    }
    dir.list_files()
        .await?
        .into_iter()
        .filter(|f| f.name().is_some_and(is_archive_name))
        .max_by(|a, b| a.name().cmp(&b.name()))
        .ok_or_else(|| CliError::NotFound(format!("no backups in {}", dir.path().display())))
}

pub async fn restore_backup(rt: &mut Runtime<'_>, file: Option<&Path>) -> Result<File, CliError> {
    let archive = resolve_archive(rt.ctx, file).await?;
    let modified: DateTime<Local> = archive.modified().await?.into();
    writeln!(
        rt.out,
        "Backup: {} (modified {})",
        archive.path().display(),
        modified.format("%Y-%m-%d %H:%M:%S")
    )?;

    Confirmation::new("Restore this backup? Current UNMS data will be replaced and UNMS restarted.")
        .require(&mut *rt.input, &mut *rt.out)?;

    let scratch = rt.ctx.restore_dir();
    scratch.recreate().await?;
    extract_tar_gz(&archive, &scratch).await?;
    info!("Extracted {:?} into {:?}", archive.path(), scratch.path());

    writeln!(rt.out, "Restarting UNMS to apply the backup...")?;
    restart_services(rt).await?;
    writeln!(rt.out, "{}", "Backup restored.".green())?;
    Ok(archive)
}

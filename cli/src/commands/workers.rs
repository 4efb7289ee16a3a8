//! set-workers

use std::fmt;
use std::io::Write;

use crate::app::runtime::Runtime;
use crate::commands::restart_reminder;
use crate::config::conf_file::ConfigFile;
use crate::config::keys;
use crate::config::mirror::{write_mirrored, MirroredSetting};
use crate::errors::CliError;

pub const MAX_WORKERS: u8 = 8;

/// Application worker processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCount {
    Auto,
    Fixed(u8),
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerCount::Auto => write!(f, "auto"),
            WorkerCount::Fixed(n) => write!(f, "{}", n),
        }
    }
}

/// `auto` or an integer from 1 to 8
pub fn parse_worker_count(raw: &str) -> Result<WorkerCount, String> {
    if raw == "auto" {
        return Ok(WorkerCount::Auto);
    }
    match raw.as_bytes() {
        [digit @ b'1'..=b'8'] => Ok(WorkerCount::Fixed(digit - b'0')),
        _ => Err(format!(
            "expected a number from 1 to {} or 'auto'",
            MAX_WORKERS
        )),
    }
}

/// Persist the worker count to the config file and descriptor. It only takes
/// effect when the application processes are launched again.
pub async fn set_workers(
    rt: &mut Runtime<'_>,
    count: WorkerCount,
) -> Result<(String, String), CliError> {
    let old = ConfigFile::new(rt.ctx.config_file())
        .read(keys::WORKERS, keys::DEFAULT_WORKERS)
        .await?;
    let new = count.to_string();

    write_mirrored(rt.ctx, rt.database, &MirroredSetting::files(keys::WORKERS, new.clone())).await?;

    writeln!(rt.out, "Workers: {} -> {}", old, new)?;
    restart_reminder(rt)?;
    Ok((old, new))
}

//! start, stop, restart and clear-conntrack

use std::io::Write;

use colored::Colorize;
use tracing::{info, warn};

use crate::app::context::Context;
use crate::app::runtime::Runtime;
use crate::config::conf_file::ConfigFile;
use crate::config::keys;
use crate::deploy::services;
use crate::errors::CliError;

pub async fn start(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    start_services(rt).await?;
    writeln!(rt.out, "{}", "UNMS started.".green())?;
    Ok(())
}

pub async fn stop(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    rt.orchestrator.down().await?;
    writeln!(rt.out, "{}", "UNMS stopped.".green())?;
    writeln!(
        rt.out,
        "To remove all UNMS data, delete {} and {}",
        rt.ctx.app_dir.display(),
        rt.ctx.data_dir.display()
    )?;
    Ok(())
}

pub async fn restart(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    restart_services(rt).await?;
    writeln!(rt.out, "{}", "UNMS restarted.".green())?;
    Ok(())
}

pub async fn clear_conntrack(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    let port = netflow_port(rt.ctx).await?;
    rt.conntrack.flush_udp(port).await?;
    writeln!(rt.out, "Cleared UDP conntrack entries for port {}.", port)?;
    Ok(())
}

/// Stop when running, wait for the orchestrator to release resources, start
pub(crate) async fn restart_services(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    if rt.orchestrator.is_running().await? {
        rt.orchestrator.down().await?;
    }
    info!("Waiting {:?} before starting", rt.ctx.restart_delay);
    tokio::time::sleep(rt.ctx.restart_delay).await;
    start_services(rt).await
}

pub(crate) async fn start_services(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    let port = netflow_port(rt.ctx).await?;
    // Stale flows keep NetFlow packets pinned to a dead container
    if let Err(e) = rt.conntrack.flush_udp(port).await {
        warn!("Ignoring conntrack reset failure: {}", e);
    }
    rt.orchestrator.up(services::PRIMARY).await
}

pub(crate) async fn netflow_port(ctx: &Context) -> Result<u16, CliError> {
    let raw = ConfigFile::new(ctx.config_file())
        .read(keys::NETFLOW_PORT, keys::DEFAULT_NETFLOW_PORT)
        .await?;
    raw.trim().parse().map_err(|_| {
        CliError::ConfigError(format!("{} is not a valid port: {}", keys::NETFLOW_PORT, raw))
    })
}

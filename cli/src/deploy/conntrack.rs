//! Host connection-tracking table

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::CliError;

#[async_trait]
pub trait Conntrack: Send + Sync {
    /// Drop tracked UDP flows destined to `port`
    async fn flush_udp(&self, port: u16) -> Result<(), CliError>;
}

/// Runs the host `conntrack` utility
#[derive(Debug, Clone, Default)]
pub struct HostConntrack;

#[async_trait]
impl Conntrack for HostConntrack {
    async fn flush_udp(&self, port: u16) -> Result<(), CliError> {
        let operation = format!("clear conntrack entries for UDP port {}", port);
        debug!("conntrack -D -p udp --orig-port-dst {}", port);
        let status = Command::new("conntrack")
            .args(["-D", "-p", "udp", "--orig-port-dst", &port.to_string()])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| CliError::adapter(&operation, e))?;

        if !status.success() {
            return Err(CliError::adapter(operation, format!("exited with {}", status)));
        }
        Ok(())
    }
}

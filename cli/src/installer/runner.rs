//! Installer script execution

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use crate::errors::CliError;

#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Run `script` with `args`, attached to the operator's terminal
    async fn run(&self, script: &Path, args: &[String]) -> Result<(), CliError>;
}

/// Runs scripts with bash
#[derive(Debug, Clone, Default)]
pub struct BashRunner;

#[async_trait]
impl ScriptRunner for BashRunner {
    async fn run(&self, script: &Path, args: &[String]) -> Result<(), CliError> {
        let operation = format!("run {}", script.display());
        info!("Running {:?} {}", script, args.join(" "));
        let status = Command::new("bash")
            .arg(script)
            .args(args)
            .status()
            .await
            .map_err(|e| CliError::adapter(&operation, e))?;

        if !status.success() {
            return Err(CliError::adapter(operation, format!("exited with {}", status)));
        }
        Ok(())
    }
}

//! Run-state preconditions

use tracing::debug;

use crate::app::context::Context;
use crate::commands::Command;
use crate::deploy::orchestrator::Orchestrator;
use crate::errors::CliError;

/// Run state a command needs before it may act
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// At least one container must be active
    Running,

    /// No container may be active
    Stopped,

    /// Either state is acceptable
    Any,
}

impl Command {
    pub fn precondition(&self) -> Precondition {
        match self {
            Command::IpWhitelist(_)
            | Command::ClearDeviceBackups
            | Command::DisableTwoFactor(_)
            | Command::ReduceDeviceUpdateFrequency
            | Command::RefreshCertificate
            | Command::RewriteRedisAof
            | Command::SetPassword(_)
            | Command::SetSuperadmin(_) => Precondition::Running,

            // Changing UCRM writes the live settings store
            Command::Ucrm(args) if args.desired().is_some() => Precondition::Running,

            Command::FixRedisAof => Precondition::Stopped,

            Command::Start
            | Command::Stop
            | Command::Restart
            | Command::Ucrm(_)
            | Command::ClearConntrack
            | Command::RestoreBackup(_)
            | Command::SetWorkers(_)
            | Command::Update(_) => Precondition::Any,
        }
    }
}

/// Fail fast when the deployment is not in the required state. Never
/// starts or stops anything itself.
pub async fn check(
    precondition: Precondition,
    orchestrator: &dyn Orchestrator,
    ctx: &Context,
) -> Result<(), CliError> {
    if precondition == Precondition::Any {
        return Ok(());
    }

    let running = orchestrator.is_running().await?;
    debug!("Precondition {:?}, running={}", precondition, running);
    match (precondition, running) {
        (Precondition::Running, false) => Err(CliError::PreconditionError {
            message: "UNMS is not running.".to_string(),
            remedy: format!("Start it with: {}", ctx.hint("start")),
        }),
        (Precondition::Stopped, true) => Err(CliError::PreconditionError {
            message: "UNMS is running.".to_string(),
            remedy: format!("Stop it with: {}", ctx.hint("stop")),
        }),
        _ => Ok(()),
    }
}

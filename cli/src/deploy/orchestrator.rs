//! Orchestrator abstraction over the multi-service deployment

use async_trait::async_trait;

use crate::errors::CliError;

/// What a command run inside a service reads on stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecInput {
    /// No stdin; output is captured and returned
    None,

    /// The operator's terminal is attached; nothing is captured
    Inherit,

    /// Scripted stdin (e.g. an answer to a prompt); output is captured
    Feed(String),
}

/// Lifecycle and command execution against the named deployment.
///
/// Every call blocks until the underlying process exits and maps a non-zero
/// exit status to [`CliError::AdapterError`].
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// True iff at least one container of the deployment is active
    async fn is_running(&self) -> Result<bool, CliError>;

    /// Bring up the given services (and whatever they depend on)
    async fn up(&self, services: &[&str]) -> Result<(), CliError>;

    /// Tear down every service of the deployment
    async fn down(&self) -> Result<(), CliError>;

    /// Run a command inside a running service, returning captured stdout
    async fn exec(&self, service: &str, args: Vec<String>, input: ExecInput)
        -> Result<String, CliError>;

    /// Run a command in a fresh, throwaway container of the service
    async fn run_oneoff(
        &self,
        service: &str,
        args: Vec<String>,
        input: ExecInput,
    ) -> Result<String, CliError>;
}

/// Build an owned argument vector
pub fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

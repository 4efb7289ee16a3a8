//! Docker Compose orchestrator

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::deploy::orchestrator::{ExecInput, Orchestrator};
use crate::errors::CliError;

/// Which compose front-end is installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeProgram {
    /// `docker compose` (CLI plugin)
    Plugin,

    /// `docker-compose` (standalone binary)
    Standalone,
}

/// Orchestrator driving a compose project through the docker CLI. The
/// front-end is detected on first use, so commands that never reach the
/// orchestrator do not spawn docker at all.
#[derive(Debug, Clone)]
pub struct DockerCompose {
    project: String,
    descriptor: PathBuf,
    program: OnceCell<ComposeProgram>,
}

impl DockerCompose {
    pub fn new(project: impl Into<String>, descriptor: impl Into<PathBuf>) -> Self {
        Self {
            project: project.into(),
            descriptor: descriptor.into(),
            program: OnceCell::new(),
        }
    }

    /// Skip detection and use the given front-end
    pub fn with_program(
        project: impl Into<String>,
        descriptor: impl Into<PathBuf>,
        program: ComposeProgram,
    ) -> Self {
        Self {
            project: project.into(),
            descriptor: descriptor.into(),
            program: OnceCell::from(program),
        }
    }

    async fn program(&self) -> ComposeProgram {
        *self.program.get_or_init(detect_program).await
    }

    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    fn base_args(&self, program: ComposeProgram) -> Vec<String> {
        let mut args = Vec::new();
        if program == ComposeProgram::Plugin {
            args.push("compose".to_string());
        }
        args.extend([
            "-p".to_string(),
            self.project.clone(),
            "-f".to_string(),
            self.descriptor.display().to_string(),
        ]);
        args
    }

    /// `docker ps` arguments listing this project's running containers.
    /// Both front-ends label containers with the project name; compose's own
    /// `ps -q` also lists exited containers under docker-compose v1.
    fn running_args(&self) -> Vec<String> {
        vec![
            "ps".to_string(),
            "-q".to_string(),
            "--filter".to_string(),
            format!("label=com.docker.compose.project={}", self.project),
            "--filter".to_string(),
            "status=running".to_string(),
        ]
    }

    async fn run(&self, operation: &str, args: Vec<String>, input: ExecInput) -> Result<String, CliError> {
        let program = self.program().await;
        let binary = match program {
            ComposeProgram::Plugin => "docker",
            ComposeProgram::Standalone => "docker-compose",
        };
        debug!("{} {}", binary, args.join(" "));
        let mut cmd = Command::new(binary);
        cmd.args(self.base_args(program)).args(&args);
        spawn(operation, cmd, input).await
    }
}

/// Prefer `docker compose`, falling back to `docker-compose`
async fn detect_program() -> ComposeProgram {
    let plugin = Command::new("docker")
        .args(["compose", "version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false);

    if plugin {
        ComposeProgram::Plugin
    } else {
        debug!("'docker compose' unavailable, using docker-compose");
        ComposeProgram::Standalone
    }
}

/// Run `cmd` with the given stdin handling; captured stdout is returned
async fn spawn(operation: &str, mut cmd: Command, input: ExecInput) -> Result<String, CliError> {
    if input == ExecInput::Inherit {
        let status = cmd
            .status()
            .await
            .map_err(|e| CliError::adapter(operation, e))?;
        if !status.success() {
            return Err(CliError::adapter(operation, format!("exited with {}", status)));
        }
        return Ok(String::new());
    }

    let stdin = match input {
        ExecInput::Feed(_) => Stdio::piped(),
        _ => Stdio::null(),
    };
    let mut child = cmd
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| CliError::adapter(operation, e))?;

    if let ExecInput::Feed(text) = input {
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(text.as_bytes())
                .await
                .map_err(|e| CliError::adapter(operation, e))?;
        }
    }

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| CliError::adapter(operation, e))?;
    if !output.status.success() {
        return Err(CliError::adapter(operation, format!("exited with {}", output.status)));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl Orchestrator for DockerCompose {
    async fn is_running(&self) -> Result<bool, CliError> {
        let mut cmd = Command::new("docker");
        cmd.args(self.running_args());
        let out = spawn("list running containers", cmd, ExecInput::None).await?;
        Ok(out.lines().any(|line| !line.trim().is_empty()))
    }

    async fn up(&self, services: &[&str]) -> Result<(), CliError> {
        info!("Starting services: {}", services.join(", "));
        let mut args = vec!["up".to_string(), "-d".to_string()];
        args.extend(services.iter().map(|s| s.to_string()));
        self.run("start services", args, ExecInput::None).await?;
        Ok(())
    }

    async fn down(&self) -> Result<(), CliError> {
        info!("Stopping all services of project {}", self.project);
        self.run("stop services", vec!["down".into()], ExecInput::None)
            .await?;
        Ok(())
    }

    async fn exec(&self, service: &str, args: Vec<String>, input: ExecInput) -> Result<String, CliError> {
        let mut full = vec!["exec".to_string()];
        if input != ExecInput::Inherit {
            full.push("-T".to_string());
        }
        full.push(service.to_string());
        full.extend(args);
        self.run(&format!("exec in {}", service), full, input).await
    }

    async fn run_oneoff(
        &self,
        service: &str,
        args: Vec<String>,
        input: ExecInput,
    ) -> Result<String, CliError> {
        let mut full = vec!["run".to_string(), "--rm".to_string(), "--no-deps".to_string()];
        if input != ExecInput::Inherit {
            full.push("-T".to_string());
        }
        full.push(service.to_string());
        full.extend(args);
        self.run(&format!("one-off {} container", service), full, input)
            .await
    }
}

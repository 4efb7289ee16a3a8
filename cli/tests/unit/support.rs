//! Fake adapters and a harness wiring them into a runtime

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tempfile::TempDir;
use url::Url;

use unms_cli::app::context::{
    Context, InstallerUrls, DEFAULT_INSTALLER_URL, DEFAULT_LEGACY_INSTALLER_URL,
};
use unms_cli::app::run::run;
use unms_cli::app::runtime::Runtime;
use unms_cli::commands::{parse_args, Invocation};
use unms_cli::database::Database;
use unms_cli::deploy::conntrack::Conntrack;
use unms_cli::deploy::orchestrator::{ExecInput, Orchestrator};
use unms_cli::errors::CliError;
use unms_cli::filesys::file::File;
use unms_cli::installer::runner::ScriptRunner;
use unms_cli::installer::source::InstallerSource;

pub const CONFIG: &str = "NETFLOW_PORT=\"2055\"\nBRANCH=\"beta\"\n";

pub const DESCRIPTOR: &str = "\
services:
  unms:
    environment:
      - UCRM_ENABLED=false
      - WORKERS=auto
      - IP_WHITELIST=
  nginx:
    environment:
      - IP_WHITELIST=
";

#[derive(Default)]
pub struct OrchestratorState {
    pub running: bool,
    pub calls: Vec<String>,
    pub whitelist: Vec<String>,
    pub fed: Vec<String>,
}

/// Records every call; emulates the proxy's whitelist helper
#[derive(Default)]
pub struct FakeOrchestrator {
    pub state: Mutex<OrchestratorState>,
}

impl FakeOrchestrator {
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn set_running(&self, running: bool) {
        self.state.lock().unwrap().running = running;
    }
}

#[async_trait]
impl Orchestrator for FakeOrchestrator {
    async fn is_running(&self) -> Result<bool, CliError> {
        Ok(self.state.lock().unwrap().running)
    }

    async fn up(&self, services: &[&str]) -> Result<(), CliError> {
        let mut state = self.state.lock().unwrap();
        state.running = true;
        state.calls.push(format!("up {}", services.join(" ")));
        Ok(())
    }

    async fn down(&self) -> Result<(), CliError> {
        let mut state = self.state.lock().unwrap();
        state.running = false;
        state.calls.push("down".to_string());
        Ok(())
    }

    async fn exec(
        &self,
        service: &str,
        args: Vec<String>,
        input: ExecInput,
    ) -> Result<String, CliError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("exec {} {}", service, args.join(" ")));
        if let ExecInput::Feed(text) = input {
            state.fed.push(text);
        }

        if args.first().map(String::as_str) == Some("/ip-whitelist.sh") {
            match args.get(1).map(String::as_str) {
                Some("--set") => {
                    state.whitelist = args[2].split(',').map(str::to_string).collect();
                }
                Some("--clear") => state.whitelist.clear(),
                _ => return Ok(state.whitelist.join("\n")),
            }
        }
        Ok(String::new())
    }

    async fn run_oneoff(
        &self,
        service: &str,
        args: Vec<String>,
        input: ExecInput,
    ) -> Result<String, CliError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("run {} {}", service, args.join(" ")));
        if let ExecInput::Feed(text) = input {
            state.fed.push(text);
        }
        Ok(String::new())
    }
}

#[derive(Default)]
pub struct FakeDatabase {
    pub settings: Mutex<HashMap<String, Value>>,
    pub backup_index: Mutex<Vec<String>>,
    pub delete_calls: Mutex<Vec<usize>>,
    pub unreachable: bool,
}

impl FakeDatabase {
    pub fn setting(&self, name: &str) -> Option<Value> {
        self.settings.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl Database for FakeDatabase {
    async fn read_setting(&self, name: &str) -> Result<Option<String>, CliError> {
        Ok(self
            .settings
            .lock()
            .unwrap()
            .get(name)
            .map(|v| v.to_string().trim_matches('"').to_string()))
    }

    async fn upsert_setting(&self, name: &str, value: &Value) -> Result<(), CliError> {
        if self.unreachable {
            return Err(CliError::adapter(format!("write setting {}", name), "database down"));
        }
        self.settings
            .lock()
            .unwrap()
            .insert(name.to_string(), value.clone());
        Ok(())
    }

    async fn delete_device_backups(&self, ids: &[String]) -> Result<u64, CliError> {
        self.delete_calls.lock().unwrap().push(ids.len());
        let mut index = self.backup_index.lock().unwrap();
        let before = index.len();
        index.retain(|id| !ids.contains(id));
        Ok((before - index.len()) as u64)
    }
}

#[derive(Default)]
pub struct FakeConntrack {
    pub fail: bool,
    pub flushed: Mutex<Vec<u16>>,
}

#[async_trait]
impl Conntrack for FakeConntrack {
    async fn flush_udp(&self, port: u16) -> Result<(), CliError> {
        if self.fail {
            return Err(CliError::adapter("clear conntrack", "no such rule"));
        }
        self.flushed.lock().unwrap().push(port);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeInstaller {
    pub fetched: Mutex<Vec<String>>,
}

#[async_trait]
impl InstallerSource for FakeInstaller {
    async fn fetch(&self, url: &Url, dest: &File) -> Result<(), CliError> {
        self.fetched.lock().unwrap().push(url.to_string());
        dest.write_atomic(b"#!/bin/bash\nexit 0\n").await
    }
}

/// Script runner with scripted outcomes (default success). The first run may
/// clobber a file to simulate an installer that failed halfway.
#[derive(Default)]
pub struct FakeScripts {
    pub outcomes: Mutex<VecDeque<bool>>,
    pub runs: Mutex<Vec<(PathBuf, Vec<String>)>>,
    pub clobber_on_first_run: Option<PathBuf>,
}

impl FakeScripts {
    pub fn runs(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.runs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRunner for FakeScripts {
    async fn run(&self, script: &Path, args: &[String]) -> Result<(), CliError> {
        let first = {
            let mut runs = self.runs.lock().unwrap();
            runs.push((script.to_path_buf(), args.to_vec()));
            runs.len() == 1
        };
        if first {
            if let Some(path) = &self.clobber_on_first_run {
                std::fs::write(path, "BROKEN=1\n")?;
            }
        }
        let ok = self.outcomes.lock().unwrap().pop_front().unwrap_or(true);
        if ok {
            Ok(())
        } else {
            Err(CliError::adapter(format!("run {}", script.display()), "exited with 1"))
        }
    }
}

pub struct Harness {
    pub dir: TempDir,
    pub ctx: Context,
    pub orchestrator: FakeOrchestrator,
    pub database: FakeDatabase,
    pub conntrack: FakeConntrack,
    pub installer: FakeInstaller,
    pub scripts: FakeScripts,
    pub input: Cursor<Vec<u8>>,
    pub out: Vec<u8>,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let urls = InstallerUrls::parse(DEFAULT_INSTALLER_URL, DEFAULT_LEGACY_INSTALLER_URL).unwrap();
        let mut ctx = Context::new(dir.path().join("app"), dir.path().join("data"), urls);
        ctx.restart_delay = Duration::ZERO;
        ctx.update_dir = dir.path().join("update");

        std::fs::create_dir_all(&ctx.app_dir).unwrap();
        std::fs::create_dir_all(&ctx.data_dir).unwrap();
        std::fs::write(ctx.config_file().path(), CONFIG).unwrap();
        std::fs::write(ctx.descriptor_file().path(), DESCRIPTOR).unwrap();

        Self {
            dir,
            ctx,
            orchestrator: FakeOrchestrator::default(),
            database: FakeDatabase::default(),
            conntrack: FakeConntrack::default(),
            installer: FakeInstaller::default(),
            scripts: FakeScripts::default(),
            input: Cursor::new(Vec::new()),
            out: Vec::new(),
        }
    }

    pub fn running() -> Self {
        let harness = Self::new();
        harness.orchestrator.set_running(true);
        harness
    }

    pub fn answer(&mut self, text: &str) {
        self.input = Cursor::new(text.as_bytes().to_vec());
    }

    pub fn runtime(&mut self) -> Runtime<'_> {
        Runtime {
            ctx: &self.ctx,
            orchestrator: &self.orchestrator,
            database: &self.database,
            conntrack: &self.conntrack,
            installer: &self.installer,
            scripts: &self.scripts,
            input: &mut self.input,
            out: &mut self.out,
        }
    }

    /// Parse a command line and run it, exactly as the binary would
    pub async fn run(&mut self, args: &[&str]) -> Result<(), CliError> {
        let mut full = vec!["unms-cli"];
        full.extend_from_slice(args);
        let cli = match parse_args(full)? {
            Invocation::Run(cli) => cli,
            Invocation::Info(text) => panic!("unexpected info output: {}", text),
        };
        let mut rt = self.runtime();
        run(&cli.command, &mut rt).await
    }

    pub fn output(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }

    pub fn take_output(&mut self) -> String {
        let text = self.output();
        self.out.clear();
        text
    }

    pub fn config(&self) -> String {
        std::fs::read_to_string(self.ctx.config_file().path()).unwrap()
    }

    pub fn descriptor(&self) -> String {
        std::fs::read_to_string(self.ctx.descriptor_file().path()).unwrap()
    }
}

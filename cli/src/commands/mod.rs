//! Command grammar and handlers
//!
//! Arguments are parsed and validated in full before any handler runs; a
//! command is never partially applied because of a bad flag.

pub mod certificate;
pub mod device_backups;
pub mod device_updates;
pub mod guard;
pub mod ip_whitelist;
pub mod lifecycle;
pub mod redis;
pub mod restore;
pub mod ucrm;
pub mod update;
pub mod users;
pub mod workers;

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;

use crate::app::context::{
    DEFAULT_APP_DIR, DEFAULT_DATA_DIR, DEFAULT_INSTALLER_URL, DEFAULT_LEGACY_INSTALLER_URL,
    DEFAULT_PROJECT_NAME, DEFAULT_RESTART_DELAY_SECS, DEFAULT_UPDATE_DIR,
};
use crate::app::runtime::Runtime;
use crate::commands::ip_whitelist::{parse_whitelist, IpWhitelist, WhitelistAction};
use crate::commands::workers::{parse_worker_count, WorkerCount};
use crate::errors::CliError;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

/// Administer a UNMS installation
#[derive(Parser, Debug, Clone)]
#[command(name = "unms-cli", version, long_version = LONG_VERSION)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Installation layout overrides
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Application directory (config file, compose file)
    #[arg(long, global = true, env = "UNMS_APP_DIR", default_value = DEFAULT_APP_DIR)]
    pub app_dir: PathBuf,

    /// Data directory (backups)
    #[arg(long, global = true, env = "UNMS_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Compose project name
    #[arg(long, global = true, env = "UNMS_PROJECT_NAME", default_value = DEFAULT_PROJECT_NAME)]
    pub project: String,

    #[arg(long, hide = true, global = true, env = "UNMS_RESTART_DELAY_SECS", default_value_t = DEFAULT_RESTART_DELAY_SECS)]
    pub restart_delay_secs: u64,

    #[arg(long, hide = true, global = true, env = "UNMS_UPDATE_DIR", default_value = DEFAULT_UPDATE_DIR)]
    pub update_dir: PathBuf,

    #[arg(long, hide = true, global = true, env = "UNMS_INSTALLER_URL", default_value = DEFAULT_INSTALLER_URL)]
    pub installer_url: String,

    #[arg(long, hide = true, global = true, env = "UNMS_LEGACY_INSTALLER_URL", default_value = DEFAULT_LEGACY_INSTALLER_URL)]
    pub legacy_installer_url: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start UNMS
    Start,

    /// Stop UNMS
    Stop,

    /// Stop UNMS if it is running, then start it
    Restart,

    /// Show whether UCRM is enabled, or enable/disable it
    Ucrm(UcrmArgs),

    /// Show, set or clear the addresses allowed to reach UNMS
    IpWhitelist(IpWhitelistArgs),

    /// Drop tracked UDP flows for the NetFlow port
    ClearConntrack,

    /// Keep only the newest device configuration backups per device
    ClearDeviceBackups,

    /// Disable two-factor authentication for a user
    DisableTwoFactor(UserArgs),

    /// Repair the Redis append-only file (UNMS must be stopped)
    FixRedisAof,

    /// Lower how often devices send updates
    ReduceDeviceUpdateFrequency,

    /// Renew the HTTPS certificate
    RefreshCertificate,

    /// Restore a system backup (the newest one by default)
    RestoreBackup(RestoreArgs),

    /// Compact the Redis append-only file (UNMS must be running)
    RewriteRedisAof,

    /// Set a user's password
    SetPassword(UserArgs),

    /// Make a user the superadmin
    SetSuperadmin(UserArgs),

    /// Set the number of application workers
    SetWorkers(SetWorkersArgs),

    /// Update UNMS, rolling back if the installer fails
    Update(UpdateArgs),
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UcrmArgs {
    /// Enable UCRM
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable UCRM
    #[arg(long)]
    pub disable: bool,
}

impl UcrmArgs {
    /// Requested state, if a change was requested
    pub fn desired(&self) -> Option<bool> {
        match (self.enable, self.disable) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
#[command(group(ArgGroup::new("action").required(true).args(["show", "clear", "set"])))]
pub struct IpWhitelistArgs {
    /// Show the effective whitelist
    #[arg(long)]
    pub show: bool,

    /// Allow every address
    #[arg(long)]
    pub clear: bool,

    /// Comma-separated addresses or networks to allow
    #[arg(long, value_name = "LIST", value_parser = parse_whitelist)]
    pub set: Option<IpWhitelist>,
}

impl IpWhitelistArgs {
    pub fn action(&self) -> WhitelistAction {
        match (&self.set, self.clear) {
            (Some(list), _) => WhitelistAction::Set(list.clone()),
            (None, true) => WhitelistAction::Clear,
            (None, false) => WhitelistAction::Show,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UserArgs {
    /// User to modify; lists users when omitted
    #[arg(long, value_name = "USERNAME")]
    pub username: Option<String>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RestoreArgs {
    /// Backup archive to restore
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SetWorkersArgs {
    /// 1-8 or "auto"
    #[arg(value_name = "COUNT", value_parser = parse_worker_count)]
    pub count: WorkerCount,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UpdateArgs {
    /// Version to install (latest when omitted)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Do not ask any questions
    #[arg(long)]
    pub unattended: bool,
}

/// Result of reading the command line
#[derive(Debug)]
pub enum Invocation {
    /// Run a command
    Run(Box<Cli>),

    /// Help or version text was requested; print it and exit successfully
    Info(String),
}

/// Parse the full command line.
///
/// Any problem (unknown flag, conflicting flags, missing value, stray
/// positional, invalid value, missing command) becomes a
/// [`CliError::UsageError`] carrying the message and the command's usage.
pub fn parse_args<I, T>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Invocation::Run(Box::new(cli))),
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Ok(Invocation::Info(e.render().to_string()))
            }
            _ => Err(CliError::UsageError(e.render().to_string())),
        },
    }
}

pub(crate) fn restart_reminder(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    let hint = format!("Restart UNMS to apply the change: {}", rt.ctx.hint("restart"));
    writeln!(rt.out, "{}", hint.yellow())?;
    Ok(())
}

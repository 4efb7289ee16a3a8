//! Immutable per-invocation context: installation paths and deployment names

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::errors::CliError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

pub const DEFAULT_APP_DIR: &str = "/home/unms/app";
pub const DEFAULT_DATA_DIR: &str = "/home/unms/data";
pub const DEFAULT_PROJECT_NAME: &str = "unms";
pub const DEFAULT_UPDATE_DIR: &str = "/tmp/unms-update";
pub const DEFAULT_RESTART_DELAY_SECS: u64 = 15;
pub const DEFAULT_INSTALLER_URL: &str = "https://uisp.ui.com/v1/install";
pub const DEFAULT_LEGACY_INSTALLER_URL: &str = "https://unms.com/v0/install";

pub const CONFIG_FILE_NAME: &str = "unms.conf";

/// Installer script locations
#[derive(Debug, Clone)]
pub struct InstallerUrls {
    /// Installer for current (1.x and later) installations
    pub current: Url,

    /// Installer for legacy (0.x) installations
    pub legacy: Url,
}

impl InstallerUrls {
    pub fn parse(current: &str, legacy: &str) -> Result<Self, CliError> {
        let parse = |raw: &str| {
            Url::parse(raw)
                .map_err(|e| CliError::ConfigError(format!("Invalid installer URL {}: {}", raw, e)))
        };
        Ok(Self {
            current: parse(current)?,
            legacy: parse(legacy)?,
        })
    }
}

/// Everything a command handler needs to know about the installation.
///
/// Built once from the global options and passed by reference to every
/// handler; nothing in here changes while a command runs.
#[derive(Debug, Clone)]
pub struct Context {
    /// Application directory (config file, descriptor, version metadata)
    pub app_dir: PathBuf,

    /// Data directory (backups, restore scratch space)
    pub data_dir: PathBuf,

    /// Compose project name
    pub project_name: String,

    /// Pause between stopping and starting during a restart
    pub restart_delay: Duration,

    /// Scratch directory for updates; holds the installer and the rollback snapshot
    pub update_dir: PathBuf,

    /// Installer script locations
    pub installer_urls: InstallerUrls,

    /// Name the operator invokes the tool by, used in remediation hints
    pub cli_name: String,
}

impl Context {
    /// Create a context rooted at the given directories with default names
    pub fn new(
        app_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        installer_urls: InstallerUrls,
    ) -> Self {
        Self {
            app_dir: app_dir.into(),
            data_dir: data_dir.into(),
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            restart_delay: Duration::from_secs(DEFAULT_RESTART_DELAY_SECS),
            update_dir: PathBuf::from(DEFAULT_UPDATE_DIR),
            installer_urls,
            cli_name: "unms-cli".to_string(),
        }
    }

    pub fn app(&self) -> Dir {
        Dir::new(&self.app_dir)
    }

    /// Flat key=value config file
    pub fn config_file(&self) -> File {
        self.app().file(CONFIG_FILE_NAME)
    }

    /// Deployment descriptor consumed by the orchestrator
    pub fn descriptor_file(&self) -> File {
        self.app().file("docker-compose.yml")
    }

    /// Installed version metadata
    pub fn version_file(&self) -> File {
        self.app().file("version")
    }

    /// Per-device configuration backups, one subdirectory per device
    pub fn device_backups_dir(&self) -> Dir {
        Dir::new(self.data_dir.join("config-backups"))
    }

    /// Full system backup archives
    pub fn backups_dir(&self) -> Dir {
        Dir::new(self.data_dir.join("unms-backups").join("backups"))
    }

    /// Scratch directory a backup is extracted into before restart
    pub fn restore_dir(&self) -> Dir {
        Dir::new(self.data_dir.join("unms-backups").join("restore"))
    }

    pub fn update_dir(&self) -> Dir {
        Dir::new(&self.update_dir)
    }

    /// Snapshot of the application directory taken before an update
    pub fn rollback_dir(&self) -> Dir {
        self.update_dir().subdir("rollback")
    }

    /// Hint telling the operator how to run another command
    pub fn hint(&self, command: &str) -> String {
        format!("{} {}", self.cli_name, command)
    }
}

//! Update with rollback
//!
//! The installer is downloaded into a fresh working directory and the whole
//! application directory is snapshotted next to it before anything runs. If
//! the installer fails, the snapshot's config file is put back and the
//! snapshot's own installer is re-run in update mode.

use std::io::Write;

use colored::Colorize;
use tracing::{error, info, warn};
use url::Url;

use crate::app::context::{Context, CONFIG_FILE_NAME};
use crate::config::conf_file::ConfigFile;
use crate::config::keys;
use crate::errors::CliError;
use crate::installer::runner::ScriptRunner;
use crate::installer::source::InstallerSource;
use crate::installer::version::{installed_version, installer_url};

/// Installer script shipped inside the application directory
pub const BUNDLED_INSTALLER: &str = "install-full.sh";

const DOWNLOADED_INSTALLER: &str = "install.sh";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Target version; the installer picks the latest when absent
    pub version: Option<String>,

    /// Run the installer without prompts
    pub unattended: bool,
}

/// Resolved inputs for one update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    pub installed_version: String,
    pub branch: String,
    pub url: Url,
    pub installer_args: Vec<String>,
}

impl UpdatePlan {
    pub async fn resolve(ctx: &Context, request: &UpdateRequest) -> Result<Self, CliError> {
        let installed = installed_version(ctx).await?;
        let branch = ConfigFile::new(ctx.config_file())
            .read(keys::BRANCH, keys::DEFAULT_BRANCH)
            .await?;
        let url = installer_url(&ctx.installer_urls, &installed).clone();

        let mut installer_args = vec!["--update".to_string(), "--branch".to_string(), branch.clone()];
        if let Some(version) = &request.version {
            installer_args.push("--version".to_string());
            installer_args.push(version.clone());
        }
        if request.unattended {
            installer_args.push("--unattended".to_string());
        }

        Ok(Self {
            installed_version: installed,
            branch,
            url,
            installer_args,
        })
    }
}

pub struct UpdateEngine<'a> {
    ctx: &'a Context,
    source: &'a dyn InstallerSource,
    runner: &'a dyn ScriptRunner,
}

impl<'a> UpdateEngine<'a> {
    pub fn new(ctx: &'a Context, source: &'a dyn InstallerSource, runner: &'a dyn ScriptRunner) -> Self {
        Self { ctx, source, runner }
    }

    /// Run the plan. Any installer failure triggers a rollback and the update
    /// is reported as failed whatever the rollback outcome.
    pub async fn run(&self, plan: &UpdatePlan, out: &mut dyn Write) -> Result<(), CliError> {
        // The snapshot of the app dir is written into the work dir
        if self.ctx.update_dir.starts_with(&self.ctx.app_dir) {
            return Err(CliError::ConfigError(format!(
                "update directory {} must be outside the application directory {}",
                self.ctx.update_dir.display(),
                self.ctx.app_dir.display()
            )));
        }

        let work = self.ctx.update_dir();
        work.recreate().await?;

        writeln!(out, "Downloading installer from {}", plan.url)?;
        let script = work.file(DOWNLOADED_INSTALLER);
        self.source.fetch(&plan.url, &script).await?;

        let rollback = self.ctx.rollback_dir();
        info!("Snapshotting {:?} into {:?}", self.ctx.app_dir, rollback.path());
        self.ctx.app().copy_to(&rollback).await?;

        writeln!(out, "Updating from version '{}' on branch {}", plan.installed_version, plan.branch)?;
        match self.runner.run(script.path(), &plan.installer_args).await {
            Ok(()) => {
                work.delete().await?;
                writeln!(out, "{}", "Update finished.".green())?;
                Ok(())
            }
            Err(e) => {
                error!("Installer failed: {}", e);
                writeln!(out, "{} {}", "Update failed:".red(), e)?;
                writeln!(out, "Rolling back to the previous installation...")?;
                match self.rollback().await {
                    Ok(()) => {
                        work.delete().await?;
                        writeln!(out, "{}", "Rollback finished.".yellow())?;
                    }
                    Err(rollback_err) => {
                        warn!("Rollback failed: {}", rollback_err);
                        writeln!(
                            out,
                            "{} {}\nThe snapshot is kept in {}",
                            "Rollback failed:".red(),
                            rollback_err,
                            rollback.path().display()
                        )?;
                    }
                }
                Err(CliError::UpdateFailed(e.to_string()))
            }
        }
    }

    async fn rollback(&self) -> Result<(), CliError> {
        let snapshot = self.ctx.rollback_dir();
        snapshot
            .file(CONFIG_FILE_NAME)
            .copy_to(&self.ctx.config_file())
            .await?;

        let installer = snapshot.file(BUNDLED_INSTALLER);
        if !installer.is_regular().await {
            return Err(CliError::NotFound(format!(
                "rollback installer {}",
                installer.path().display()
            )));
        }
        let args = vec!["--update".to_string(), "--unattended".to_string()];
        self.runner.run(installer.path(), &args).await
    }
}

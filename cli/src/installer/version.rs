//! Installed version lookup and installer selection

use url::Url;

use crate::app::context::{Context, InstallerUrls};
use crate::config::conf_file::ConfigFile;
use crate::config::keys;
use crate::errors::CliError;

/// Installed version: the version file's first line, else the config file's VERSION
pub async fn installed_version(ctx: &Context) -> Result<String, CliError> {
    let from_file = ctx.version_file().read_string_or_empty().await?;
    let from_file = from_file.lines().next().unwrap_or("").trim();
    if !from_file.is_empty() {
        return Ok(from_file.to_string());
    }
    ConfigFile::new(ctx.config_file()).read(keys::VERSION, "").await
}

/// Legacy installations are the 0.x line; anything else (including an
/// unknown version) uses the current installer
pub fn is_legacy(version: &str) -> bool {
    version.trim().trim_start_matches('v').starts_with('0')
}

pub fn installer_url<'a>(urls: &'a InstallerUrls, installed: &str) -> &'a Url {
    if is_legacy(installed) {
        &urls.legacy
    } else {
        &urls.current
    }
}

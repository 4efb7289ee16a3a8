//! Enable, disable or inspect the UCRM module

use std::io::Write;

use serde_json::Value;

use crate::app::runtime::Runtime;
use crate::commands::restart_reminder;
use crate::config::conf_file::ConfigFile;
use crate::config::keys;
use crate::config::mirror::{write_mirrored, MirroredSetting};
use crate::errors::CliError;

/// Apply the requested state (if any) to all three stores and report the
/// effective state as read back from the config file
pub async fn ucrm(rt: &mut Runtime<'_>, desired: Option<bool>) -> Result<bool, CliError> {
    if let Some(enabled) = desired {
        let setting = MirroredSetting::files(keys::UCRM_ENABLED, enabled.to_string())
            .with_live(keys::live::UCRM_ENABLED, Value::Bool(enabled));
        write_mirrored(rt.ctx, rt.database, &setting).await?;
    }

    let effective = ConfigFile::new(rt.ctx.config_file())
        .read(keys::UCRM_ENABLED, "false")
        .await?
        .eq_ignore_ascii_case("true");
    writeln!(
        rt.out,
        "UCRM is {}.",
        if effective { "enabled" } else { "disabled" }
    )?;

    if desired.is_some() {
        restart_reminder(rt)?;
    }
    Ok(effective)
}

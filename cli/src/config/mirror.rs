//! Writes for settings mirrored across the config file, the descriptor and
//! optionally the live settings store

use serde_json::Value;
use tracing::info;

use crate::app::context::Context;
use crate::config::conf_file::ConfigFile;
use crate::config::descriptor::Descriptor;
use crate::database::Database;
use crate::errors::CliError;

/// One logical setting and where it is mirrored
#[derive(Debug, Clone)]
pub struct MirroredSetting<'a> {
    /// Key in the config file and descriptor
    pub key: &'a str,

    /// Value as written to both files
    pub value: String,

    /// Name and JSON value in the live settings store, if mirrored there
    pub live: Option<(&'a str, Value)>,
}

impl<'a> MirroredSetting<'a> {
    pub fn files(key: &'a str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
            live: None,
        }
    }

    pub fn with_live(mut self, name: &'a str, value: Value) -> Self {
        self.live = Some((name, value));
        self
    }
}

/// Write a setting to every store it lives in.
///
/// Checks that the descriptor has an entry for the key before touching
/// anything, then writes the live store, the config file and the descriptor in
/// that order. The first failure aborts the remaining writes.
pub async fn write_mirrored(
    ctx: &Context,
    database: &dyn Database,
    setting: &MirroredSetting<'_>,
) -> Result<(), CliError> {
    let config = ConfigFile::new(ctx.config_file());
    let descriptor = Descriptor::new(ctx.descriptor_file());

    descriptor.ensure_key(setting.key).await?;

    if let Some((name, value)) = &setting.live {
        database.upsert_setting(name, value).await?;
    }
    config.write(setting.key, &setting.value).await?;
    descriptor.write(setting.key, &setting.value).await?;

    info!("Set {}={}", setting.key, setting.value);
    Ok(())
}

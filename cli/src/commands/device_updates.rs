//! reduce-device-update-frequency

use std::io::Write;

use serde_json::json;

use crate::app::runtime::Runtime;
use crate::config::keys;
use crate::errors::CliError;

const MINIMAL_PROFILE: &str = "minimal";

pub async fn reduce_device_update_frequency(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    rt.database
        .upsert_setting(keys::live::DEVICE_TRANSMISSION_PROFILE, &json!(MINIMAL_PROFILE))
        .await?;
    writeln!(
        rt.out,
        "Device transmission profile set to '{}'. Devices will report less often.",
        MINIMAL_PROFILE
    )?;
    Ok(())
}

//! Relational store: live application settings and the device backup index

pub mod psql;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::CliError;

#[async_trait]
pub trait Database: Send + Sync {
    /// Raw value of a setting with whitespace and quotes trimmed; `None` when absent
    async fn read_setting(&self, name: &str) -> Result<Option<String>, CliError>;

    /// Insert the setting, or overwrite its value if it already exists
    async fn upsert_setting(&self, name: &str, value: &Value) -> Result<(), CliError>;

    /// Remove device backup index rows by backup id, returning how many were removed
    async fn delete_device_backups(&self, ids: &[String]) -> Result<u64, CliError>;

    async fn read_setting_or(&self, name: &str, default: &str) -> Result<String, CliError> {
        Ok(self
            .read_setting(name)
            .await?
            .unwrap_or_else(|| default.to_string()))
    }
}

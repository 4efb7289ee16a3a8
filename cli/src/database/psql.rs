//! `psql` running inside the database service
//!
//! Values never appear in SQL text. Each one is passed to psql as a variable
//! (`-v name=value`) and referenced as `:'name'`, which psql substitutes as a
//! correctly quoted literal.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::database::Database;
use crate::deploy::orchestrator::{ExecInput, Orchestrator};
use crate::deploy::services;
use crate::errors::CliError;

const DB_USER: &str = "postgres";
const DB_NAME: &str = "unms";

const READ_SETTING: &str = "SELECT value FROM unms.setting WHERE name = :'name';";
const UPSERT_SETTING: &str = "INSERT INTO unms.setting (name, value) VALUES (:'name', :'value'::json) \
     ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value;";
const DELETE_DEVICE_BACKUPS: &str =
    "DELETE FROM unms.device_backup WHERE id::text = ANY(:'ids'::text[]) RETURNING id;";

/// A SQL script plus the variables it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsqlQuery {
    sql: &'static str,
    vars: Vec<(&'static str, String)>,
}

impl PsqlQuery {
    pub fn new(sql: &'static str) -> Self {
        Self { sql, vars: Vec::new() }
    }

    pub fn bind(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.vars.push((name, value.into()));
        self
    }

    pub fn sql(&self) -> &str {
        self.sql
    }

    /// psql command line: tuples only, unaligned, quiet, stop on first error
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "psql", "-X", "-q", "-t", "-A", "-U", DB_USER, "-d", DB_NAME, "-v", "ON_ERROR_STOP=1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for (name, value) in &self.vars {
            args.push("-v".to_string());
            args.push(format!("{}={}", name, value));
        }
        args
    }
}

/// Postgres array literal of text elements
pub fn text_array(items: &[String]) -> String {
    let elements: Vec<String> = items
        .iter()
        .map(|item| format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("{{{}}}", elements.join(","))
}

/// Database adapter that shells into the postgres service
#[derive(Clone)]
pub struct PsqlDatabase {
    orchestrator: Arc<dyn Orchestrator>,
}

impl PsqlDatabase {
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self { orchestrator }
    }

    async fn query(&self, query: PsqlQuery, operation: String) -> Result<String, CliError> {
        debug!("psql: {}", query.sql());
        self.orchestrator
            .exec(
                services::POSTGRES,
                query.args(),
                ExecInput::Feed(query.sql().to_string()),
            )
            .await
            .map_err(|e| match e {
                CliError::AdapterError { reason, .. } => CliError::AdapterError { operation, reason },
                other => other,
            })
    }
}

#[async_trait]
impl Database for PsqlDatabase {
    async fn read_setting(&self, name: &str) -> Result<Option<String>, CliError> {
        let query = PsqlQuery::new(READ_SETTING).bind("name", name);
        let out = self.query(query, format!("read setting {}", name)).await?;
        let value = out.trim().trim_matches('"').trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    async fn upsert_setting(&self, name: &str, value: &Value) -> Result<(), CliError> {
        let query = PsqlQuery::new(UPSERT_SETTING)
            .bind("name", name)
            .bind("value", serde_json::to_string(value)?);
        self.query(query, format!("write setting {}", name)).await?;
        Ok(())
    }

    async fn delete_device_backups(&self, ids: &[String]) -> Result<u64, CliError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let query = PsqlQuery::new(DELETE_DEVICE_BACKUPS).bind("ids", text_array(ids));
        let out = self
            .query(query, format!("delete {} device backup index rows", ids.len()))
            .await?;
        Ok(out.lines().filter(|line| !line.trim().is_empty()).count() as u64)
    }
}

//! Deployment descriptor (compose file) environment entries
//!
//! Mirrored settings appear in the descriptor as unquoted environment
//! assignments, e.g. `      - WORKERS=4`. A key may be present under several
//! services; all of its entries are kept identical.

use tracing::debug;

use crate::config::conf_file::validate_value;
use crate::errors::CliError;
use crate::filesys::file::File;

#[derive(Debug, Clone)]
pub struct Descriptor {
    file: File,
}

impl Descriptor {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// First value assigned to `key`, if any
    pub async fn read(&self, key: &str) -> Result<Option<String>, CliError> {
        let contents = self.file.read_string().await?;
        Ok(contents
            .lines()
            .find_map(|line| env_entry(line, key))
            .map(|(_, value)| value.trim().to_string()))
    }

    /// Fail unless the descriptor carries at least one entry for `key`
    pub async fn ensure_key(&self, key: &str) -> Result<(), CliError> {
        let contents = self.file.read_string().await?;
        if contents.lines().any(|line| env_entry(line, key).is_some()) {
            Ok(())
        } else {
            Err(CliError::adapter(
                format!("update {}", self.file.path().display()),
                format!("no {} entry found", key),
            ))
        }
    }

    /// Set every entry for `key` to `value`
    pub async fn write(&self, key: &str, value: &str) -> Result<(), CliError> {
        validate_value(key, value)?;
        let contents = self.file.read_string().await?;
        let (updated, count) = rewrite(&contents, key, value);
        if count == 0 {
            return Err(CliError::adapter(
                format!("update {}", self.file.path().display()),
                format!("no {} entry found", key),
            ));
        }
        debug!("Rewrote {} {} entries in {:?}", count, key, self.file.path());
        self.file.write_atomic(updated.as_bytes()).await
    }
}

/// Split a descriptor line into (prefix up to and including `key=`, value)
fn env_entry<'a>(line: &'a str, key: &str) -> Option<(&'a str, &'a str)> {
    let body = line.trim_start();
    let body = body.strip_prefix("- ").map(str::trim_start).unwrap_or(body);
    let value = body.strip_prefix(key)?.strip_prefix('=')?;
    Some((&line[..line.len() - value.len()], value))
}

/// Contents with every `key` entry set to `value`, and the number of entries touched
pub fn rewrite(contents: &str, key: &str, value: &str) -> (String, usize) {
    let mut out = String::with_capacity(contents.len());
    let mut count = 0;

    for line in contents.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        match env_entry(body, key) {
            Some((prefix, _)) => {
                out.push_str(prefix);
                out.push_str(value);
                out.push_str(&line[body.len()..]);
                count += 1;
            }
            None => out.push_str(line),
        }
    }
    (out, count)
}

//! Flat `KEY="value"` config file
//!
//! The file is also sourced by shell scripts, so values are written inside
//! double quotes with the shell-active characters escaped. Edits are done as
//! structured line rewrites; no user value is ever used as a pattern.

use tracing::debug;

use crate::errors::CliError;
use crate::filesys::file::File;

/// Config store backed by a line-oriented key=value file
#[derive(Debug, Clone)]
pub struct ConfigFile {
    file: File,
}

impl ConfigFile {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Read a value, falling back to `default` when the key is absent
    pub async fn read(&self, key: &str, default: &str) -> Result<String, CliError> {
        let contents = self.file.read_string_or_empty().await?;
        Ok(lookup(&contents, key).unwrap_or_else(|| default.to_string()))
    }

    /// Replace the key's line in place, or append it when missing
    pub async fn write(&self, key: &str, value: &str) -> Result<(), CliError> {
        validate_value(key, value)?;
        let contents = self.file.read_string_or_empty().await?;
        let updated = rewrite(&contents, key, value);
        debug!("Writing {} to {:?}", key, self.file.path());
        self.file.write_atomic(updated.as_bytes()).await
    }
}

pub(crate) fn validate_value(key: &str, value: &str) -> Result<(), CliError> {
    if value.contains(['\n', '\r']) {
        return Err(CliError::ValidationError(format!(
            "Value for {} must be a single line",
            key
        )));
    }
    Ok(())
}

/// Value of the first `key=...` line, with surrounding quotes removed
pub fn lookup(contents: &str, key: &str) -> Option<String> {
    contents
        .lines()
        .find_map(|line| assignment_value(line, key))
        .map(unquote)
}

/// Contents with `key` set to `value`.
///
/// The first matching line is replaced and any later duplicates are dropped, so
/// the key ends up on exactly one line. Every other line is kept byte for byte.
pub fn rewrite(contents: &str, key: &str, value: &str) -> String {
    let new_line = format!("{}={}", key, quote(value));
    let mut out = String::with_capacity(contents.len() + new_line.len() + 1);
    let mut replaced = false;

    for line in contents.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        if assignment_value(body, key).is_some() {
            if !replaced {
                out.push_str(&new_line);
                out.push_str(&line[body.len()..]);
                replaced = true;
            }
            continue;
        }
        out.push_str(line);
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&new_line);
        out.push('\n');
    }
    out
}

fn assignment_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    line.trim_start()
        .strip_prefix(key)
        .and_then(|rest| rest.strip_prefix('='))
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    let quoted = |q: char| raw.len() >= 2 && raw.starts_with(q) && raw.ends_with(q);

    if quoted('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    if !quoted('"') {
        return raw.to_string();
    }

    let mut value = String::with_capacity(raw.len());
    let mut chars = raw[1..raw.len() - 1].chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                value.push(escaped);
            }
        } else {
            value.push(c);
        }
    }
    value
}

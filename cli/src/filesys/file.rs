//! File operations

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::errors::CliError;

/// A file wrapper with path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    path: PathBuf,
}

impl File {
    /// Create a new file reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the file name as a string, if it has one
    pub fn name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Check if the path exists (file or otherwise)
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path).await.is_ok()
    }

    /// Check if the path exists and is a regular file
    pub async fn is_regular(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Last modification time
    pub async fn modified(&self) -> Result<SystemTime, CliError> {
        Ok(fs::metadata(&self.path).await?.modified()?)
    }

    /// Read file contents as string
    pub async fn read_string(&self) -> Result<String, CliError> {
        fs::read_to_string(&self.path)
            .await
            .map_err(|e| CliError::adapter(format!("read {}", self.path.display()), e))
    }

    /// Read file contents, treating a missing file as empty
    pub async fn read_string_or_empty(&self) -> Result<String, CliError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(CliError::adapter(format!("read {}", self.path.display()), e)),
        }
    }

    /// Atomic write using a temporary file next to the target. An existing
    /// target's mode and ownership carry over to the new contents.
    pub async fn write_atomic(&self, contents: &[u8]) -> Result<(), CliError> {
        let temp_path = self.path.with_extension("tmp");
        let previous = fs::metadata(&self.path).await.ok();
        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            if let Some(meta) = &previous {
                // Mode first: the contents are never readable more widely than the target
                fs::set_permissions(&temp_path, meta.permissions()).await?;
                keep_owner(&temp_path, meta);
            }
            file.write_all(contents).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, &self.path).await
        };
        write
            .await
            .map_err(|e| CliError::adapter(format!("write {}", self.path.display()), e))
    }

    /// Copy this file to another location
    pub async fn copy_to(&self, dest: &File) -> Result<(), CliError> {
        fs::copy(&self.path, &dest.path).await.map_err(|e| {
            CliError::adapter(
                format!("copy {} to {}", self.path.display(), dest.path.display()),
                e,
            )
        })?;
        Ok(())
    }

    /// Delete the file
    pub async fn delete(&self) -> Result<(), CliError> {
        if self.exists().await {
            fs::remove_file(&self.path)
                .await
                .map_err(|e| CliError::adapter(format!("delete {}", self.path.display()), e))?;
        }
        Ok(())
    }
}

/// Give `path` the owner and group recorded in `previous`. Only root can hand
/// a file to another user; elsewhere a mismatch is logged and left as is.
fn keep_owner(path: &Path, previous: &std::fs::Metadata) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        let Ok(current) = std::fs::metadata(path) else {
            return;
        };
        if (current.uid(), current.gid()) == (previous.uid(), previous.gid()) {
            return;
        }
        if let Err(e) = std::os::unix::fs::chown(path, Some(previous.uid()), Some(previous.gid())) {
            warn!(
                "Could not restore owner {}:{} on {:?}: {}",
                previous.uid(),
                previous.gid(),
                path,
                e
            );
        }
    }
    #[cfg(not(unix))]
    let _ = (path, previous);
}

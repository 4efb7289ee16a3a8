//! Directory operations

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::CliError;
use crate::filesys::file::File;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// A directory wrapper with path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    path: PathBuf,
}

impl Dir {
    /// Create a new directory reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the directory exists
    pub async fn exists(&self) -> bool {
        fs::metadata(&self.path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    /// Create the directory (and parents)
    pub async fn create(&self) -> Result<(), CliError> {
        fs::create_dir_all(&self.path)
            .await
            .map_err(|e| CliError::adapter(format!("create {}", self.path.display()), e))
    }

    /// Delete the directory and all contents
    pub async fn delete(&self) -> Result<(), CliError> {
        if self.exists().await {
            fs::remove_dir_all(&self.path)
                .await
                .map_err(|e| CliError::adapter(format!("delete {}", self.path.display()), e))?;
        }
        Ok(())
    }

    /// Wipe the directory and create it again, empty
    pub async fn recreate(&self) -> Result<(), CliError> {
        self.delete().await?;
        self.create().await
    }

    /// List regular files in the directory
    pub async fn list_files(&self) -> Result<Vec<File>, CliError> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|(_, kind)| *kind == EntryKind::File)
            .map(|(path, _)| File::new(path))
            .collect())
    }

    /// List subdirectories
    pub async fn list_dirs(&self) -> Result<Vec<Dir>, CliError> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|(_, kind)| *kind == EntryKind::Dir)
            .map(|(path, _)| Dir::new(path))
            .collect())
    }

    async fn entries(&self) -> Result<Vec<(PathBuf, EntryKind)>, CliError> {
        let list = async {
            let mut found = Vec::new();
            let mut entries = fs::read_dir(&self.path).await?;
            while let Some(entry) = entries.next_entry().await? {
                // Not followed: a link is reported as a link
                let file_type = entry.file_type().await?;
                let kind = if file_type.is_symlink() {
                    EntryKind::Symlink
                } else if file_type.is_dir() {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                };
                found.push((entry.path(), kind));
            }
            Ok::<_, std::io::Error>(found)
        };
        list.await
            .map_err(|e| CliError::adapter(format!("list {}", self.path.display()), e))
    }

    /// Recursively copy the directory contents into `dest`. Symlinks are
    /// recreated as links with the same target, dangling ones included.
    pub async fn copy_to(&self, dest: &Dir) -> Result<(), CliError> {
        if dest.path.starts_with(&self.path) {
            return Err(CliError::adapter(
                format!("copy {} to {}", self.path.display(), dest.path.display()),
                "destination is inside the source directory",
            ));
        }

        let mut pending = vec![(self.clone(), dest.clone())];
        while let Some((from, to)) = pending.pop() {
            to.create().await?;
            for (path, kind) in from.entries().await? {
                let Some(name) = path.file_name() else {
                    continue;
                };
                let target = to.path.join(name);
                match kind {
                    EntryKind::Dir => pending.push((Dir::new(&path), Dir::new(target))),
                    EntryKind::Symlink => copy_link(&path, &target).await?,
                    EntryKind::File => File::new(&path).copy_to(&File::new(target)).await?,
                }
            }
        }
        Ok(())
    }

    /// Get a file within this directory
    pub fn file(&self, name: &str) -> File {
        File::new(self.path.join(name))
    }

    /// Get a subdirectory
    pub fn subdir(&self, name: &str) -> Dir {
        Dir::new(self.path.join(name))
    }
}

async fn copy_link(from: &Path, to: &Path) -> Result<(), CliError> {
    let operation = format!("copy link {} to {}", from.display(), to.display());
    let target = fs::read_link(from)
        .await
        .map_err(|e| CliError::adapter(&operation, e))?;

    #[cfg(unix)]
    let linked = fs::symlink(&target, to).await;
    #[cfg(not(unix))]
    let linked = fs::copy(from, to).await.map(|_| ());

    linked.map_err(|e| CliError::adapter(operation, e))
}

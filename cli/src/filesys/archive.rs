//! Gzip tarball extraction

use std::fs;

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::errors::CliError;
use crate::filesys::dir::Dir;
use crate::filesys::file::File;

/// Extract a gzip-compressed tar archive into `dest`.
///
/// Runs on the blocking pool; entries escaping `dest` are rejected by `tar`.
pub async fn extract_tar_gz(archive: &File, dest: &Dir) -> Result<(), CliError> {
    let archive_path = archive.path().to_path_buf();
    let dest_path = dest.path().to_path_buf();
    debug!("Extracting {:?} into {:?}", archive_path, dest_path);

    let operation = format!("extract {}", archive_path.display());
    tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        let reader = fs::File::open(&archive_path)?;
        let mut tarball = Archive::new(GzDecoder::new(reader));
        tarball.set_preserve_permissions(true);
        tarball.unpack(&dest_path)
    })
    .await
    .map_err(|e| CliError::adapter(operation.clone(), e))?
    .map_err(|e| CliError::adapter(operation, e))
}

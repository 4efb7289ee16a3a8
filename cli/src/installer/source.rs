//! Installer download

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};
use url::Url;

use crate::errors::CliError;
use crate::filesys::file::File;

#[async_trait]
pub trait InstallerSource: Send + Sync {
    /// Download the installer script at `url` into `dest`
    async fn fetch(&self, url: &Url, dest: &File) -> Result<(), CliError>;
}

/// Fetches installers over HTTPS. The client is built on the first fetch, so
/// only `update` ever sets up TLS.
#[derive(Default)]
pub struct HttpInstallerSource {
    client: OnceCell<Client>,
}

impl HttpInstallerSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self) -> Result<&Client, CliError> {
        self.client
            .get_or_try_init(|| async {
                Client::builder()
                    .connect_timeout(Duration::from_secs(15))
                    .timeout(Duration::from_secs(120))
                    .build()
            })
            .await
            .map_err(CliError::from)
    }
}

#[async_trait]
impl InstallerSource for HttpInstallerSource {
    async fn fetch(&self, url: &Url, dest: &File) -> Result<(), CliError> {
        debug!("GET {}", url);
        let response = self.client().await?.get(url.clone()).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Installer download failed: {}", status);
            return Err(CliError::adapter(
                format!("download installer from {}", url),
                status,
            ));
        }

        let body = response.bytes().await?;
        info!(
            "Downloaded installer ({} bytes, sha256 {})",
            body.len(),
            sha256_hex(&body)
        );
        dest.write_atomic(&body).await
    }
}

/// Lowercase hex SHA-256 digest
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

//! refresh-certificate

use std::io::Write;

use crate::app::context::Context;
use crate::app::runtime::Runtime;
use crate::config::conf_file::ConfigFile;
use crate::config::keys;
use crate::database::Database;
use crate::deploy::orchestrator::{args, ExecInput};
use crate::deploy::services;
use crate::errors::CliError;

const REFRESH_SCRIPT: &str = "/refresh-certificate.sh";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateMode {
    LetsEncrypt,
    Custom { cert: String, key: String },
    SelfSigned,
}

impl CertificateMode {
    /// Let's Encrypt when enabled in the live settings, else a custom
    /// certificate when one is configured, else self-signed
    pub async fn select(ctx: &Context, database: &dyn Database) -> Result<Self, CliError> {
        let use_lets_encrypt = database
            .read_setting_or(keys::live::USE_LETS_ENCRYPT, "false")
            .await?
            .eq_ignore_ascii_case("true");
        if use_lets_encrypt {
            return Ok(CertificateMode::LetsEncrypt);
        }

        let config = ConfigFile::new(ctx.config_file());
        let cert = config.read(keys::SSL_CERT, "").await?;
        if !cert.is_empty() {
            let key = config.read(keys::SSL_CERT_KEY, "").await?;
            return Ok(CertificateMode::Custom { cert, key });
        }
        Ok(CertificateMode::SelfSigned)
    }

    pub fn script_args(&self) -> Vec<String> {
        match self {
            CertificateMode::LetsEncrypt => args([REFRESH_SCRIPT, "--lets-encrypt"]),
            CertificateMode::Custom { cert, key } => {
                args([REFRESH_SCRIPT, "--custom", cert.as_str(), key.as_str()])
            }
            CertificateMode::SelfSigned => args([REFRESH_SCRIPT, "--self-signed"]),
        }
    }
}

pub async fn refresh_certificate(rt: &mut Runtime<'_>) -> Result<CertificateMode, CliError> {
    let mode = CertificateMode::select(rt.ctx, rt.database).await?;
    writeln!(rt.out, "Refreshing certificate ({:?})...", mode)?;
    rt.orchestrator
        .exec(services::PROXY, mode.script_args(), ExecInput::Inherit)
        .await?;
    writeln!(rt.out, "Certificate refreshed.")?;
    Ok(mode)
}

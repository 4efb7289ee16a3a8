//! Logging configuration
//!
//! Diagnostics go to stderr (and optionally a file) so that operator output on
//! stdout stays clean.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::CliError;

/// Log level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_filter_string(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Logging options
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Log level, used when RUST_LOG is not set
    pub log_level: LogLevel,

    /// Enable JSON format on stderr
    pub json_format: bool,

    /// Also append plain-text logs to this file
    pub log_file: Option<PathBuf>,
}

impl LogOptions {
    /// Read `UNMS_CLI_LOG`, `UNMS_CLI_LOG_FORMAT` and `UNMS_CLI_LOG_FILE`
    pub fn from_env() -> Self {
        let log_level = std::env::var("UNMS_CLI_LOG")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let json_format = std::env::var("UNMS_CLI_LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let log_file = std::env::var_os("UNMS_CLI_LOG_FILE").map(PathBuf::from);
        Self {
            log_level,
            json_format,
            log_file,
        }
    }
}

/// Initialize logging
pub fn init_logging(options: LogOptions) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.log_level.to_filter_string()));

    let file_layer = match &options.log_file {
        Some(path) => {
            let dir = path.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| CliError::ConfigError(format!("Invalid log file: {:?}", path)))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(name)
                .build(dir)
                .map_err(|e| CliError::ConfigError(e.to_string()))?;
            Some(fmt::layer().with_ansi(false).with_writer(appender))
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(file_layer);

    if options.json_format {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| CliError::ConfigError(e.to_string()))?;
    }

    Ok(())
}

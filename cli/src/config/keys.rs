//! Names of the settings this tool manages

/// Config file / descriptor keys
pub const UCRM_ENABLED: &str = "UCRM_ENABLED";
pub const WORKERS: &str = "WORKERS";
pub const IP_WHITELIST: &str = "IP_WHITELIST";
pub const NETFLOW_PORT: &str = "NETFLOW_PORT";
pub const BRANCH: &str = "BRANCH";
pub const SSL_CERT: &str = "SSL_CERT";
pub const SSL_CERT_KEY: &str = "SSL_CERT_KEY";
pub const VERSION: &str = "VERSION";

pub const DEFAULT_WORKERS: &str = "auto";
pub const DEFAULT_NETFLOW_PORT: &str = "2055";
pub const DEFAULT_BRANCH: &str = "master";

/// Live settings store names
pub mod live {
    pub const UCRM_ENABLED: &str = "ucrmEnabled";
    pub const USE_LETS_ENCRYPT: &str = "useLetsEncrypt";
    pub const DEVICE_TRANSMISSION_PROFILE: &str = "deviceTransmissionProfile";
}

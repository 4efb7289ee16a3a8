//! Service names in the deployment descriptor

pub const APP: &str = "unms";
pub const POSTGRES: &str = "postgres";
pub const REDIS: &str = "redis";
pub const PROXY: &str = "nginx";

/// Services brought up by `start`; the rest follow as dependencies
pub const PRIMARY: &[&str] = &[APP, PROXY];

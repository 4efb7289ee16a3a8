//! Persisted configuration: the flat config file and the deployment descriptor

pub mod conf_file;
pub mod descriptor;
pub mod keys;
pub mod mirror;

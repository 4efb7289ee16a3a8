//! Installer download, update and rollback

pub mod runner;
pub mod source;
pub mod update;
pub mod version;

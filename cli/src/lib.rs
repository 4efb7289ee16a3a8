//! UNMS CLI Library
//!
//! Lifecycle and maintenance commands for a containerized UNMS installation.

pub mod app;
pub mod commands;
pub mod config;
pub mod database;
pub mod deploy;
pub mod errors;
pub mod filesys;
pub mod installer;
pub mod logs;
pub mod prompt;

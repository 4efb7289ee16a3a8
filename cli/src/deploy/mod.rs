//! Deployment orchestration

pub mod compose;
pub mod conntrack;
pub mod orchestrator;
pub mod services;

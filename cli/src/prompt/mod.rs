//! Operator prompts

pub mod confirm;

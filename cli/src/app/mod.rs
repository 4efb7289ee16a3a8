//! Invocation context and command dispatch

pub mod context;
pub mod run;
pub mod runtime;

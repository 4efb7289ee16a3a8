//! Adapters and I/O handed to every command handler

use std::io::{BufRead, Write};

use crate::app::context::Context;
use crate::database::Database;
use crate::deploy::conntrack::Conntrack;
use crate::deploy::orchestrator::Orchestrator;
use crate::installer::runner::ScriptRunner;
use crate::installer::source::InstallerSource;

pub struct Runtime<'a> {
    pub ctx: &'a Context,
    pub orchestrator: &'a dyn Orchestrator,
    pub database: &'a dyn Database,
    pub conntrack: &'a dyn Conntrack,
    pub installer: &'a dyn InstallerSource,
    pub scripts: &'a dyn ScriptRunner,

    /// Operator answers for confirmation prompts
    pub input: &'a mut dyn BufRead,

    /// Operator-facing output
    pub out: &'a mut dyn Write,
}

//! Redis append-only file maintenance.
//!
//! `fix` works on the file on disk and must only run while Redis is down;
//! `rewrite` asks the live Redis to compact it. The guard keeps the two apart.

use std::io::Write;

use crate::app::runtime::Runtime;
use crate::deploy::orchestrator::{args, ExecInput};
use crate::deploy::services;
use crate::errors::CliError;

const AOF_PATH: &str = "/data/appendonly.aof";

pub async fn fix_redis_aof(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    // redis-check-aof asks before truncating a damaged tail
    let out = rt
        .orchestrator
        .run_oneoff(
            services::REDIS,
            args(["redis-check-aof", "--fix", AOF_PATH]),
            ExecInput::Feed("y\n".to_string()),
        )
        .await?;
    write!(rt.out, "{}", out)?;
    writeln!(rt.out, "Redis append-only file checked and repaired.")?;
    Ok(())
}

pub async fn rewrite_redis_aof(rt: &mut Runtime<'_>) -> Result<(), CliError> {
    let out = rt
        .orchestrator
        .exec(services::REDIS, args(["redis-cli", "BGREWRITEAOF"]), ExecInput::None)
        .await?;
    writeln!(rt.out, "{}", out.trim())?;
    Ok(())
}

//! Command dispatch

use std::time::Duration;

use tracing::info;

use crate::app::context::{Context, InstallerUrls};
use crate::app::runtime::Runtime;
use crate::commands::users::UserAction;
use crate::commands::{
    certificate, device_backups, device_updates, guard, ip_whitelist, lifecycle, redis, restore,
    ucrm, update, users, workers, Command, GlobalOptions,
};
use crate::errors::CliError;
use crate::installer::update::UpdateRequest;

/// Build the invocation context from the global options
pub fn build_context(options: &GlobalOptions) -> Result<Context, CliError> {
    let urls = InstallerUrls::parse(&options.installer_url, &options.legacy_installer_url)?;
    let mut ctx = Context::new(&options.app_dir, &options.data_dir, urls);
    ctx.project_name = options.project.clone();
    ctx.restart_delay = Duration::from_secs(options.restart_delay_secs);
    ctx.update_dir = options.update_dir.clone();
    Ok(ctx)
}

/// Check the command's precondition, then run its handler
pub async fn run(command: &Command, rt: &mut Runtime<'_>) -> Result<(), CliError> {
    info!("Running {:?}", command);
    guard::check(command.precondition(), rt.orchestrator, rt.ctx).await?;

    match command {
        Command::Start => lifecycle::start(rt).await,
        Command::Stop => lifecycle::stop(rt).await,
        Command::Restart => lifecycle::restart(rt).await,
        Command::ClearConntrack => lifecycle::clear_conntrack(rt).await,
        Command::Ucrm(args) => ucrm::ucrm(rt, args.desired()).await.map(|_| ()),
        Command::IpWhitelist(args) => ip_whitelist::ip_whitelist(rt, args.action())
            .await
            .map(|_| ()),
        Command::SetWorkers(args) => workers::set_workers(rt, args.count).await.map(|_| ()),
        Command::ClearDeviceBackups => device_backups::clear_device_backups(rt).await.map(|_| ()),
        Command::FixRedisAof => redis::fix_redis_aof(rt).await,
        Command::RewriteRedisAof => redis::rewrite_redis_aof(rt).await,
        Command::RefreshCertificate => certificate::refresh_certificate(rt).await.map(|_| ()),
        Command::ReduceDeviceUpdateFrequency => {
            device_updates::reduce_device_update_frequency(rt).await
        }
        Command::DisableTwoFactor(args) => {
            users::user_action(rt, UserAction::DisableTwoFactor, args.username.as_deref()).await
        }
        Command::SetPassword(args) => {
            users::user_action(rt, UserAction::SetPassword, args.username.as_deref()).await
        }
        Command::SetSuperadmin(args) => {
            users::user_action(rt, UserAction::SetSuperadmin, args.username.as_deref()).await
        }
        Command::RestoreBackup(args) => restore::restore_backup(rt, args.file.as_deref())
            .await
            .map(|_| ()),
        Command::Update(args) => {
            let request = UpdateRequest {
                version: args.version.clone(),
                unattended: args.unattended,
            };
            update::update(rt, &request).await
        }
    }
}

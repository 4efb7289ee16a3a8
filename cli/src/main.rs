//! UNMS CLI - Entry Point
//!
//! Operator tool for starting, stopping, updating and maintaining a UNMS
//! installation.

use std::sync::Arc;

use colored::Colorize;
use tracing::error;

use unms_cli::app::run::{build_context, run};
use unms_cli::app::runtime::Runtime;
use unms_cli::commands::{parse_args, Cli, Invocation};
use unms_cli::database::psql::PsqlDatabase;
use unms_cli::deploy::compose::DockerCompose;
use unms_cli::deploy::conntrack::HostConntrack;
use unms_cli::errors::CliError;
use unms_cli::installer::runner::BashRunner;
use unms_cli::installer::source::HttpInstallerSource;
use unms_cli::logs::{init_logging, LogOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match parse_args(std::env::args_os()) {
        Ok(Invocation::Run(cli)) => cli,
        Ok(Invocation::Info(text)) => {
            print!("{}", text);
            return;
        }
        Err(e) => {
            report(&e);
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = init_logging(LogOptions::from_env()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = execute(&cli).await {
        error!("Command failed: {}", e);
        report(&e);
        std::process::exit(e.exit_code());
    }
}

async fn execute(cli: &Cli) -> Result<(), CliError> {
    let ctx = build_context(&cli.global)?;

    let compose = Arc::new(DockerCompose::new(&ctx.project_name, ctx.descriptor_file().path()));
    let database = PsqlDatabase::new(compose.clone());
    let installer = HttpInstallerSource::new();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut rt = Runtime {
        ctx: &ctx,
        orchestrator: compose.as_ref(),
        database: &database,
        conntrack: &HostConntrack,
        installer: &installer,
        scripts: &BashRunner,
        input: &mut input,
        out: &mut out,
    };
    run(&cli.command, &mut rt).await
}

fn report(e: &CliError) {
    match e {
        CliError::UsageError(usage) => eprint!("{}", usage),
        CliError::ConfirmationDeclined => {}
        CliError::PreconditionError { message, remedy } => {
            eprintln!("{}\n{}", message.red(), remedy)
        }
        other => eprintln!("{} {}", "[ERROR]".red(), other),
    }
}

//! AWS Janitor CLI - delete cloud resources that outlive their TTL.

use clap::Parser;
use janitor_aws::{current_account_id, registry, AwsContext, S3StateStore};
use janitor_cli::commands;
use janitor_cli::{logging, Cli, CliError, Command, Config, Formatter, StateLocation};
use janitor_core::Janitor;
use janitor_domain::{ResourceType, Scope, StateStore};
use janitor_store::FileStateStore;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    // Argument errors exit with 2 from inside clap
    let cli = Cli::parse();
    logging::init(cli.global.verbose, cli.global.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> janitor_cli::Result<()> {
    let mut config = Config::load(cli.global.config.as_deref())?;
    config.apply_args(&cli.global);

    let command = cli.command.unwrap_or(Command::Sweep);
    if let Command::Watch(args) = &command {
        if let Some(minutes) = args.interval_minutes {
            config.janitor.sweep_interval_minutes = minutes;
        }
    }
    config.validate(registry::TYPE_NAMES)?;
    if let Command::Purge(args) = &command {
        commands::purge::confirm(args, config.janitor.dry_run)?;
    }

    let home_region = config.regions[0].clone();
    let ctx = AwsContext::load(config.profile.as_deref(), &home_region).await;
    let account = match &config.account {
        Some(account) => account.clone(),
        None => current_account_id(&ctx)
            .await
            .map_err(|e| CliError::Aws(format!("{:#}", e)))?,
    };

    let formatter = Formatter::new(config.format, config.color);
    let types = registry::regional_types(&ctx);

    match config.state_location()? {
        StateLocation::S3(location) => {
            info!(state = %location, "Using S3 state");
            let store = Arc::new(S3StateStore::from_context(&ctx, location));
            dispatch(command, &config, types, store, &account, &formatter).await
        }
        StateLocation::Dir(dir) => {
            info!(state = %dir.display(), "Using local state");
            let store = Arc::new(FileStateStore::new(dir));
            dispatch(command, &config, types, store, &account, &formatter).await
        }
    }
}

async fn dispatch<S: StateStore>(
    command: Command,
    config: &Config,
    types: Vec<Arc<dyn ResourceType>>,
    store: Arc<S>,
    account: &str,
    formatter: &Formatter,
) -> janitor_cli::Result<()> {
    let mut janitor = Janitor::new(config.janitor.clone(), types, store);
    let scopes: Vec<Scope> = config
        .regions
        .iter()
        .map(|region| janitor.scope(account, region.as_str()))
        .collect();
    let cancel = CancellationToken::new();

    match command {
        Command::Sweep => {
            commands::cancel_on_ctrl_c(&cancel);
            commands::execute_sweep(&mut janitor, &scopes, &cancel, formatter).await
        }
        Command::Purge(_) => {
            commands::cancel_on_ctrl_c(&cancel);
            commands::execute_purge(&mut janitor, &scopes, &cancel, formatter).await
        }
        Command::List => commands::execute_list(&janitor, &scopes, formatter).await,
        Command::Watch(args) => {
            commands::execute_watch(janitor, scopes, args.cycles, cancel, formatter).await
        }
    }
}

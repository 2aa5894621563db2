//! Neptune console.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use neptune_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    Context, run_accounts, run_config, run_dashboard, run_entry, run_login, run_logout,
    run_rebate_targets, run_status,
};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let ctx = Context::load(cli.config.as_deref(), cli.base_url.clone());
    let result = match &cli.command {
        Command::Login(args) => run_login(&ctx, args).await,
        Command::Logout => run_logout(&ctx).await,
        Command::Status => run_status(&ctx),
        Command::Entry(args) => run_entry(&ctx, args).await,
        Command::Accounts(args) => run_accounts(&ctx, args).await,
        Command::RebateTargets(args) => run_rebate_targets(&ctx, args).await,
        Command::Dashboard(args) => run_dashboard(&ctx, args).await,
        Command::Config(args) => run_config(&ctx, args),
    };

    if let Err(error) = result {
        tracing::error!(error = %format!("{error:#}"), "Command failed");
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig::default()
        .with_level_filter(cli.verbosity.tracing_level_filter())
        .with_env_filter(!(cli.verbosity.is_present() || cli.log_level.is_some()));
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

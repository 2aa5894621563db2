//! CLI argument definitions for the Neptune console.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use neptune_catalog::{CostType, PurchaseType, RebateTargetKind, SavingsMetric};

#[derive(Parser)]
#[command(
    name = "neptune",
    version,
    about = "Neptune console - log in and enter rep-case devices",
    long_about = "Log in to a Neptune server and walk the device catalog.\n\n\
                  Devices are narrowed by specialty, category and manufacturer;\n\
                  bulk purchases then offer the serial identifiers in stock."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: platform config folder).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL (overrides the settings file).
    #[arg(long = "base-url", value_name = "URL", env = "NEPTUNE_BASE_URL", global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and keep the session for later commands.
    Login(LoginArgs),

    /// End the session on the server and locally.
    Logout,

    /// Show the current session.
    Status,

    /// Walk the device cascade for one rep-case row.
    Entry(EntryArgs),

    /// List the owner and physician accounts of a client.
    Accounts(ClientArgs),

    /// List what a manufacturer offers rebates on.
    RebateTargets(RebateArgs),

    /// Show marketshare, savings and bulk inventory for a client.
    Dashboard(DashboardArgs),

    /// Show or change the settings.
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    /// Account password.
    #[arg(long, env = "NEPTUNE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct ClientArgs {
    /// Client id (default: settings, then the logged-in admin's client).
    #[arg(long = "client", value_name = "ID")]
    pub client: Option<i64>,
}

#[derive(Args)]
pub struct EntryArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    #[arg(long)]
    pub specialty: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Device id.
    #[arg(long, value_name = "ID")]
    pub device: Option<String>,

    #[arg(long = "purchase-type", value_enum, default_value = "bulk")]
    pub purchase_type: PurchaseTypeArg,

    /// Serial or lot identifier.
    #[arg(long)]
    pub identifier: Option<String>,

    /// Override the cost type derived from the identifier.
    #[arg(long = "cost-type", value_enum)]
    pub cost_type: Option<CostTypeArg>,

    /// Discount ids to apply.
    #[arg(long = "discount", value_name = "ID")]
    pub discounts: Vec<String>,
}

#[derive(Args)]
pub struct RebateArgs {
    /// Manufacturer id.
    #[arg(long, value_name = "ID")]
    pub manufacturer: i64,

    #[arg(long, value_enum)]
    pub kind: RebateKindArg,
}

#[derive(Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Monthly series to chart.
    #[arg(long, value_enum, default_value = "savings")]
    pub metric: SavingsMetricArg,

    /// Savings year (default: current year).
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Store a new server base URL.
    #[arg(long = "set-base-url", value_name = "URL")]
    pub set_base_url: Option<String>,

    /// Store a default client id.
    #[arg(long = "set-client", value_name = "ID")]
    pub set_client: Option<i64>,

    /// Store a request timeout in seconds.
    #[arg(long = "set-timeout", value_name = "SECS")]
    pub set_timeout: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PurchaseTypeArg {
    Bulk,
    Consignment,
}

impl From<PurchaseTypeArg> for PurchaseType {
    fn from(arg: PurchaseTypeArg) -> Self {
        match arg {
            PurchaseTypeArg::Bulk => PurchaseType::Bulk,
            PurchaseTypeArg::Consignment => PurchaseType::Consignment,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CostTypeArg {
    Unit,
    System,
}

impl From<CostTypeArg> for CostType {
    fn from(arg: CostTypeArg) -> Self {
        match arg {
            CostTypeArg::Unit => CostType::Unit,
            CostTypeArg::System => CostType::System,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RebateKindArg {
    Product,
    Category,
    Specialty,
}

impl From<RebateKindArg> for RebateTargetKind {
    fn from(arg: RebateKindArg) -> Self {
        match arg {
            RebateKindArg::Product => RebateTargetKind::Product,
            RebateKindArg::Category => RebateTargetKind::Category,
            RebateKindArg::Specialty => RebateTargetKind::Specialty,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SavingsMetricArg {
    Savings,
    Spend,
    Percent,
}

impl From<SavingsMetricArg> for SavingsMetric {
    fn from(arg: SavingsMetricArg) -> Self {
        match arg {
            SavingsMetricArg::Savings => SavingsMetric::Savings,
            SavingsMetricArg::Spend => SavingsMetric::Spend,
            SavingsMetricArg::Percent => SavingsMetric::Percent,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    cause::CauseCommands,
    completions::CompletionsArgs,
    control::ControlCommands,
    goal::GoalCommands,
    init::InitArgs,
    monitor::MonitorCommands,
    risk::RiskCommands,
    session::SessionCommands,
    status::StatusArgs,
};

#[derive(Parser)]
#[command(name = "rrt")]
#[command(author, version, about = "Risk Register Toolkit")]
#[command(
    long_about = "A plain-text risk register: goals, potential risks, risk causes, control measures and monitoring sessions as YAML files under version control."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .rrt/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Register owner (default: config, then $RRT_USER, then OS user)
    #[arg(long, global = true, env = "RRT_USER")]
    pub user: Option<String>,

    /// Active register period (default: config, then current year)
    #[arg(long, global = true, env = "RRT_PERIOD")]
    pub period: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new RRT project
    Init(InitArgs),

    /// Goal management (register roots)
    #[command(subcommand)]
    Goal(GoalCommands),

    /// Potential risk management
    #[command(subcommand)]
    Risk(RiskCommands),

    /// Risk cause management and analysis
    #[command(subcommand)]
    Cause(CauseCommands),

    /// Control measure management
    #[command(subcommand)]
    Control(ControlCommands),

    /// Monitoring session management
    #[command(subcommand)]
    Session(SessionCommands),

    /// Exposure recording inside monitoring sessions
    #[command(subcommand)]
    Monitor(MonitorCommands),

    /// Show register status dashboard
    Status(StatusArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// Just IDs, one per line
    Id,
}

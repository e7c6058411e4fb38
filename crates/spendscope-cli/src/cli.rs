//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Spendscope - Explore where the money went
#[derive(Parser)]
#[command(name = "spendscope")]
#[command(about = "Expense analytics dashboard for CSV exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Analysis config file (defaults to the data dir override, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter controls shared by the data commands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Start date (YYYY-MM-DD); alone, selects that single day
    #[arg(long)]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD); alone, covers everything up to that day
    #[arg(long)]
    pub to: Option<String>,

    /// Expense category to include (repeatable; none means all)
    #[arg(short, long = "category")]
    pub categories: Vec<String>,

    /// Single user to include ("all" for everyone)
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an expense file and print the dashboard
    Analyze {
        /// Expense file to analyze (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Rolling mean window in days (overrides config)
        #[arg(long)]
        window: Option<usize>,

        /// Outlier z-score threshold (overrides config)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Export the filtered records as CSV
    Export {
        /// Expense file to read (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show the available filter values for a file
    Options {
        /// Expense file to inspect (.csv or .xlsx)
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

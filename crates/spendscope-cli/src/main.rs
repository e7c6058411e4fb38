//! Spendscope CLI - Expense analytics dashboard
//!
//! Usage:
//!   spendscope analyze --file CSV      Print KPIs, trend, outliers, breakdowns
//!   spendscope export --file CSV -o O  Write the filtered records
//!   spendscope options --file CSV      List dates, categories and users
//!   spendscope serve --port 3000       Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use spendscope_core::AnalysisConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    // Logs go to stderr so JSON and CSV output stay clean on stdout
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let config = AnalysisConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            file,
            filters,
            format,
            window,
            threshold,
        } => {
            let config = commands::apply_overrides(config, window, threshold)?;
            commands::cmd_analyze(&config, &file, &filters, format)
        }
        Commands::Export {
            file,
            output,
            filters,
        } => commands::cmd_export(&config, &file, &filters, output.as_deref()),
        Commands::Options { file, format } => commands::cmd_options(&config, &file, format),
        Commands::Serve { port, host } => commands::cmd_serve(config, &host, port).await,
    }
}

//! Filter options command

use std::path::Path;

use anyhow::Result;
use spendscope_core::filter::filter_options;
use spendscope_core::AnalysisConfig;

use super::load_file;
use crate::cli::OutputFormat;

pub fn cmd_options(config: &AnalysisConfig, file: &Path, format: OutputFormat) -> Result<()> {
    let normalized = load_file(config, file)?;
    let options = filter_options(&normalized.records);

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    println!();
    println!("🔎 Filter Options");
    println!("   ─────────────────────────────────────────────────────────────");
    match (options.min_date, options.max_date) {
        (Some(min), Some(max)) => println!("   Dates:      {} to {}", min, max),
        _ => println!("   Dates:      (no records)"),
    }
    println!("   Records:    {}", normalized.records.len());

    println!();
    println!("   Categories ({}):", options.categories.len());
    for category in &options.categories {
        println!("     • {}", category);
    }

    println!();
    println!("   Users ({}):", options.users.len());
    for user in &options.users {
        println!("     • {}", user);
    }

    Ok(())
}

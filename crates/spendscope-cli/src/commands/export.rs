//! Filtered CSV export command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use spendscope_core::filter::filter;
use spendscope_core::{write_csv, AnalysisConfig};

use super::{filter_spec, load_file};
use crate::cli::FilterArgs;

/// Export the filtered records, to a file or stdout
pub fn cmd_export(
    config: &AnalysisConfig,
    file: &Path,
    filters: &FilterArgs,
    output: Option<&Path>,
) -> Result<()> {
    let normalized = load_file(config, file)?;
    let filtered = filter(&normalized.records, &filter_spec(filters));

    match output {
        Some(path) => {
            let out = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            write_csv(&filtered.records, out)?;
            println!(
                "✅ Exported {} of {} records to {}",
                filtered.applied.matched_records,
                filtered.applied.input_records,
                path.display()
            );
        }
        None => {
            // Write to stdout
            write_csv(&filtered.records, std::io::stdout().lock())?;
        }
    }

    Ok(())
}

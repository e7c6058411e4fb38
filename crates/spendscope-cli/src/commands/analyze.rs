//! Dashboard report command

use std::path::Path;

use anyhow::Result;
use spendscope_core::distribution::DistributionSummary;
use spendscope_core::filter::{AppliedFilter, CategoryFilter, RangeRecovery, UserFilter};
use spendscope_core::models::AmountSummary;
use spendscope_core::{analyze, Analysis, AnalysisConfig, CrossTab, Dashboard};

use super::{filter_spec, load_file, truncate};
use crate::cli::{FilterArgs, OutputFormat};

const BAR_WIDTH: usize = 30;

pub fn cmd_analyze(
    config: &AnalysisConfig,
    file: &Path,
    filters: &FilterArgs,
    format: OutputFormat,
) -> Result<()> {
    let normalized = load_file(config, file)?;
    let analysis = analyze(&normalized.records, &filter_spec(filters), config);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
        OutputFormat::Text => {
            if normalized.dropped_rows > 0 {
                println!(
                    "⚠️  Skipped {} row(s) with an invalid date or amount",
                    normalized.dropped_rows
                );
            }
            if !normalized.missing_recommended.is_empty() {
                println!(
                    "⚠️  Missing recommended column(s): {}",
                    normalized.missing_recommended.join(", ")
                );
            }
            print_analysis(&analysis, config);
        }
    }

    Ok(())
}

fn print_analysis(analysis: &Analysis, config: &AnalysisConfig) {
    print_header(analysis.applied());

    let dashboard = match analysis {
        Analysis::Empty { .. } => {
            println!("   No data available for the selected filters.");
            return;
        }
        Analysis::Report(dashboard) => dashboard,
    };

    print_kpis(dashboard);
    print_trend(dashboard, config);
    print_outliers(dashboard, config);
    print_summary("🏷️  By Category", "Category", &dashboard.categories);
    print_summary("👤 By User", "User", &dashboard.users);
    if let Some(tab) = &dashboard.crosstab {
        print_crosstab(tab);
    }
    print_distribution(&dashboard.distribution);
}

/// Human-readable description of the filter actually applied
pub fn describe_filter(applied: &AppliedFilter) -> String {
    let period = match &applied.range {
        Some(range) if range.start == range.end => range.start.to_string(),
        Some(range) => format!("{} to {}", range.start, range.end),
        None => "all dates".to_string(),
    };
    let categories = match &applied.categories {
        CategoryFilter::All => "all".to_string(),
        CategoryFilter::Only(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
    };
    let user = match &applied.user {
        UserFilter::All => "all",
        UserFilter::Only(user) => user.as_str(),
    };
    format!("{} │ categories: {} │ user: {}", period, categories, user)
}

fn print_header(applied: &AppliedFilter) {
    println!();
    println!("📊 Expense Dashboard");
    println!("   {}", describe_filter(applied));
    match applied.range.and_then(|r| r.recovered) {
        Some(RangeRecovery::Inverted) => {
            println!("   ⚠️  Start date is after end date; showing the full date range")
        }
        Some(RangeRecovery::Unparseable) => {
            println!("   ⚠️  Could not read the date range; showing the full date range")
        }
        None => {}
    }
    println!(
        "   Records: {} of {}",
        applied.matched_records, applied.input_records
    );
    println!("   ─────────────────────────────────────────────────────────────");
}

fn print_kpis(dashboard: &Dashboard) {
    let kpis = &dashboard.kpis;
    println!("   Total spend:      {:>12.2}", kpis.total_spend);
    println!("   Average daily:    {:>12.2}", kpis.average_daily);
    if let Some(max) = kpis.max_day {
        println!("   Highest day:      {:>12.2}  ({})", max.amount, max.date);
    }
    println!("   Days with spend:  {:>12}", kpis.day_count);
}

fn print_trend(dashboard: &Dashboard, config: &AnalysisConfig) {
    println!();
    println!(
        "📈 Daily Trend ({}-day rolling mean)",
        config.rolling_window
    );
    println!("   {:10} │ {:>10} │ {:>10} │", "Date", "Amount", "Rolling");
    println!("   ───────────┼────────────┼────────────┼────");
    for (point, flag) in dashboard.trend.iter().zip(&dashboard.outliers) {
        println!(
            "   {:10} │ {:>10.2} │ {:>10.2} │ {}",
            point.date,
            point.amount,
            point.rolling_mean,
            if flag.is_outlier { "🚨" } else { "" }
        );
    }
}

fn print_outliers(dashboard: &Dashboard, config: &AnalysisConfig) {
    let days = dashboard.outlier_days();
    println!();
    println!("🚨 Outlier Days (z ≥ {:.1})", config.outlier_threshold);
    if days.is_empty() {
        println!("   None");
        return;
    }
    for day in days {
        println!(
            "   {} │ {:>10.2} │ z = {:.2}",
            day.date, day.amount, day.z_score
        );
    }
}

fn print_summary(title: &str, label: &str, summary: &AmountSummary) {
    println!();
    println!("{}", title);
    if summary.is_empty() {
        println!("   No {} data", label.to_lowercase());
        return;
    }

    let total = summary.total();
    println!("   {:25} │ {:>10} │ {:>6}", label, "Amount", "%");
    println!("   ──────────────────────────┼────────────┼────────");
    for (key, amount) in summary.sorted_desc() {
        let pct = if total != 0.0 {
            amount / total * 100.0
        } else {
            0.0
        };
        println!(
            "   {:25} │ {:>10.2} │ {:>5.1}%",
            truncate(&key, 25),
            amount,
            pct
        );
    }
}

fn print_crosstab(tab: &CrossTab) {
    println!();
    println!("🗓️  Weekday × Month");
    let header: Vec<String> = tab
        .months
        .iter()
        .map(|m| format!("{:>9}", &m.as_str()[..3]))
        .collect();
    println!("   {:9} │{}", "", header.join(""));
    for (day, row) in tab.weekdays.iter().zip(tab.filled()) {
        let cells: Vec<String> = row.iter().map(|amount| format!("{:>9.2}", amount)).collect();
        println!("   {:9} │{}", day.as_str(), cells.join(""));
    }
}

fn print_distribution(distribution: &DistributionSummary) {
    println!();
    println!("📦 Amount Distribution");

    if let Some(stats) = &distribution.boxplot {
        println!(
            "   min {:.2} │ q1 {:.2} │ median {:.2} │ q3 {:.2} │ max {:.2}",
            stats.min, stats.q1, stats.median, stats.q3, stats.max
        );
        println!(
            "   whiskers {:.2} .. {:.2} │ {} outlier value(s)",
            stats.whisker_low,
            stats.whisker_high,
            stats.outliers.len()
        );
    }

    let peak = distribution
        .histogram
        .bins
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    if peak == 0 {
        return;
    }
    println!();
    for bin in distribution.histogram.bins.iter().filter(|b| b.count > 0) {
        let width = (bin.count * BAR_WIDTH).div_ceil(peak);
        println!(
            "   {:>10.2} – {:<10.2} │ {:<width$} {}",
            bin.lower,
            bin.upper,
            "█".repeat(width),
            bin.count,
            width = BAR_WIDTH
        );
    }
}

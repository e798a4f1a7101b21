//! CLI entry point for the report generator.

use anyhow::{Result, anyhow};
use clap::Parser;
use data_insight::{
    DEFAULT_REPORT_FILENAME, DataProfiler, ReportConfig, ReportGenerator, TemplateSource,
    load_csv_path,
};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    author = "Data Insight Team",
    version,
    about = "Exploratory data analysis reports for CSV files",
    long_about = "Generates a self-contained HTML report with column statistics,\n\
                  correlations, distributions and relationship plots.\n\n\
                  EXAMPLES:\n  \
                  # Report with the bundled template\n  \
                  data-insight -i data.csv\n\n  \
                  # Custom title, template and output path\n  \
                  data-insight -i data.csv -t my_template.html --title \"Churn\" -o out/churn.html\n\n  \
                  # Print column types and statistics only\n  \
                  data-insight -i data.csv --dry-run"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the HTML report
    #[arg(short, long, default_value = DEFAULT_REPORT_FILENAME)]
    output: PathBuf,

    /// Template file to use instead of the bundled one
    #[arg(short, long, env = "REPORT_TEMPLATE")]
    template: Option<PathBuf>,

    /// Report title
    #[arg(long, default_value = data_insight::config::DEFAULT_TITLE)]
    title: String,

    /// Maximum rows used for distribution plots
    #[arg(long, default_value_t = data_insight::config::DEFAULT_PLOT_SAMPLE_CAP)]
    plot_sample_cap: usize,

    /// Maximum rows used for relationship plots
    #[arg(long, default_value_t = data_insight::config::DEFAULT_RELATIONSHIP_SAMPLE_CAP)]
    relationship_sample_cap: usize,

    /// Print column types and statistics without rendering a report
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` takes precedence over the command-line level.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables from .env file before clap reads them
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = ReportConfig::builder()
        .title(&args.title)
        .plot_sample_cap(args.plot_sample_cap)
        .relationship_sample_cap(args.relationship_sample_cap)
        .build()?;

    if args.dry_run {
        return run_dry_run(&args.input, &config);
    }

    let template = match &args.template {
        Some(path) => TemplateSource::File(path.clone()),
        None => TemplateSource::Bundled,
    };

    info!("Generating report for {}", args.input.display());
    let generator = ReportGenerator::new(config)?;
    let html = match generator.generate_report_from_path(&args.input, &template) {
        Ok(html) => html,
        Err(e) => {
            error!("Report generation failed [{}]: {}", e.error_code(), e);
            return Err(e.into());
        }
    };

    ReportGenerator::save_report(&html, &args.output)?;
    println!("Report written to {}", args.output.display());
    Ok(())
}

/// Print the column profile table.
///
/// Uses `println!` on purpose: this output is the result of the command and
/// must show regardless of the log level.
fn run_dry_run(input: &Path, config: &ReportConfig) -> Result<()> {
    let dataset = load_csv_path(input)?;
    let profile = DataProfiler::profile_dataset(&dataset, config)?;
    let meta = &profile.metadata;

    println!("\n{}", "=".repeat(80));
    println!("DATASET OVERVIEW");
    println!("{}", "=".repeat(80));
    println!("  File: {}", input.display());
    println!("  Rows: {}", meta.total_rows);
    println!("  Columns: {}", meta.total_columns);
    println!(
        "  Missing cells: {} ({:.1}%)",
        meta.missing_cells, meta.missing_cells_pct
    );
    println!(
        "  Duplicate rows: {} ({:.1}%)",
        meta.duplicate_rows, meta.duplicate_pct
    );
    println!("  Skipped rows: {}", meta.skipped_rows);
    println!();

    println!(
        "{:<24} {:<12} {:<10} {:<10} {:<12} {:<12}",
        "Column", "Type", "Missing %", "Unique", "Mean", "Top value"
    );
    println!("{}", "-".repeat(80));
    for col in &profile.columns {
        let mean = col
            .numeric
            .as_ref()
            .map(|s| format!("{:.4}", s.mean))
            .unwrap_or_else(|| "-".to_string());
        let top = col
            .top_values
            .first()
            .map(|t| truncate_str(&t.value, 12))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<24} {:<12} {:<10.1} {:<10} {:<12} {:<12}",
            truncate_str(&col.name, 23),
            col.kind,
            col.missing_pct,
            col.unique,
            mean,
            top
        );
    }

    for skipped in dataset.skipped_rows().iter().take(10) {
        println!("  skipped line {}: {}", skipped.line, skipped.reason);
    }
    Ok(())
}

/// Truncate a string to at most `max` characters, adding an ellipsis.
fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

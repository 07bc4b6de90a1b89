//! CLI entry point for the dataset cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use dqi_cleaner::{
    CleaningConfig, CleaningPipeline, CleaningReport, ImputationMode, LocalStorage, OutlierPolicy,
    PngPlotRenderer, TableFormat, TableSource, TableStorage,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// CLI-compatible imputation mode enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliImputationMode {
    /// Pick mean, median, mode or "unknown" per column from its profile
    Adaptive,
    /// Median for numeric columns, "unknown" for categorical ones
    Fixed,
}

impl From<CliImputationMode> for ImputationMode {
    fn from(cli: CliImputationMode) -> Self {
        match cli {
            CliImputationMode::Adaptive => ImputationMode::Adaptive,
            CliImputationMode::Fixed => ImputationMode::Fixed,
        }
    }
}

/// CLI-compatible outlier policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierPolicy {
    /// Clamp values to the IQR bounds
    Cap,
    /// Remove rows with a value outside the IQR bounds
    Remove,
}

impl From<CliOutlierPolicy> for OutlierPolicy {
    fn from(cli: CliOutlierPolicy) -> Self {
        match cli {
            CliOutlierPolicy::Cap => OutlierPolicy::Cap,
            CliOutlierPolicy::Remove => OutlierPolicy::Remove,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Dataset cleaning with a before/after Data Quality Index",
    long_about = "Cleans a CSV file or a PDF table document and reports how its Data Quality \
                  Index changed.\n\n\
                  EXAMPLES:\n  \
                  # Clean with adaptive imputation and outlier capping\n  \
                  dqi-cleaner -i sales.csv\n\n  \
                  # Remove outlier rows and render plots\n  \
                  dqi-cleaner -i sales.csv --outlier-policy remove --plots -o results/\n\n  \
                  # Machine-readable report\n  \
                  dqi-cleaner -i report.pdf --json"
)]
struct Args {
    /// Path to the dataset (.csv or .pdf)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for the cleaned CSV and plots
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// JSON file with a cleaning configuration
    ///
    /// Flags given on the command line override values from the file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How missing values are filled
    #[arg(long, value_enum)]
    imputation_mode: Option<CliImputationMode>,

    /// What to do with outliers
    #[arg(long, value_enum)]
    outlier_policy: Option<CliOutlierPolicy>,

    /// Render a histogram per numeric column and a combined boxplot into <output>/plots
    #[arg(long)]
    plots: bool,

    /// Replace negative numeric values with the column median
    #[arg(long)]
    correct_negatives: bool,

    /// Drop document rows identical to the header (multi-page PDF tables)
    #[arg(long)]
    skip_repeated_headers: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

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
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Reject unsupported inputs before touching the file
    TableFormat::from_path(&args.input)?;
    if !args.input.exists() {
        return Err(anyhow!("Input file not found: {}", args.input.display()));
    }

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    info!("Loading dataset from: {}", args.input.display());
    let source = TableSource::from_path(&args.input)?;

    let mut result = match pipeline.run(&source) {
        Ok(result) => result,
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            error!("Cleaning failed: {}", e);
            return Err(anyhow!("Cleaning failed: {}", e));
        }
    };

    let storage = LocalStorage::new(&args.output);
    let file_name = LocalStorage::cleaned_file_name(&extract_file_stem(&args.input));
    let output_path = storage.save(&mut result.table, &file_name)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result.report)?);
        return Ok(());
    }

    print_human_readable_summary(&result.report, &args.input, &output_path);
    Ok(())
}

/// Merge the optional config file with command-line flags.
fn build_config(args: &Args) -> Result<CleaningConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str::<CleaningConfig>(&text)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        }
        None => CleaningConfig::default(),
    };

    if let Some(mode) = args.imputation_mode {
        config.imputation_mode = mode.into();
    }
    if let Some(policy) = args.outlier_policy {
        config.outlier_policy = policy.into();
    }
    config.generate_plots |= args.plots;
    config.correct_negative_values |= args.correct_negatives;
    config.skip_repeated_headers |= args.skip_repeated_headers;

    config.validate()?;
    Ok(config)
}

fn build_pipeline(args: &Args, config: CleaningConfig) -> Result<CleaningPipeline> {
    let generate_plots = config.generate_plots;
    let mut builder = CleaningPipeline::builder().config(config);

    if generate_plots {
        let plots_dir = args.output.join("plots");
        builder = builder.plot_renderer(Arc::new(PngPlotRenderer::new(plots_dir)));
    }

    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of the cleaning results.
fn print_human_readable_summary(report: &CleaningReport, input: &Path, output: &Path) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        input.display(),
        report.rows_before,
        report.columns_before
    );
    println!(
        "Output: {} ({} rows x {} columns)",
        output.display(),
        report.rows_after,
        report.columns_after
    );
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", report.duration_ms);
    println!(
        "  Data Quality Index: {:.2} -> {:.2} ({:+.2})",
        report.quality_before.dqi,
        report.quality_after.dqi,
        report.dqi_change()
    );
    println!("  Duplicate rows removed: {}", report.duplicates_removed);
    println!("  Missing values resolved: {}", report.missing_values_resolved);
    if report.negative_values_corrected > 0 {
        println!(
            "  Negative values corrected: {}",
            report.negative_values_corrected
        );
    }
    println!();

    if !report.imputations.is_empty() {
        println!("Imputation:");
        for imputation in &report.imputations {
            println!(
                "  - {} ({}): {} -> {} cells filled with {}",
                imputation.column,
                imputation.kind,
                imputation.strategy,
                imputation.filled,
                imputation.fill_value.as_deref().unwrap_or("nothing")
            );
        }
        println!();
    }

    let treated: Vec<_> = report.outliers.iter().filter(|o| o.affected > 0).collect();
    if !treated.is_empty() {
        println!("Outliers:");
        for treatment in treated {
            println!(
                "  - {}: bounds [{:.4}, {:.4}], {} affected",
                treatment.column, treatment.lower, treatment.upper, treatment.affected
            );
        }
        println!();
    }

    if !report.numeric_summaries.is_empty() {
        println!("Numeric Columns:");
        println!(
            "  {:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "Column", "Count", "Mean", "Std", "Min", "Median", "Max"
        );
        for s in &report.numeric_summaries {
            let std = s.std.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<20} {:>8} {:>12.4} {:>12} {:>12.4} {:>12.4} {:>12.4}",
                truncate_str(&s.column, 19),
                s.count,
                s.mean,
                std,
                s.min,
                s.median,
                s.max
            );
        }
        println!();
    }

    if !report.plot_refs.is_empty() {
        println!("Plots:");
        for plot in &report.plot_refs {
            println!("  - {}", plot);
        }
        println!();
    }

    println!("{}", report.summary);
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

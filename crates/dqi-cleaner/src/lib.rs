//! Dataset Cleaning Library
//!
//! Loads a tabular dataset, measures its quality with a Data Quality Index
//! (DQI), cleans it and measures it again. Built on Polars.
//!
//! # Overview
//!
//! A run goes through these stages, in order:
//!
//! - **Loading**: CSV text or the text layer of a PDF table document
//! - **Quality scoring**: `DQI = 100 - (missing_rate * 100 + duplicate_rate * 100)`
//! - **Deduplication**: exact duplicate rows are dropped, first occurrence kept
//! - **Type normalization**: each column becomes numeric or trimmed lowercase text
//! - **Imputation**: mean, median, mode or `"unknown"`, chosen per column
//! - **Negative value correction**: optional, replaces negatives with the median
//! - **Outlier treatment**: IQR bounds, values capped or rows removed
//! - **Re-scoring, plots and summary**
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dqi_cleaner::{clean, CleaningConfig, TableSource};
//!
//! let source = TableSource::from_path("sales.csv")?;
//! let result = clean(source, CleaningConfig::default())?;
//!
//! println!("DQI {:.2} -> {:.2}", result.dqi_before, result.dqi_after);
//! println!("{}", result.summary);
//! ```
//!
//! # Configuration
//!
//! Use [`CleaningConfig`] to customize behavior:
//!
//! ```rust,ignore
//! use dqi_cleaner::config::*;
//!
//! let config = CleaningConfig::builder()
//!     .imputation_mode(ImputationMode::Fixed)   // median / "unknown" everywhere
//!     .outlier_policy(OutlierPolicy::Remove)    // drop rows outside the IQR bounds
//!     .iqr_multiplier(3.0)
//!     .correct_negative_values(true)
//!     .build()?;
//! ```
//!
//! # Progress Reporting and Plots
//!
//! ```rust,ignore
//! use dqi_cleaner::{CleaningPipeline, PngPlotRenderer};
//! use std::sync::Arc;
//!
//! let result = CleaningPipeline::builder()
//!     .config(CleaningConfig::builder().generate_plots(true).build()?)
//!     .plot_renderer(Arc::new(PngPlotRenderer::new("output/plots")))
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run(&source)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{Deduplicator, InvalidValueCorrector, TypeNormalizer};
pub use config::{
    CleaningConfig, CleaningConfigBuilder, ConfigValidationError, ImputationMode, OutlierPolicy,
};
pub use error::{CleaningError, Result, ResultExt};
pub use imputers::{ImputationSelector, StatisticalImputer};
pub use loader::{TableFormat, TableLoader, TableSource};
pub use pipeline::{
    CleaningPipeline, CleaningPipelineBuilder, CleaningStage, ClosureProgressReporter,
    OutlierTreater, ProgressReporter, ProgressUpdate,
};
pub use profiler::ColumnProfiler;
pub use quality::QualityScorer;
pub use reporting::{
    LocalStorage, PlotRenderer, PngPlotRenderer, SummaryGenerator, SummaryStats,
    TableStorage,
};
pub use types::{
    CleaningReport, CleaningResult, ColumnImputation, ColumnKind, ColumnProfile, ColumnStats,
    ImputationStrategy, NumericSummary, OutlierTreatment, QualityBreakdown, UNKNOWN_SENTINEL,
    ValueCorrection,
};

/// Clean a dataset with the given configuration.
///
/// Runs the full pipeline without progress reporting or plots. A config
/// with `generate_plots` set is rejected as [`CleaningError::InvalidConfig`];
/// use [`CleaningPipeline::builder()`] to attach a renderer or a reporter.
pub fn clean(input: TableSource, config: CleaningConfig) -> Result<CleaningResult> {
    let pipeline = CleaningPipeline::builder().config(config).build()?;
    pipeline.run(&input)
}

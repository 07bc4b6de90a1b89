//! Cleaning pipeline orchestrator.
//!
//! This module provides the `CleaningPipeline` struct and its builder. The
//! pipeline runs every stage in a fixed order and aborts on the first
//! failure, tagging the error with the stage that produced it.

use crate::cleaner::{Deduplicator, InvalidValueCorrector, TypeNormalizer, column_kind};
use crate::config::CleaningConfig;
use crate::error::{CleaningError, Result, ResultExt};
use crate::imputers::ImputationSelector;
use crate::loader::{TableLoader, TableSource};
use crate::pipeline::outliers::OutlierTreater;
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::ColumnProfiler;
use crate::quality::QualityScorer;
use crate::reporting::{PlotRenderer, SummaryGenerator, SummaryStats};
use crate::types::{CleaningReport, CleaningResult, ColumnKind};
use crate::utils::non_null_f64;
use chrono::Utc;
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The cleaning pipeline.
///
/// Use [`CleaningPipeline::builder()`] to create a pipeline with custom
/// configuration and collaborators.
///
/// # Example
///
/// ```rust,ignore
/// use dqi_cleaner::{CleaningConfig, CleaningPipeline, OutlierPolicy, TableSource};
///
/// let config = CleaningConfig::builder()
///     .outlier_policy(OutlierPolicy::Remove)
///     .build()?;
///
/// let result = CleaningPipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run(&TableSource::from_path("sales.csv")?)?;
///
/// println!("DQI {:.2} -> {:.2}", result.dqi_before, result.dqi_after);
/// ```
pub struct CleaningPipeline {
    config: CleaningConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    plot_renderer: Option<Arc<dyn PlotRenderer>>,
    normalizer: TypeNormalizer,
    imputer: ImputationSelector,
    outliers: OutlierTreater,
}

// The pipeline may be moved to a worker thread by the caller
static_assertions::assert_impl_all!(CleaningPipeline: Send);

impl CleaningPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> CleaningPipelineBuilder {
        CleaningPipelineBuilder::default()
    }

    /// The configuration this pipeline was built with.
    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Load a table from `source` and clean it.
    pub fn run(&self, source: &TableSource) -> Result<CleaningResult> {
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Loading,
            0.0,
            format!("Loading {:?} input...", source.format),
        ));
        let loaded = TableLoader::new()
            .with_skip_repeated_headers(self.config.skip_repeated_headers)
            .load(source)
            .at_stage(CleaningStage::Loading);

        match loaded {
            Ok(df) => {
                self.report_progress(ProgressUpdate::new(
                    CleaningStage::Loading,
                    1.0,
                    format!("Loaded {} rows x {} columns", df.height(), df.width()),
                ));
                self.process(df)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Clean an already loaded table.
    ///
    /// The table is expected to hold raw cells, as produced by
    /// [`TableLoader`]; typed columns are accepted too.
    pub fn process(&self, df: DataFrame) -> Result<CleaningResult> {
        match self.process_internal(df) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Cleaning completed successfully"));
                Ok(result)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&self, e: CleaningError) -> Result<CleaningResult> {
        self.report_progress(ProgressUpdate::failed(e.to_string()));
        error!("Pipeline error: {}", e);
        Err(e)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn start_stage(&self, stage: CleaningStage, message: &str) {
        info!("{}", message);
        self.report_progress(ProgressUpdate::new(stage, 0.0, message));
    }

    fn finish_stage(&self, stage: CleaningStage, message: impl Into<String>) {
        self.report_progress(ProgressUpdate::new(stage, 1.0, message));
    }

    fn process_internal(&self, df: DataFrame) -> Result<CleaningResult> {
        let start_time = Instant::now();

        if df.height() == 0 || df.width() == 0 {
            return Err(CleaningError::EmptyDataset.at_stage(CleaningStage::Loading));
        }
        let rows_before = df.height();
        let columns_before = df.width();

        // Step 1: Score the raw table
        self.start_stage(CleaningStage::ScoringBefore, "Scoring input quality...");
        let quality_before = QualityScorer::breakdown(&df).at_stage(CleaningStage::ScoringBefore)?;
        self.finish_stage(
            CleaningStage::ScoringBefore,
            format!("Input DQI: {:.2}", quality_before.dqi),
        );

        // Step 2: Drop duplicate rows
        self.start_stage(CleaningStage::Deduplication, "Removing duplicate rows...");
        let (df, duplicates_removed) =
            Deduplicator::remove_duplicates(df).at_stage(CleaningStage::Deduplication)?;
        self.finish_stage(
            CleaningStage::Deduplication,
            format!("Removed {} duplicate rows", duplicates_removed),
        );

        // Step 3: Decide numeric vs categorical per column
        self.start_stage(CleaningStage::TypeNormalization, "Normalizing column types...");
        let df = self
            .normalizer
            .normalize(df)
            .at_stage(CleaningStage::TypeNormalization)?;
        self.finish_stage(CleaningStage::TypeNormalization, "Column types normalized");

        // Step 4: Fill missing values
        self.start_stage(CleaningStage::Imputation, "Imputing missing values...");
        let (df, imputations) = self.imputer.impute(df).at_stage(CleaningStage::Imputation)?;
        let missing_values_resolved: usize = imputations.iter().map(|i| i.filled).sum();
        self.finish_stage(
            CleaningStage::Imputation,
            format!("Resolved {} missing values", missing_values_resolved),
        );

        // Step 5: Optional negative value correction
        let (df, corrections) = if self.config.correct_negative_values {
            self.start_stage(
                CleaningStage::InvalidValueCorrection,
                "Correcting negative values...",
            );
            let (df, corrections) = InvalidValueCorrector::correct_negative_values(df)
                .at_stage(CleaningStage::InvalidValueCorrection)?;
            self.finish_stage(
                CleaningStage::InvalidValueCorrection,
                format!("Corrected values in {} columns", corrections.len()),
            );
            (df, corrections)
        } else {
            debug!("Skipping negative value correction (disabled)");
            (df, Vec::new())
        };
        let negative_values_corrected: usize = corrections.iter().map(|c| c.corrected).sum();

        // Step 6: Outliers
        self.start_stage(CleaningStage::OutlierTreatment, "Treating outliers...");
        let (df, outliers) = self
            .outliers
            .treat(df)
            .at_stage(CleaningStage::OutlierTreatment)?;
        let affected: usize = outliers.iter().map(|o| o.affected).sum();
        self.finish_stage(
            CleaningStage::OutlierTreatment,
            format!("Outlier treatment touched {} values", affected),
        );

        // Step 7: Score the cleaned table
        self.start_stage(CleaningStage::ScoringAfter, "Scoring output quality...");
        let quality_after = QualityScorer::breakdown(&df).at_stage(CleaningStage::ScoringAfter)?;
        self.finish_stage(
            CleaningStage::ScoringAfter,
            format!("Output DQI: {:.2}", quality_after.dqi),
        );

        // Step 8: Optional histograms
        let plot_refs = self.render_plots(&df).at_stage(CleaningStage::Plotting)?;

        // Step 9: Summary and report
        self.start_stage(CleaningStage::Summarizing, "Writing summary...");
        let numeric_summaries =
            ColumnProfiler::describe_numeric(&df).at_stage(CleaningStage::Summarizing)?;
        let summary = SummaryGenerator::generate(&SummaryStats {
            rows: rows_before,
            columns: columns_before,
            missing_values_resolved,
            duplicates_removed,
            dqi_before: quality_before.dqi,
            dqi_after: quality_after.dqi,
        });
        self.finish_stage(CleaningStage::Summarizing, "Summary written");

        let report = CleaningReport {
            generated_at: Utc::now().to_rfc3339(),
            duration_ms: start_time.elapsed().as_millis() as u64,
            rows_before,
            columns_before,
            rows_after: df.height(),
            columns_after: df.width(),
            duplicates_removed,
            missing_values_resolved,
            negative_values_corrected,
            quality_before,
            quality_after,
            imputations,
            corrections,
            outliers,
            numeric_summaries,
            plot_refs: plot_refs.clone(),
            summary: summary.clone(),
        };

        info!(
            "Cleaning finished in {} ms: DQI {:.2} -> {:.2}",
            report.duration_ms, quality_before.dqi, quality_after.dqi
        );

        Ok(CleaningResult {
            table: df,
            dqi_before: quality_before.dqi,
            dqi_after: quality_after.dqi,
            plot_refs,
            summary,
            report,
        })
    }

    /// One histogram per numeric column in column order, then the
    /// combined boxplot when the renderer supports it.
    fn render_plots(&self, df: &DataFrame) -> Result<Vec<String>> {
        let Some(renderer) = self.plot_renderer.as_ref().filter(|_| self.config.generate_plots)
        else {
            return Ok(Vec::new());
        };

        self.start_stage(CleaningStage::Plotting, "Rendering plots...");
        let mut columns = Vec::new();
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if column_kind(series) != ColumnKind::Numeric {
                continue;
            }
            columns.push((series.name().to_string(), non_null_f64(series)?));
        }

        let mut refs = Vec::with_capacity(columns.len() + 1);
        for (name, values) in &columns {
            let reference = renderer.render_histogram(name, values)?;
            debug!("Plot for '{}': {}", name, reference);
            refs.push(reference);
        }
        let histograms = refs.len();
        if let Some(reference) = renderer.render_boxplot(&columns)? {
            debug!("Boxplot: {}", reference);
            refs.push(reference);
        }

        self.finish_stage(
            CleaningStage::Plotting,
            format!(
                "Rendered {} histograms and {} boxplots",
                histograms,
                refs.len() - histograms
            ),
        );
        Ok(refs)
    }
}

/// Builder for creating a [`CleaningPipeline`] instance.
///
/// Use [`CleaningPipeline::builder()`] to get started.
#[derive(Default)]
pub struct CleaningPipelineBuilder {
    config: Option<CleaningConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    plot_renderer: Option<Arc<dyn PlotRenderer>>,
}

static_assertions::assert_impl_all!(CleaningPipelineBuilder: Send);

impl CleaningPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use dqi_cleaner::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct StageLogger;
    ///
    /// impl ProgressReporter for StageLogger {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = CleaningPipeline::builder()
    ///     .progress_reporter(Arc::new(StageLogger))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// Convenience wrapper around [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Attach the renderer used when `generate_plots` is enabled.
    ///
    /// Required when `generate_plots` is set; ignored otherwise.
    pub fn plot_renderer(mut self, renderer: Arc<dyn PlotRenderer>) -> Self {
        self.plot_renderer = Some(renderer);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid, or if it asks
    /// for plots without a renderer to draw them.
    pub fn build(self) -> std::result::Result<CleaningPipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        if config.generate_plots && self.plot_renderer.is_none() {
            return Err(crate::config::ConfigValidationError::MissingPlotRenderer);
        }

        Ok(CleaningPipeline {
            normalizer: TypeNormalizer::new(config.numeric_ratio_threshold),
            imputer: ImputationSelector::from_config(&config),
            outliers: OutlierTreater::from_config(&config),
            config,
            progress_reporter: self.progress_reporter,
            plot_renderer: self.plot_renderer,
        })
    }
}

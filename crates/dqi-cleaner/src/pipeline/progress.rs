//! Progress reporting for the cleaning pipeline.
//!
//! The orchestrator reports the start and end of every stage through an
//! optional [`ProgressReporter`]. Stages also name the component that runs
//! them, which is what error messages show.
//!
//! # Example
//!
//! ```rust,ignore
//! use dqi_cleaner::CleaningPipeline;
//!
//! let result = CleaningPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningStage {
    /// Parsing the input into a table
    Loading,
    /// Scoring the raw table
    ScoringBefore,
    /// Dropping repeated rows
    Deduplication,
    /// Deciding numeric vs categorical and coercing cells
    TypeNormalization,
    /// Filling missing values
    Imputation,
    /// Replacing negative numeric values (optional)
    InvalidValueCorrection,
    /// Capping or removing IQR outliers
    OutlierTreatment,
    /// Scoring the cleaned table
    ScoringAfter,
    /// Rendering histograms (optional)
    Plotting,
    /// Writing the narrative summary
    Summarizing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl CleaningStage {
    /// Name of the component responsible for this stage.
    pub fn component_name(&self) -> &'static str {
        match self {
            Self::Loading => "TableLoader",
            Self::ScoringBefore | Self::ScoringAfter => "QualityScorer",
            Self::Deduplication => "Deduplicator",
            Self::TypeNormalization => "TypeNormalizer",
            Self::Imputation => "ImputationSelector",
            Self::InvalidValueCorrection => "InvalidValueCorrector",
            Self::OutlierTreatment => "OutlierTreater",
            Self::Plotting => "PlotRenderer",
            Self::Summarizing => "SummaryGenerator",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns a human-readable description of the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Table",
            Self::ScoringBefore => "Scoring Raw Data",
            Self::Deduplication => "Removing Duplicates",
            Self::TypeNormalization => "Normalizing Types",
            Self::Imputation => "Imputing Values",
            Self::InvalidValueCorrection => "Correcting Invalid Values",
            Self::OutlierTreatment => "Treating Outliers",
            Self::ScoringAfter => "Scoring Cleaned Data",
            Self::Plotting => "Rendering Plots",
            Self::Summarizing => "Summarizing",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run attributed to this stage (0.0 - 1.0).
    ///
    /// Non-terminal stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.05,
            Self::ScoringBefore => 0.05,
            Self::Deduplication => 0.10,
            Self::TypeNormalization => 0.15,
            Self::Imputation => 0.20,
            Self::InvalidValueCorrection => 0.05,
            Self::OutlierTreatment => 0.15,
            Self::ScoringAfter => 0.05,
            Self::Plotting => 0.15,
            Self::Summarizing => 0.05,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::ScoringBefore => 0.05,
            Self::Deduplication => 0.10,
            Self::TypeNormalization => 0.20,
            Self::Imputation => 0.35,
            Self::InvalidValueCorrection => 0.55,
            Self::OutlierTreatment => 0.60,
            Self::ScoringAfter => 0.75,
            Self::Plotting => 0.80,
            Self::Summarizing => 0.95,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

impl fmt::Display for CleaningStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.component_name())
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: CleaningStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,
}

impl ProgressUpdate {
    /// Creates a progress update for a stage.
    pub fn new(stage: CleaningStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress,
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: CleaningStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receiver for progress updates.
///
/// Implementations must be `Send + Sync` so the pipeline can run on a
/// worker thread while reporting to another.
pub trait ProgressReporter: Send + Sync {
    /// Called at the start and end of every stage.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
static_assertions::assert_impl_all!(CleaningStage: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RUN_ORDER: [CleaningStage; 10] = [
        CleaningStage::Loading,
        CleaningStage::ScoringBefore,
        CleaningStage::Deduplication,
        CleaningStage::TypeNormalization,
        CleaningStage::Imputation,
        CleaningStage::InvalidValueCorrection,
        CleaningStage::OutlierTreatment,
        CleaningStage::ScoringAfter,
        CleaningStage::Plotting,
        CleaningStage::Summarizing,
    ];

    #[test]
    fn test_stage_display_is_component_name() {
        assert_eq!(CleaningStage::OutlierTreatment.to_string(), "OutlierTreater");
        assert_eq!(CleaningStage::ScoringBefore.to_string(), "QualityScorer");
        assert_eq!(CleaningStage::ScoringAfter.to_string(), "QualityScorer");
        assert_eq!(CleaningStage::Loading.to_string(), "TableLoader");
    }

    #[test]
    fn test_stage_weights_sum() {
        let total_weight: f32 = RUN_ORDER.iter().map(|s| s.weight()).sum();
        assert!((total_weight - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0f32;
        for stage in RUN_ORDER {
            assert!(
                (stage.base_progress() - expected).abs() < 1e-4,
                "{:?} starts at {} but previous stages sum to {}",
                stage,
                stage.base_progress(),
                expected
            );
            expected += stage.weight();
        }
    }

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(CleaningStage::Imputation, 0.5, "Imputing...");
        assert_eq!(update.stage, CleaningStage::Imputation);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.45).abs() < 1e-4);
        assert_eq!(update.message, "Imputing...");
    }

    #[test]
    fn test_progress_update_complete() {
        let update = ProgressUpdate::complete("Done!");
        assert_eq!(update.stage, CleaningStage::Complete);
        assert_eq!(update.progress, 1.0);
    }

    #[test]
    fn test_closure_progress_reporter_across_threads() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = Arc::new(ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let reporter_clone = reporter.clone();
        let handle = std::thread::spawn(move || {
            reporter_clone.report(ProgressUpdate::new(
                CleaningStage::Deduplication,
                0.0,
                "from worker",
            ));
        });
        handle.join().expect("Thread should not panic");
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&CleaningStage::OutlierTreatment).unwrap();
        assert_eq!(json, "\"outlier_treatment\"");
        let json = serde_json::to_string(&CleaningStage::InvalidValueCorrection).unwrap();
        assert_eq!(json, "\"invalid_value_correction\"");
    }
}

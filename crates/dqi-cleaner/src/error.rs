//! Custom error types for the cleaning pipeline.
//!
//! Input-content errors (`UnsupportedFormat`, `EmptyExtraction`,
//! `MalformedTable`, `EmptyDataset`) are fatal to a run; the orchestrator wraps
//! whatever a stage returns in [`CleaningError::StageFailed`] so callers can
//! tell where a run stopped.
//!
//! Errors are serializable so a front end can render `{code, message}`
//! without matching on variants.

use crate::pipeline::CleaningStage;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// The declared format or file extension is not CSV or a table document.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A table document contained no extractable table rows.
    #[error("No tables found in document")]
    EmptyExtraction,

    /// Ragged rows, a bad header or unreadable input.
    #[error("Malformed table: {0}")]
    MalformedTable(String),

    /// Zero rows or zero columns, so scores and statistics are undefined.
    #[error("Dataset is empty")]
    EmptyDataset,

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The plot collaborator failed to produce an image.
    #[error("Failed to render plot for column '{column}': {reason}")]
    PlotRendering { column: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A pipeline stage failed; carries the stage that aborted the run.
    #[error("failed during {stage}: {source}")]
    StageFailed {
        stage: CleaningStage,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Attach the stage that was running when this error occurred.
    ///
    /// An error that already carries a stage keeps the innermost one.
    pub fn at_stage(self, stage: CleaningStage) -> Self {
        match self {
            already @ CleaningError::StageFailed { .. } => already,
            other => CleaningError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Get error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::EmptyExtraction => "EMPTY_EXTRACTION",
            Self::MalformedTable(_) => "MALFORMED_TABLE",
            Self::EmptyDataset => "EMPTY_DATASET",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::PlotRendering { .. } => "PLOT_RENDERING_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::StageFailed { source, .. } => source.error_code(),
        }
    }

    /// The stage that aborted the run, if the error went through the orchestrator.
    pub fn stage(&self) -> Option<CleaningStage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// The underlying error with any stage wrapper removed.
    pub fn root(&self) -> &CleaningError {
        match self {
            Self::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// Check if this error stems from the input content rather than the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.root(),
            Self::UnsupportedFormat(_)
                | Self::EmptyExtraction
                | Self::MalformedTable(_)
                | Self::EmptyDataset
        )
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for tagging results with the stage that produced them.
pub trait ResultExt<T> {
    /// Wrap an error result with the failing stage.
    fn at_stage(self, stage: CleaningStage) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn at_stage(self, stage: CleaningStage) -> Result<T> {
        self.map_err(|e| e.at_stage(stage))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn at_stage(self, stage: CleaningStage) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).at_stage(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(CleaningError::EmptyDataset.error_code(), "EMPTY_DATASET");
        assert_eq!(
            CleaningError::UnsupportedFormat("xlsx".to_string()).error_code(),
            "UNSUPPORTED_FORMAT"
        );
    }

    #[test]
    fn test_stage_message() {
        let error = CleaningError::EmptyDataset.at_stage(CleaningStage::OutlierTreatment);
        assert_eq!(error.to_string(), "failed during OutlierTreater: Dataset is empty");
        assert_eq!(error.error_code(), "EMPTY_DATASET"); // Preserves original code
        assert_eq!(error.stage(), Some(CleaningStage::OutlierTreatment));
    }

    #[test]
    fn test_innermost_stage_wins() {
        let error = CleaningError::EmptyExtraction
            .at_stage(CleaningStage::Loading)
            .at_stage(CleaningStage::Summarizing);
        assert_eq!(error.stage(), Some(CleaningStage::Loading));
    }

    #[test]
    fn test_is_input_error() {
        assert!(CleaningError::EmptyDataset.is_input_error());
        assert!(
            CleaningError::MalformedTable("ragged".to_string())
                .at_stage(CleaningStage::Loading)
                .is_input_error()
        );
        assert!(!CleaningError::InvalidConfig("bad".to_string()).is_input_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::UnsupportedFormat(".xlsx".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNSUPPORTED_FORMAT"));
        assert!(json.contains(".xlsx"));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<()> = Err(CleaningError::EmptyDataset);
        let err = result.at_stage(CleaningStage::ScoringBefore).unwrap_err();
        assert!(err.to_string().starts_with("failed during QualityScorer"));
    }
}

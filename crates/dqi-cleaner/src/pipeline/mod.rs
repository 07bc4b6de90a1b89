//! Pipeline module.
//!
//! This module provides the cleaning pipeline, the outlier stage and the
//! progress reporting types.

mod builder;
pub mod outliers;
pub mod progress;

pub use builder::{CleaningPipeline, CleaningPipelineBuilder};
pub use outliers::OutlierTreater;
pub use progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};

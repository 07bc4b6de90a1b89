//! Imputation module for handling missing values.
//!
//! This module provides:
//! - Adaptive and fixed strategy selection per column
//! - Statistical fills (mean, median, mode, "unknown")

mod selector;
mod statistical;

pub use selector::ImputationSelector;
pub use statistical::StatisticalImputer;

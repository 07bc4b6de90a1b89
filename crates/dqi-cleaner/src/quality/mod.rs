//! Data quality scoring module.
//!
//! This module computes the Data Quality Index (DQI) from missingness and
//! row duplication.

mod scorer;

pub use scorer::QualityScorer;

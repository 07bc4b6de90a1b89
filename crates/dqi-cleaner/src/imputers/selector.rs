//! Per-column choice of imputation strategy.

use super::StatisticalImputer;
use crate::config::{CleaningConfig, ImputationMode};
use crate::error::Result;
use crate::profiler::ColumnProfiler;
use crate::types::{ColumnImputation, ColumnProfile, ColumnStats, ImputationStrategy};
use polars::prelude::*;
use tracing::{debug, warn};

/// Chooses and applies a fill strategy for every column with missing values.
///
/// In adaptive mode:
/// - numeric columns use the median when many values are missing or the
///   distribution is skewed, the mean otherwise
/// - categorical columns use the modal value when it dominates and few
///   values are missing, `"unknown"` otherwise
///
/// Fixed mode always uses the median or `"unknown"`.
#[derive(Debug, Clone)]
pub struct ImputationSelector {
    mode: ImputationMode,
    missing_ratio_threshold: f64,
    skewness_threshold: f64,
    mode_share_threshold: f64,
}

impl Default for ImputationSelector {
    fn default() -> Self {
        Self::from_config(&CleaningConfig::default())
    }
}

impl ImputationSelector {
    pub fn from_config(config: &CleaningConfig) -> Self {
        Self {
            mode: config.imputation_mode,
            missing_ratio_threshold: config.missing_ratio_threshold,
            skewness_threshold: config.skewness_threshold,
            mode_share_threshold: config.mode_share_threshold,
        }
    }

    /// Pick the strategy for a profiled column.
    pub fn select(&self, profile: &ColumnProfile) -> ImputationStrategy {
        match (&profile.stats, self.mode) {
            (ColumnStats::Numeric { .. }, ImputationMode::Fixed) => ImputationStrategy::Median,
            (ColumnStats::Categorical { .. }, ImputationMode::Fixed) => ImputationStrategy::Unknown,
            (ColumnStats::Numeric { skewness, .. }, ImputationMode::Adaptive) => {
                if profile.missing_ratio > self.missing_ratio_threshold {
                    ImputationStrategy::Median
                } else if skewness.abs() < self.skewness_threshold {
                    ImputationStrategy::Mean
                } else {
                    ImputationStrategy::Median
                }
            }
            (ColumnStats::Categorical { mode_share, .. }, ImputationMode::Adaptive) => {
                if profile.missing_ratio > self.missing_ratio_threshold {
                    ImputationStrategy::Unknown
                } else if *mode_share > self.mode_share_threshold {
                    ImputationStrategy::Mode
                } else {
                    ImputationStrategy::Unknown
                }
            }
        }
    }

    /// Fill the missing cells of every column that has any.
    ///
    /// Returns the table and one record per column that had missing cells.
    pub fn impute(&self, df: DataFrame) -> Result<(DataFrame, Vec<ColumnImputation>)> {
        let mut df = df;
        let profiles = ColumnProfiler::profile_table(&df)?;
        let mut decisions = Vec::new();

        for profile in profiles.iter().filter(|p| p.missing_count > 0) {
            let strategy = self.select(profile);
            let fill_value = StatisticalImputer::fill_value(profile, strategy);

            let filled = match &fill_value {
                Some(value) => StatisticalImputer::apply(&mut df, &profile.name, value)?,
                None => {
                    warn!(
                        "Column '{}' has no values to derive a {} from; leaving {} cells missing",
                        profile.name, strategy, profile.missing_count
                    );
                    0
                }
            };

            debug!(
                "Column '{}' ({}, {:.1}% missing): {} fill, {} cells",
                profile.name,
                profile.kind(),
                profile.missing_ratio * 100.0,
                strategy,
                filled
            );

            decisions.push(ColumnImputation {
                column: profile.name.clone(),
                kind: profile.kind(),
                strategy,
                fill_value: fill_value.map(|v| v.render()),
                filled,
            });
        }

        Ok((df, decisions))
    }
}

//! Column profiling module.
//!
//! This module derives the per-column facts the imputation stage decides
//! on (missing ratio, mean, median, skewness, modal share) and the
//! descriptive statistics reported after cleaning.

mod statistics;

use crate::cleaner::column_kind;
use crate::error::Result;
use crate::types::{ColumnKind, ColumnProfile, ColumnStats, NumericSummary};
use crate::utils::string_mode;
use polars::prelude::*;
use statistics::skewness;

/// Profiles normalized columns.
pub struct ColumnProfiler;

impl ColumnProfiler {
    /// Profile every column of a normalized table, in table order.
    pub fn profile_table(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
        df.get_columns()
            .iter()
            .map(|col| Self::profile_column(col.as_materialized_series()))
            .collect()
    }

    /// Profile a single normalized column.
    ///
    /// Float64 columns get numeric statistics; anything else is treated as
    /// categorical text.
    pub fn profile_column(series: &Series) -> Result<ColumnProfile> {
        let row_count = series.len();
        let missing_count = series.null_count();
        let missing_ratio = if row_count == 0 {
            0.0
        } else {
            missing_count as f64 / row_count as f64
        };

        let stats = match column_kind(series) {
            ColumnKind::Numeric => {
                let values = series.cast(&DataType::Float64)?;
                ColumnStats::Numeric {
                    mean: values.mean(),
                    median: values.median(),
                    skewness: skewness(&values)?,
                }
            }
            ColumnKind::Categorical => {
                let text = series.cast(&DataType::String)?;
                let non_null = row_count - missing_count;
                match string_mode(&text)? {
                    Some((mode, count)) => ColumnStats::Categorical {
                        mode: Some(mode),
                        mode_share: count as f64 / non_null as f64,
                    },
                    None => ColumnStats::Categorical {
                        mode: None,
                        mode_share: 0.0,
                    },
                }
            }
        };

        Ok(ColumnProfile {
            name: series.name().to_string(),
            row_count,
            missing_count,
            missing_ratio,
            stats,
        })
    }

    /// Descriptive statistics of every numeric column with at least one value.
    pub fn describe_numeric(df: &DataFrame) -> Result<Vec<NumericSummary>> {
        let mut summaries = Vec::new();
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            if column_kind(series) != ColumnKind::Numeric {
                continue;
            }
            if let Some(summary) = statistics::describe(series)? {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}

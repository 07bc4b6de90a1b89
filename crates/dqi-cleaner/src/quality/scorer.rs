use crate::error::{CleaningError, Result};
use crate::types::QualityBreakdown;
use crate::utils::round_to;
use polars::prelude::*;
use tracing::debug;

/// Computes the Data Quality Index of a table.
///
/// `DQI = 100 - (missing_rate * 100 + duplicate_rate * 100)`, rounded to two
/// decimals. The score is not clamped and goes negative for very poor
/// tables.
pub struct QualityScorer;

impl QualityScorer {
    /// Compute the DQI of a table.
    pub fn calculate_dqi(df: &DataFrame) -> Result<f64> {
        Ok(Self::breakdown(df)?.dqi)
    }

    /// Compute the DQI together with the rates it is derived from.
    pub fn breakdown(df: &DataFrame) -> Result<QualityBreakdown> {
        if df.height() == 0 || df.width() == 0 {
            return Err(CleaningError::EmptyDataset);
        }

        let missing_rate = Self::missing_rate(df);
        let duplicates = Self::duplicate_count(df)?;
        let duplicate_rate = duplicates as f64 / df.height() as f64;
        let dqi = round_to(100.0 - (missing_rate * 100.0 + duplicate_rate * 100.0), 2);

        debug!(
            "DQI {:.2} (missing rate {:.4}, {} duplicate rows)",
            dqi, missing_rate, duplicates
        );

        Ok(QualityBreakdown {
            missing_rate,
            duplicate_rate,
            dqi,
        })
    }

    /// Mean over columns of each column's missing ratio.
    pub fn missing_rate(df: &DataFrame) -> f64 {
        if df.height() == 0 || df.width() == 0 {
            return 0.0;
        }
        let height = df.height() as f64;
        let total: f64 = df
            .get_columns()
            .iter()
            .map(|col| col.null_count() as f64 / height)
            .sum();
        total / df.width() as f64
    }

    /// Number of rows equal to an earlier row.
    ///
    /// Nulls compare equal to nulls.
    pub fn duplicate_count(df: &DataFrame) -> Result<usize> {
        let unique = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        Ok(df.height() - unique.height())
    }
}

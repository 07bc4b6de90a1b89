//! Numeric vs categorical type normalization.

use crate::error::Result;
use crate::types::ColumnKind;
use crate::utils::{column_names, is_numeric_dtype, parse_numeric_cell};
use polars::prelude::*;
use tracing::debug;

/// Kind of a normalized column, read from its dtype.
pub fn column_kind(series: &Series) -> ColumnKind {
    if is_numeric_dtype(series.dtype()) {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

/// Decides each column's kind and coerces its cells.
///
/// A column becomes numeric (Float64) when the share of cells that parse as
/// finite numbers is above the threshold; the cells that do not parse become
/// null. Every other column stays text and is trimmed and lowercased, with
/// `"nan"` and blank cells turned into nulls.
#[derive(Debug, Clone)]
pub struct TypeNormalizer {
    numeric_ratio_threshold: f64,
}

impl Default for TypeNormalizer {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TypeNormalizer {
    pub fn new(numeric_ratio_threshold: f64) -> Self {
        Self {
            numeric_ratio_threshold,
        }
    }

    /// Normalize every column of the table.
    pub fn normalize(&self, df: DataFrame) -> Result<DataFrame> {
        let mut df = df;
        for name in column_names(&df) {
            let series = df.column(&name)?.as_materialized_series().clone();
            let normalized = self.normalize_series(&series)?;
            debug!("Column '{}' normalized as {}", name, column_kind(&normalized));
            df.replace(&name, normalized)?;
        }
        Ok(df)
    }

    /// Normalize a single column.
    pub fn normalize_series(&self, series: &Series) -> Result<Series> {
        if is_numeric_dtype(series.dtype()) {
            return Ok(series.cast(&DataType::Float64)?);
        }

        let text = series.cast(&DataType::String)?;
        let cells = text.str()?;
        let parsed: Vec<Option<f64>> = cells
            .into_iter()
            .map(|cell| cell.and_then(parse_numeric_cell))
            .collect();

        let total = series.len();
        let parsed_count = parsed.iter().filter(|v| v.is_some()).count();
        let ratio = if total == 0 {
            0.0
        } else {
            parsed_count as f64 / total as f64
        };

        if ratio > self.numeric_ratio_threshold {
            return Ok(Series::new(series.name().clone(), parsed));
        }

        let normalized: Vec<Option<String>> = cells
            .into_iter()
            .map(|cell| {
                cell.map(|c| c.trim().to_lowercase())
                    .filter(|c| !c.is_empty() && c != "nan")
            })
            .collect();
        Ok(Series::new(series.name().clone(), normalized))
    }
}

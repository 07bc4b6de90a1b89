//! Replacement of invalid negative values in numeric columns.

use super::column_kind;
use crate::error::Result;
use crate::types::{ColumnKind, ValueCorrection};
use crate::utils::column_names;
use polars::prelude::*;
use tracing::debug;

/// Replaces negative numbers with the column median.
///
/// The median is taken over every non-null value of the column, negatives
/// included. Nulls are left alone.
pub struct InvalidValueCorrector;

impl InvalidValueCorrector {
    pub fn correct_negative_values(df: DataFrame) -> Result<(DataFrame, Vec<ValueCorrection>)> {
        let mut df = df;
        let mut corrections = Vec::new();

        for name in column_names(&df) {
            let series = df.column(&name)?.as_materialized_series().clone();
            if column_kind(&series) != ColumnKind::Numeric {
                continue;
            }

            let values = series.f64()?;
            let negatives = values.into_iter().flatten().filter(|v| *v < 0.0).count();
            if negatives == 0 {
                continue;
            }

            let Some(median) = series.median() else {
                continue;
            };

            let corrected: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|x| if x < 0.0 { median } else { x }))
                .collect();
            df.replace(&name, Series::new(name.as_str().into(), corrected))?;

            debug!(
                "Replaced {} negative values in '{}' with median {}",
                negatives, name, median
            );
            corrections.push(ValueCorrection {
                column: name,
                replacement: median,
                corrected: negatives,
            });
        }

        Ok((df, corrections))
    }
}

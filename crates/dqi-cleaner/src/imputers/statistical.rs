//! Statistical imputation methods.
//!
//! Fills missing cells with a value taken from the column profile. Only
//! null cells are written; existing values are never touched.

use crate::error::Result;
use crate::types::{ColumnProfile, ColumnStats, ImputationStrategy, UNKNOWN_SENTINEL};
use crate::utils::{fill_numeric_nulls, fill_string_nulls, format_number};
use polars::prelude::*;

/// Value a strategy writes into missing cells.
#[derive(Debug, Clone, PartialEq)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl FillValue {
    pub fn render(&self) -> String {
        match self {
            Self::Number(v) => format_number(*v),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Resolve the value a strategy would fill with for this profile.
    ///
    /// Returns `None` when the column has nothing to derive it from, e.g.
    /// the median of a numeric column with no values.
    pub fn fill_value(profile: &ColumnProfile, strategy: ImputationStrategy) -> Option<FillValue> {
        match (&profile.stats, strategy) {
            (ColumnStats::Numeric { mean, .. }, ImputationStrategy::Mean) => {
                mean.map(FillValue::Number)
            }
            (ColumnStats::Numeric { median, .. }, ImputationStrategy::Median) => {
                median.map(FillValue::Number)
            }
            (ColumnStats::Categorical { mode, .. }, ImputationStrategy::Mode) => {
                mode.clone().map(FillValue::Text)
            }
            (ColumnStats::Categorical { .. }, ImputationStrategy::Unknown) => {
                Some(FillValue::Text(UNKNOWN_SENTINEL.to_string()))
            }
            _ => None,
        }
    }

    /// Fill the nulls of one column in place, returning how many were filled.
    pub fn apply(df: &mut DataFrame, column: &str, value: &FillValue) -> Result<usize> {
        let series = df.column(column)?.as_materialized_series().clone();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(0);
        }

        let filled = match value {
            FillValue::Number(v) => fill_numeric_nulls(&series, *v)?,
            FillValue::Text(s) => fill_string_nulls(&series, s)?,
        };
        df.replace(column, filled)?;
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_profile(mean: Option<f64>, median: Option<f64>) -> ColumnProfile {
        ColumnProfile {
            name: "n".to_string(),
            row_count: 4,
            missing_count: 1,
            missing_ratio: 0.25,
            stats: ColumnStats::Numeric {
                mean,
                median,
                skewness: 0.0,
            },
        }
    }

    #[test]
    fn test_fill_value_per_strategy() {
        let profile = numeric_profile(Some(2.0), Some(1.5));
        assert_eq!(
            StatisticalImputer::fill_value(&profile, ImputationStrategy::Mean),
            Some(FillValue::Number(2.0))
        );
        assert_eq!(
            StatisticalImputer::fill_value(&profile, ImputationStrategy::Median),
            Some(FillValue::Number(1.5))
        );
        assert_eq!(StatisticalImputer::fill_value(&numeric_profile(None, None), ImputationStrategy::Median), None);
    }

    #[test]
    fn test_apply_fills_only_nulls() {
        let mut df = df!["n" => [Some(1.0), None, Some(3.0)]].unwrap();
        let filled = StatisticalImputer::apply(&mut df, "n", &FillValue::Number(2.0)).unwrap();
        assert_eq!(filled, 1);

        let values: Vec<Option<f64>> = df
            .column("n")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_render_fill_value() {
        assert_eq!(FillValue::Number(628.0).render(), "628.0");
        assert_eq!(FillValue::Text("unknown".to_string()).render(), "unknown");
    }
}

//! Outlier treatment module.
//!
//! Detects outliers in numeric columns with the interquartile range and
//! either clips them to the bounds or drops their rows.

use crate::cleaner::column_kind;
use crate::config::{CleaningConfig, OutlierPolicy};
use crate::error::Result;
use crate::types::{ColumnKind, OutlierTreatment};
use crate::utils::{column_names, quantile_sorted, sorted_non_null_f64};
use polars::prelude::*;
use tracing::{debug, warn};

/// Handles IQR outlier detection and treatment.
#[derive(Debug, Clone)]
pub struct OutlierTreater {
    policy: OutlierPolicy,
    iqr_multiplier: f64,
}

impl Default for OutlierTreater {
    fn default() -> Self {
        Self::new(OutlierPolicy::default(), 1.5)
    }
}

impl OutlierTreater {
    pub fn new(policy: OutlierPolicy, iqr_multiplier: f64) -> Self {
        Self {
            policy,
            iqr_multiplier,
        }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.outlier_policy, config.iqr_multiplier)
    }

    /// IQR bounds `[Q1 - k * IQR, Q3 + k * IQR]` of a numeric column.
    ///
    /// Quartiles use linear interpolation over non-null values. Returns
    /// `None` when the column has no values or a bound is NaN. Bounds may be
    /// infinite when the IQR overflows, in which case nothing lies outside.
    pub fn bounds(&self, series: &Series) -> Result<Option<(f64, f64)>> {
        let sorted = sorted_non_null_f64(series)?;
        let (Some(q1), Some(q3)) = (quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75))
        else {
            return Ok(None);
        };
        let iqr = q3 - q1;
        let lower = q1 - self.iqr_multiplier * iqr;
        let upper = q3 + self.iqr_multiplier * iqr;
        if lower.is_nan() || upper.is_nan() {
            warn!("Column '{}' has undefined IQR bounds", series.name());
            return Ok(None);
        }
        Ok(Some((lower, upper)))
    }

    /// Treat every numeric column in table order.
    ///
    /// With [`OutlierPolicy::Remove`] each column's bounds are computed on
    /// the table left by the previous columns. Nulls are never outliers.
    pub fn treat(&self, df: DataFrame) -> Result<(DataFrame, Vec<OutlierTreatment>)> {
        let mut df = df;
        let mut treatments = Vec::new();

        for name in column_names(&df) {
            let series = df.column(&name)?.as_materialized_series().clone();
            if column_kind(&series) != ColumnKind::Numeric {
                continue;
            }
            let Some((lower, upper)) = self.bounds(&series)? else {
                debug!("Skipping '{}': no usable bounds", name);
                continue;
            };

            let values = series.cast(&DataType::Float64)?;
            let values = values.f64()?;

            let affected = match self.policy {
                OutlierPolicy::Cap => {
                    let mut capped_count = 0;
                    let capped: Vec<Option<f64>> = values
                        .into_iter()
                        .map(|v| {
                            v.map(|x| {
                                if x < lower || x > upper {
                                    capped_count += 1;
                                }
                                x.clamp(lower, upper)
                            })
                        })
                        .collect();
                    df.replace(&name, Series::new(name.as_str().into(), capped))?;
                    capped_count
                }
                OutlierPolicy::Remove => {
                    let keep: Vec<bool> = values
                        .into_iter()
                        .map(|v| v.is_none_or(|x| x >= lower && x <= upper))
                        .collect();
                    let removed = keep.iter().filter(|&&k| !k).count();
                    if removed > 0 {
                        let mask = BooleanChunked::from_slice("mask".into(), &keep);
                        df = df.filter(&mask)?;
                    }
                    removed
                }
            };

            debug!(
                "Column '{}': bounds [{:.4}, {:.4}], {} {}",
                name,
                lower,
                upper,
                affected,
                match self.policy {
                    OutlierPolicy::Cap => "values capped",
                    OutlierPolicy::Remove => "rows removed",
                }
            );

            treatments.push(OutlierTreatment {
                column: name,
                lower,
                upper,
                affected,
            });
        }

        Ok((df, treatments))
    }
}

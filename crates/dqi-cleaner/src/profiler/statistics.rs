//! Statistical helpers for column profiling.
//!
//! Every function takes a Float64 series and ignores its nulls.

use crate::types::NumericSummary;
use crate::utils::{quantile_sorted, sorted_non_null_f64};
use polars::prelude::*;

/// Sample (n - 1) standard deviation.
///
/// Returns `None` with fewer than two values.
pub(crate) fn sample_std(series: &Series) -> PolarsResult<Option<f64>> {
    let n = series.len() - series.null_count();
    let Some(mean) = series.mean() else {
        return Ok(None);
    };
    if n < 2 {
        return Ok(None);
    }

    let variance: f64 = series
        .f64()?
        .into_iter()
        .filter_map(|v| v.map(|val| (val - mean).powi(2)))
        .sum::<f64>()
        / (n - 1) as f64;
    Ok(Some(variance.sqrt()))
}

/// Adjusted Fisher-Pearson skewness (G1).
///
/// `G1 = n / ((n - 1)(n - 2)) * sum(((x - mean) / s)^3)` with `s` the sample
/// standard deviation. Undefined skewness (fewer than three values, or all
/// values equal) is reported as 0.0.
pub(crate) fn skewness(series: &Series) -> PolarsResult<f64> {
    let values = series.f64()?;
    let n = values.len() - values.null_count();
    if n < 3 {
        return Ok(0.0);
    }
    // Rounding in the mean leaves a tiny non-zero spread for constant columns
    if values.min() == values.max() {
        return Ok(0.0);
    }

    let (Some(mean), Some(std)) = (series.mean(), sample_std(series)?) else {
        return Ok(0.0);
    };
    if std == 0.0 || !std.is_finite() {
        return Ok(0.0);
    }

    let n = n as f64;
    let cubed: f64 = values
        .into_iter()
        .filter_map(|v| v.map(|val| ((val - mean) / std).powi(3)))
        .sum();
    Ok(n / ((n - 1.0) * (n - 2.0)) * cubed)
}

/// Descriptive statistics of a column, `None` when it has no values.
pub(crate) fn describe(series: &Series) -> PolarsResult<Option<NumericSummary>> {
    let sorted = sorted_non_null_f64(series)?;
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return Ok(None);
    };
    let (Some(mean), Some(median), Some(q1), Some(q3)) = (
        series.mean(),
        series.median(),
        quantile_sorted(&sorted, 0.25),
        quantile_sorted(&sorted, 0.75),
    ) else {
        return Ok(None);
    };

    Ok(Some(NumericSummary {
        column: series.name().to_string(),
        count: sorted.len(),
        mean,
        std: sample_std(series)?,
        min: first,
        q1,
        median,
        q3,
        max: last,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn series(values: &[f64]) -> Series {
        Series::new("x".into(), values)
    }

    #[test]
    fn test_sample_std() {
        // Variance of [2, 4, 4, 4, 5, 5, 7, 9] with n - 1 is 32 / 7
        let values = series(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(approx(sample_std(&values).unwrap().unwrap(), (32.0f64 / 7.0).sqrt()));
        assert_eq!(sample_std(&series(&[1.0])).unwrap(), None);
    }

    #[test]
    fn test_sample_std_ignores_nulls() {
        let values = Series::new("x".into(), &[Some(1.0), None, Some(3.0)]);
        assert!(approx(sample_std(&values).unwrap().unwrap(), 2.0f64.sqrt()));
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        assert!(approx(skewness(&series(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap(), 0.0));
    }

    #[test]
    fn test_skewness_right_tail_is_positive() {
        let s = skewness(&series(&[1.0, 2.0, 3.0, 1000.0])).unwrap();
        assert!((s - 1.99999).abs() < 0.01, "got {}", s);
    }

    #[test]
    fn test_skewness_undefined_cases() {
        assert_eq!(skewness(&series(&[1.0, 2.0])).unwrap(), 0.0);
        assert_eq!(skewness(&series(&[3.0, 3.0, 3.0, 3.0])).unwrap(), 0.0);
        assert_eq!(skewness(&series(&[])).unwrap(), 0.0);
    }

    #[test]
    fn test_skewness_constant_fraction_is_zero() {
        // The mean of three 0.1s is not exactly 0.1
        assert_eq!(skewness(&series(&[0.1, 0.1, 0.1])).unwrap(), 0.0);
        let with_null = Series::new("x".into(), &[Some(0.7), None, Some(0.7), Some(0.7)]);
        assert_eq!(skewness(&with_null).unwrap(), 0.0);
    }

    #[test]
    fn test_describe() {
        let summary = describe(&series(&[1000.0, 2.0, 1.0, 3.0])).unwrap().unwrap();
        assert_eq!(summary.column, "x");
        assert_eq!(summary.count, 4);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 1.75);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.q3, 252.25);
        assert_eq!(summary.max, 1000.0);
        assert_eq!(summary.mean, 251.5);
        assert!(describe(&series(&[])).unwrap().is_none());
    }
}

//! Shared utilities for the cleaning pipeline.
//!
//! Missing-token handling, numeric cell parsing and the small set of
//! order statistics every stage agrees on live here so that scoring,
//! imputation and outlier treatment never disagree about a value.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Missing Value Tokens
// =============================================================================

/// Cell contents that are read as a missing value when a table is loaded.
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw cell is one of the missing-value tokens.
///
/// Matching is exact and case-sensitive, so `"Null"` stays a value.
#[inline]
pub fn is_na_token(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Parsing Utilities
// =============================================================================

/// Parse a text cell as a finite number.
///
/// Surrounding whitespace is ignored. Decimal and scientific forms are
/// accepted; `inf` and `NaN` spellings are not.
///
/// # Example
///
/// ```rust,ignore
/// use dqi_cleaner::utils::parse_numeric_cell;
///
/// assert_eq!(parse_numeric_cell(" 1e3 "), Some(1000.0));
/// assert_eq!(parse_numeric_cell("$5"), None);
/// ```
pub fn parse_numeric_cell(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Format a number the way it is written back into text cells.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Round half away from zero to a fixed number of decimals.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Collect the non-null values of a numeric Series as f64.
pub fn non_null_f64(series: &Series) -> PolarsResult<Vec<f64>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().flatten().collect())
}

/// Collect the non-null values of a numeric Series, sorted ascending.
pub fn sorted_non_null_f64(series: &Series) -> PolarsResult<Vec<f64>> {
    let mut values = non_null_f64(series)?;
    values.sort_by(|a, b| a.total_cmp(b));
    Ok(values)
}

/// Linear-interpolation quantile over values sorted ascending.
///
/// The position is `q * (n - 1)`; fractional positions interpolate
/// between the two neighbouring values.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;
    // Weighted form stays finite for neighbours near f64::MAX of opposite sign
    Some(sorted[lower] * (1.0 - fraction) + sorted[upper] * fraction)
}

/// Most frequent non-null value of a string Series and its count.
///
/// Ties go to the value seen first, so the result does not depend on
/// hashing order.
pub fn string_mode(series: &Series) -> PolarsResult<Option<(String, usize)>> {
    let values = series.str()?;
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for value in values.into_iter().flatten() {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    Ok(best.map(|(value, count)| (value.to_string(), count)))
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let casted = series.cast(&DataType::Float64)?;
    let filled: Vec<Option<f64>> = casted
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let filled: Vec<Option<String>> = series
        .str()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Column names of a DataFrame as owned strings, in table order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

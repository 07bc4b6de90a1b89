use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text written into categorical cells that cannot be filled from the data.
pub const UNKNOWN_SENTINEL: &str = "unknown";

/// Kind of a column, decided once during type normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Float64 values
    Numeric,
    /// Trimmed, lowercased text
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics gathered for a column, by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnStats {
    Numeric {
        mean: Option<f64>,
        median: Option<f64>,
        /// Adjusted Fisher-Pearson skewness; 0.0 when undefined
        skewness: f64,
    },
    Categorical {
        mode: Option<String>,
        /// Share of the modal value among non-missing cells
        mode_share: f64,
    },
}

/// Per-column profile used to pick an imputation strategy.
///
/// Profiles are derived from the current table and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub row_count: usize,
    pub missing_count: usize,
    pub missing_ratio: f64,
    pub stats: ColumnStats,
}

impl ColumnProfile {
    pub fn kind(&self) -> ColumnKind {
        match self.stats {
            ColumnStats::Numeric { .. } => ColumnKind::Numeric,
            ColumnStats::Categorical { .. } => ColumnKind::Categorical,
        }
    }

    pub fn non_null_count(&self) -> usize {
        self.row_count - self.missing_count
    }
}

/// Fill strategy chosen for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationStrategy {
    Mean,
    Median,
    Mode,
    Unknown,
}

impl ImputationStrategy {
    /// Tag used in reports and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Median => "median",
            Self::Mode => "mode",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ImputationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Imputation decision and outcome for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnImputation {
    pub column: String,
    pub kind: ColumnKind,
    pub strategy: ImputationStrategy,
    /// Value written into missing cells, `None` when nothing could be computed
    pub fill_value: Option<String>,
    /// Number of cells filled
    pub filled: usize,
}

/// Outlier bounds and how many cells or rows they touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierTreatment {
    pub column: String,
    pub lower: f64,
    pub upper: f64,
    /// Values capped or rows removed
    pub affected: usize,
}

/// Negative values replaced in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCorrection {
    pub column: String,
    pub replacement: f64,
    pub corrected: usize,
}

/// Descriptive statistics of a numeric column after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, `None` below two values
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Components of the Data Quality Index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QualityBreakdown {
    /// Mean of per-column missing ratios (0.0 - 1.0)
    pub missing_rate: f64,
    /// Share of rows that repeat an earlier row (0.0 - 1.0)
    pub duplicate_rate: f64,
    /// `100 - 100 * (missing_rate + duplicate_rate)`, rounded to 2 decimals
    pub dqi: f64,
}

/// Everything the pipeline measured and changed during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// RFC 3339 timestamp of report creation
    pub generated_at: String,
    pub duration_ms: u64,

    pub rows_before: usize,
    pub columns_before: usize,
    pub rows_after: usize,
    pub columns_after: usize,

    pub duplicates_removed: usize,
    pub missing_values_resolved: usize,
    pub negative_values_corrected: usize,

    pub quality_before: QualityBreakdown,
    pub quality_after: QualityBreakdown,

    pub imputations: Vec<ColumnImputation>,
    pub corrections: Vec<ValueCorrection>,
    pub outliers: Vec<OutlierTreatment>,
    pub numeric_summaries: Vec<NumericSummary>,

    pub plot_refs: Vec<String>,
    pub summary: String,
}

impl CleaningReport {
    /// Change of the Data Quality Index across the run.
    pub fn dqi_change(&self) -> f64 {
        self.quality_after.dqi - self.quality_before.dqi
    }

    /// Rows dropped by deduplication and outlier removal.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

/// Output of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct CleaningResult {
    pub table: DataFrame,
    pub dqi_before: f64,
    pub dqi_after: f64,
    pub plot_refs: Vec<String>,
    pub summary: String,
    pub report: CleaningReport,
}

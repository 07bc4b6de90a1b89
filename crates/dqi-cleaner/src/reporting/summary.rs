//! Plain-language summary of a cleaning run.

use serde::{Deserialize, Serialize};

/// Figures the summary is written from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Rows of the table as loaded
    pub rows: usize,
    /// Columns of the table as loaded
    pub columns: usize,
    pub missing_values_resolved: usize,
    pub duplicates_removed: usize,
    pub dqi_before: f64,
    pub dqi_after: f64,
}

/// Formats [`SummaryStats`] as a short paragraph.
///
/// The output depends only on the figures passed in.
pub struct SummaryGenerator;

impl SummaryGenerator {
    pub fn generate(stats: &SummaryStats) -> String {
        let mut sentences = Vec::with_capacity(5);

        sentences.push(format!(
            "The dataset originally contained {} records across {} attributes.",
            stats.rows, stats.columns
        ));
        if stats.missing_values_resolved > 0 {
            sentences.push(format!(
                "{} missing values were resolved.",
                stats.missing_values_resolved
            ));
        }
        if stats.duplicates_removed > 0 {
            sentences.push(format!(
                "{} duplicate rows were removed.",
                stats.duplicates_removed
            ));
        }
        sentences.push(format!(
            "The Data Quality Index moved from {:.2}% to {:.2}%.",
            stats.dqi_before, stats.dqi_after
        ));
        sentences.push(
            "The dataset is now structurally and statistically reliable and ready for downstream use."
                .to_string(),
        );

        sentences.join(" ")
    }
}

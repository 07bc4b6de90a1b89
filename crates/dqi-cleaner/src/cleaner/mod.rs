//! Table cleaning stages.
//!
//! This module provides functionality for:
//! - Removing duplicate rows
//! - Normalizing column types (numeric vs categorical)
//! - Correcting invalid negative values

mod corrector;
mod normalizer;

pub use corrector::InvalidValueCorrector;
pub use normalizer::{TypeNormalizer, column_kind};

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Removes rows that repeat an earlier row.
pub struct Deduplicator;

impl Deduplicator {
    /// Drop every row equal to a row with a smaller index.
    ///
    /// All columns are compared and nulls match nulls. Surviving rows keep
    /// their order. Returns the table and the number of rows dropped.
    pub fn remove_duplicates(df: DataFrame) -> Result<(DataFrame, usize)> {
        let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = df.height() - deduped.height();
        if removed == 0 {
            debug!("No duplicate rows found");
            return Ok((df, 0));
        }

        debug!("Removed {} duplicate rows", removed);
        Ok((deduped, removed))
    }
}

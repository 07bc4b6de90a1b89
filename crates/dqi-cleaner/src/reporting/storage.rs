//! Persistence of cleaned tables.

use crate::error::Result;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where cleaned tables are written and raw inputs read from.
pub trait TableStorage: Send + Sync {
    /// Write a table under `file_name`, returning the full path.
    fn save(&self, table: &mut DataFrame, file_name: &str) -> Result<PathBuf>;

    /// Read the raw bytes of a stored file.
    fn load_bytes(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Stores tables as CSV files in a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    output_dir: PathBuf,
}

impl LocalStorage {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for the cleaned version of an input, `cleaned_<stem>.csv`.
    pub fn cleaned_file_name(input_stem: &str) -> String {
        format!("cleaned_{}.csv", input_stem)
    }
}

impl TableStorage for LocalStorage {
    fn save(&self, table: &mut DataFrame, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(file_name);
        let mut file = File::create(&output_path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(table)?;

        info!("Dataset saved: {}", output_path.display());
        Ok(output_path)
    }

    fn load_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }
}

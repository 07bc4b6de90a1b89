//! Table ingestion.
//!
//! Both supported inputs end up as a DataFrame whose columns are all
//! String, with conventional missing-value tokens already turned into
//! nulls. Type decisions are left to the normalizer.

mod document;

use crate::error::{CleaningError, Result};
use crate::utils::is_na_token;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

pub use document::{assemble_table, extract_document_rows};

/// Input formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    /// Comma-separated text with a header row
    Csv,
    /// PDF whose text layer holds one or more tables
    TableDocument,
}

impl TableFormat {
    /// Map a file extension (without the dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "pdf" => Ok(Self::TableDocument),
            other => Err(CleaningError::UnsupportedFormat(format!(".{}", other))),
        }
    }

    /// Pick the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            CleaningError::UnsupportedFormat(format!("{} has no file extension", path.display()))
        })?;
        Self::from_extension(extension)
    }
}

/// Raw bytes of a dataset plus the format they are in.
#[derive(Debug, Clone)]
pub struct TableSource {
    pub bytes: Vec<u8>,
    pub format: TableFormat,
}

impl TableSource {
    pub fn new(bytes: impl Into<Vec<u8>>, format: TableFormat) -> Self {
        Self {
            bytes: bytes.into(),
            format,
        }
    }

    /// CSV content held in memory.
    pub fn csv(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, TableFormat::Csv)
    }

    /// PDF content held in memory.
    pub fn document(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes, TableFormat::TableDocument)
    }

    /// Read a file, choosing the format from its extension.
    ///
    /// The extension is checked before the file is opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = TableFormat::from_path(path)?;
        let bytes = std::fs::read(path)?;
        Ok(Self { bytes, format })
    }
}

/// Parses a [`TableSource`] into an all-text DataFrame.
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    skip_repeated_headers: bool,
}

impl TableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop document rows that are identical to the header.
    ///
    /// Only affects table documents, where multi-page tables usually
    /// repeat their header on every page.
    pub fn with_skip_repeated_headers(mut self, skip: bool) -> Self {
        self.skip_repeated_headers = skip;
        self
    }

    /// Load a table from its source.
    pub fn load(&self, source: &TableSource) -> Result<DataFrame> {
        let df = match source.format {
            TableFormat::Csv => load_csv(&source.bytes)?,
            TableFormat::TableDocument => {
                let pages = extract_document_rows(&source.bytes)?;
                assemble_table(pages, self.skip_repeated_headers)?
            }
        };

        info!(
            "Loaded {:?} table: {} rows x {} columns",
            source.format,
            df.height(),
            df.width()
        );
        Ok(df)
    }
}

/// Read CSV bytes with every column as text.
///
/// The header is read as an ordinary row so that empty and repeated
/// names are caught here instead of being renamed by the reader.
fn load_csv(bytes: &[u8]) -> Result<DataFrame> {
    check_record_widths(bytes)?;

    let raw = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .map_err(|e| match e {
            PolarsError::NoData(_) => CleaningError::EmptyDataset,
            other => CleaningError::MalformedTable(other.to_string()),
        })?;

    if raw.height() == 0 {
        return Err(CleaningError::EmptyDataset);
    }

    let mut header = Vec::with_capacity(raw.width());
    for col in raw.get_columns() {
        let name = col.as_materialized_series().str()?.get(0).map(|s| s.to_string());
        header.push(name);
    }
    let names = validate_header(&header)?;

    let data_rows = raw.height() - 1;
    let mut columns = Vec::with_capacity(names.len());
    for (col, name) in raw.get_columns().iter().zip(&names) {
        let values = col.as_materialized_series().slice(1, data_rows);
        let cells: Vec<Option<&str>> = values
            .str()?
            .into_iter()
            .map(|v| v.filter(|cell| !is_na_token(cell)))
            .collect();
        columns.push(Series::new(name.as_str().into(), cells).into());
    }

    debug!("CSV header: {:?}", names);
    Ok(DataFrame::new(columns)?)
}

/// Reject records whose field count differs from the header's.
///
/// The reader pads short records with nulls, so they are counted here.
/// Separators inside double quotes do not split fields and blank lines
/// are ignored.
fn check_record_widths(bytes: &[u8]) -> Result<()> {
    let mut expected: Option<usize> = None;
    let mut record = 1;
    let mut fields = 1;
    let mut blank = true;
    let mut in_quotes = false;

    let mut finish_record = |fields: usize, blank: bool, record: &mut usize| -> Result<()> {
        if blank {
            return Ok(());
        }
        match expected {
            None => expected = Some(fields),
            Some(width) if width != fields => {
                return Err(CleaningError::MalformedTable(format!(
                    "record {} has {} fields, expected {}",
                    record, fields, width
                )));
            }
            Some(_) => {}
        }
        *record += 1;
        Ok(())
    };

    for &byte in bytes {
        match byte {
            b'"' => {
                in_quotes = !in_quotes;
                blank = false;
            }
            b',' if !in_quotes => {
                fields += 1;
                blank = false;
            }
            b'\n' if !in_quotes => {
                finish_record(fields, blank, &mut record)?;
                fields = 1;
                blank = true;
            }
            b'\r' => {}
            _ => blank = false,
        }
    }
    finish_record(fields, blank, &mut record)
}

/// Check column names are present and unique, returning them in order.
pub(crate) fn validate_header(header: &[Option<String>]) -> Result<Vec<String>> {
    let mut seen = HashSet::with_capacity(header.len());
    let mut names = Vec::with_capacity(header.len());

    for (position, name) in header.iter().enumerate() {
        let name = match name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => {
                return Err(CleaningError::MalformedTable(format!(
                    "column {} has an empty name",
                    position + 1
                )));
            }
        };
        if !seen.insert(name.clone()) {
            return Err(CleaningError::MalformedTable(format!(
                "duplicate column name '{}'",
                name
            )));
        }
        names.push(name);
    }

    Ok(names)
}

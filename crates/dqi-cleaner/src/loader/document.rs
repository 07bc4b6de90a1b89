//! Table extraction from PDF text layers.

use super::validate_header;
use crate::error::{CleaningError, Result};
use crate::utils::is_na_token;
use lopdf::Document;
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::{debug, warn};

/// Cells on a text line are separated by a tab or a run of two or more spaces.
static CELL_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\t+|\s{2,}").expect("Invalid regex: cell separator"));

/// Split one line of page text into cells.
///
/// Returns `None` when the line does not look like a table row.
fn split_row(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let cells: Vec<String> = CELL_SEPARATOR
        .split(trimmed)
        .map(|cell| cell.trim().to_string())
        .collect();
    (cells.len() >= 2).then_some(cells)
}

/// Extract the table rows of every page, in document order.
///
/// The outer vector holds one entry per page that produced at least one row.
pub fn extract_document_rows(bytes: &[u8]) -> Result<Vec<Vec<Vec<String>>>> {
    let document = Document::load_mem(bytes)
        .map_err(|e| CleaningError::MalformedTable(format!("unreadable document: {}", e)))?;

    let mut pages = Vec::new();
    for (page_number, _) in document.get_pages() {
        let text = match document.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!("Skipping page {}: {}", page_number, e);
                continue;
            }
        };

        let rows: Vec<Vec<String>> = text.lines().filter_map(split_row).collect();
        debug!("Page {}: {} table rows", page_number, rows.len());
        if !rows.is_empty() {
            pages.push(rows);
        }
    }

    Ok(pages)
}

/// Combine per-page tables into one DataFrame.
///
/// The first row of the first table is the header; every other row,
/// including headers repeated on later pages, is data unless
/// `skip_repeated_headers` is set. Short rows are padded with nulls.
pub fn assemble_table(pages: Vec<Vec<Vec<String>>>, skip_repeated_headers: bool) -> Result<DataFrame> {
    let mut rows = pages.into_iter().flatten();
    let header_row = rows.next().ok_or(CleaningError::EmptyExtraction)?;

    let header: Vec<Option<String>> = header_row.iter().cloned().map(Some).collect();
    let names = validate_header(&header)?;

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    let mut skipped = 0usize;

    for (index, row) in rows.enumerate() {
        if row.len() > names.len() {
            return Err(CleaningError::MalformedTable(format!(
                "data row {} has {} cells but the header has {}",
                index + 1,
                row.len(),
                names.len()
            )));
        }
        if skip_repeated_headers && row == header_row {
            skipped += 1;
            continue;
        }

        let mut cells = row.into_iter();
        for column in columns.iter_mut() {
            let cell = cells.next().filter(|cell| !is_na_token(cell));
            column.push(cell);
        }
    }

    if skipped > 0 {
        debug!("Dropped {} repeated header rows", skipped);
    }

    let columns: Vec<Column> = names
        .iter()
        .zip(columns)
        .map(|(name, values)| Series::new(name.as_str().into(), values).into())
        .collect();
    Ok(DataFrame::new(columns)?)
}

//! Reporting module.
//!
//! This module turns a finished run into things people and other
//! programs consume:
//! - [`SummaryGenerator`] writes the plain-language summary
//! - [`PlotRenderer`] / [`PngPlotRenderer`] chart numeric columns
//! - [`TableStorage`] / [`LocalStorage`] persist the cleaned table
//!
//! # Example
//!
//! ```rust,ignore
//! use dqi_cleaner::reporting::{LocalStorage, TableStorage};
//!
//! let storage = LocalStorage::new("output");
//! let path = storage.save(&mut result.table, &LocalStorage::cleaned_file_name("sales"))?;
//! println!("{}", result.summary);
//! ```

mod plots;
mod storage;
mod summary;

pub use plots::{BOXPLOT_FILE_NAME, PlotRenderer, PngPlotRenderer, plot_file_name};
pub use storage::{LocalStorage, TableStorage};
pub use summary::{SummaryGenerator, SummaryStats};

//! # sheetstream
//!
//! Streaming row-by-row reader for Excel (.xlsx) worksheets.
//!
//! This library reads a worksheet as a forward-only sequence of rows,
//! pulled one at a time from the worksheet's XML part. The grid is
//! never materialized: memory use is bounded by one row, which makes
//! sheets with tens of thousands of rows practical to process.
//!
//! Each row comes out as a `Vec<String>` of formatted cell values.
//! Missing cells are empty strings, shared-string and boolean cells are
//! resolved, and date-styled numbers are rendered as ISO 8601 text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sheetstream::Workbook;
//!
//! let workbook = Workbook::open("data.xlsx")?;
//! println!("Sheets: {:?}", workbook.sheet_names());
//!
//! let mut sheet = workbook.stream_sheet("Sheet1")?;
//! while let Some(row) = sheet.next_row()? {
//!     println!("{}: {:?}", sheet.name(), row);
//! }
//! # Ok::<(), sheetstream::Error>(())
//! ```
//!
//! Sheets also iterate:
//!
//! ```no_run
//! use sheetstream::Workbook;
//!
//! let workbook = Workbook::open("data.xlsx")?;
//! for row in workbook.stream_sheet_at(0)? {
//!     let row = row?;
//!     println!("{} cells", row.len());
//! }
//! # Ok::<(), sheetstream::Error>(())
//! ```
//!
//! A sheet reader is single-pass: once exhausted (or closed) it yields
//! nothing, and random row access is not offered. Request the sheet
//! from the workbook again to re-read it.

pub mod cell_ref;
pub mod container;
pub mod detect;
pub mod error;
pub mod shared_strings;
pub mod sheet;
pub mod styles;
pub mod workbook;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use error::{Error, Result};
pub use shared_strings::SharedStrings;
pub use sheet::SheetReader;
pub use styles::Styles;
pub use workbook::{SheetRows, Workbook};

use std::path::Path;

/// Open a workbook from a file path.
///
/// # Example
///
/// ```no_run
/// let workbook = sheetstream::open("data.xlsx")?;
/// println!("{} sheets", workbook.sheet_count());
/// # Ok::<(), sheetstream::Error>(())
/// ```
pub fn open(path: impl AsRef<Path>) -> Result<Workbook> {
    Workbook::open(path)
}

/// Open a workbook from bytes.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("data.xlsx")?;
/// let workbook = sheetstream::from_bytes(data)?;
/// # Ok::<(), sheetstream::Error>(())
/// ```
pub fn from_bytes(data: Vec<u8>) -> Result<Workbook> {
    Workbook::from_bytes(data)
}

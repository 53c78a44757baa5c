//! Streaming worksheet access.
//!
//! A worksheet is read as a forward-only sequence of rows, pulled one
//! at a time from the XML part without materializing the grid.
//!
//! # Example
//!
//! ```no_run
//! use sheetstream::Workbook;
//!
//! let workbook = Workbook::open("data.xlsx")?;
//! let mut sheet = workbook.stream_sheet_at(0)?;
//!
//! while let Some(row) = sheet.next_row()? {
//!     println!("{:?}", row);
//! }
//! # Ok::<(), sheetstream::Error>(())
//! ```

mod reader;
mod row;

pub use reader::SheetReader;

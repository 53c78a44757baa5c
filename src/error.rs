//! Error types for the sheetstream library.

use std::io;
use thiserror::Error;

/// Result type alias for sheetstream operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a ZIP-packaged workbook.
    #[error("Unknown file format")]
    UnknownFormat,

    /// Error reading the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content. Fatal for the sheet being streamed;
    /// a retry requires opening the sheet again.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required workbook part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// No sheet with the requested name or index exists.
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// The workbook is password-protected and cannot be read.
    #[error("Workbook is encrypted")]
    Encrypted,

    /// The requested operation is not available on a streaming sheet.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(err.to_string(), "Unknown file format");

        let err = Error::SheetNotFound("Sheet9".to_string());
        assert_eq!(err.to_string(), "Sheet not found: Sheet9");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_unsupported_display() {
        let err = Error::Unsupported("row access by index".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported operation: row access by index"
        );
    }
}

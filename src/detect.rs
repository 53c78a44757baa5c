//! Format checks for workbook files.
//!
//! A readable workbook is a ZIP archive with spreadsheet content.
//! Password-protected workbooks are wrapped in a CFB (OLE2) container
//! instead; those are detected and reported as [`Error::Encrypted`]
//! rather than decrypted.

use crate::error::{Error, Result};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// CFB (OLE2) magic bytes, used by encrypted OOXML workbooks.
const CFB_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Content type for the XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Check if data starts with CFB (OLE2) magic bytes.
pub fn is_cfb_file(data: &[u8]) -> bool {
    data.len() >= 8 && data[..8] == CFB_MAGIC
}

/// Verify that the given bytes look like a readable XLSX workbook.
///
/// Checks the container magic only; the workbook structure itself is
/// validated when the archive is opened.
pub fn check_container_magic(data: &[u8]) -> Result<()> {
    if is_cfb_file(data) {
        return Err(Error::Encrypted);
    }
    if !is_zip_file(data) {
        return Err(Error::UnknownFormat);
    }
    Ok(())
}

/// Verify from `[Content_Types].xml` that an opened archive holds a
/// spreadsheet, with a fallback on the `xl/` folder structure for
/// producers that omit the content-type override.
pub(crate) fn verify_workbook_content(
    content_types: Option<&str>,
    file_names: &[String],
) -> Result<()> {
    if let Some(types) = content_types {
        if types.contains(XLSX_CONTENT_TYPE) {
            return Ok(());
        }
    }

    if file_names.iter().any(|n| n.starts_with("xl/")) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B])); // Too short
    }

    #[test]
    fn test_is_cfb_file() {
        assert!(is_cfb_file(&[
            0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1, 0x00
        ]));
        assert!(!is_cfb_file(&[0x50, 0x4B, 0x03, 0x04]));
    }

    #[test]
    fn test_check_container_magic() {
        assert!(check_container_magic(&[0x50, 0x4B, 0x03, 0x04, 0x00]).is_ok());
        assert!(matches!(
            check_container_magic(&[0x00; 8]),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            check_container_magic(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
            Err(Error::Encrypted)
        ));
    }

    #[test]
    fn test_verify_workbook_content() {
        let with_type = format!("<Types><Override ContentType=\"{}\"/></Types>", super::XLSX_CONTENT_TYPE);
        assert!(verify_workbook_content(Some(&with_type), &[]).is_ok());

        let names = vec!["xl/workbook.xml".to_string()];
        assert!(verify_workbook_content(None, &names).is_ok());

        let other = vec!["word/document.xml".to_string()];
        assert!(matches!(
            verify_workbook_content(None, &other),
            Err(Error::UnknownFormat)
        ));
    }
}

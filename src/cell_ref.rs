//! Excel-style cell reference and range parsing.

/// Map the column letters of a cell reference to a zero-based column index.
///
/// `"A1"` → 0, `"B1"` → 1, `"AA1"` → 26. Digits and `$` anchors are
/// skipped, so both bare column names (`"AB"`) and full references
/// (`"$AB$12"`) resolve the same way. Total for well-formed references;
/// a reference with no column letters resolves to 0.
pub fn column_index(cell_ref: &str) -> u32 {
    let mut col: u32 = 0;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            let upper = ch.to_ascii_uppercase();
            col = col * 26 + (upper as u32 - 'A' as u32 + 1);
        } else {
            break;
        }
    }

    col.saturating_sub(1)
}

/// Parse a cell reference like "C7" into `(col, row)`, both zero-based.
///
/// Returns `None` when either the column letters or the row digits are
/// missing.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() {
            let upper = ch.to_ascii_uppercase();
            col = col * 26 + (upper as u32 - 'A' as u32 + 1);
            saw_col = true;
        } else if ch.is_ascii_digit() {
            row = row * 10 + (ch as u32 - '0' as u32);
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row {
        return None;
    }

    Some((col.saturating_sub(1), row.saturating_sub(1)))
}

/// Parse a range address like "A1:D100" into
/// `(first_row, first_col, last_row, last_col)`, all zero-based.
///
/// A single-cell address ("B3") is treated as a one-cell range.
pub fn parse_range(range: &str) -> Option<(u32, u32, u32, u32)> {
    if let Some((first, last)) = range.split_once(':') {
        let (first_col, first_row) = parse_cell_ref(first)?;
        let (last_col, last_row) = parse_cell_ref(last)?;
        Some((first_row, first_col, last_row, last_col))
    } else {
        let (col, row) = parse_cell_ref(range)?;
        Some((row, col, row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index_single_letter() {
        assert_eq!(column_index("A1"), 0);
        assert_eq!(column_index("B1"), 1);
        assert_eq!(column_index("Z99"), 25);
    }

    #[test]
    fn test_column_index_multi_letter() {
        assert_eq!(column_index("AA1"), 26);
        assert_eq!(column_index("AB12"), 27);
        assert_eq!(column_index("BA7"), 52);
        assert_eq!(column_index("ZZ1"), 701);
        assert_eq!(column_index("AAA1"), 702);
    }

    #[test]
    fn test_column_index_anchors_and_case() {
        assert_eq!(column_index("$C$7"), 2);
        assert_eq!(column_index("c7"), 2);
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("C7"), Some((2, 6)));
        assert_eq!(parse_cell_ref("AB12"), Some((27, 11)));
        assert_eq!(parse_cell_ref("$D$4"), Some((3, 3)));
    }

    #[test]
    fn test_parse_cell_ref_rejects_incomplete() {
        assert_eq!(parse_cell_ref("A"), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("A1:B2"), None);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("A1:D100"), Some((0, 0, 99, 3)));
        assert_eq!(parse_range("B2:C3"), Some((1, 1, 2, 2)));
        assert_eq!(parse_range("B3"), Some((2, 1, 2, 1)));
    }

    #[test]
    fn test_parse_range_malformed() {
        assert_eq!(parse_range("A1:"), None);
        assert_eq!(parse_range(":B2"), None);
        assert_eq!(parse_range("nope"), None);
    }
}

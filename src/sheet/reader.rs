//! Streaming worksheet row reader.
//!
//! Reconstructs the sparse two-dimensional grid of a worksheet from the
//! one-dimensional stream of XML events in its `sheet*.xml` part, one
//! row at a time. The whole sheet is never materialized: the reader
//! holds at most the row currently being accumulated.

use crate::cell_ref::{column_index, parse_range};
use crate::error::{Error, Result};
use crate::shared_strings::SharedStrings;
use crate::styles::Styles;
use quick_xml::events::{BytesStart, Event};
use std::io::BufRead;
use std::sync::Arc;

use super::row::RowBuffer;

/// Per-cell accumulation state between a `<c>` start and its end tag.
#[derive(Debug, Default)]
struct CellState {
    in_cell: bool,
    in_value: bool,
    col: u32,
    cell_type: Option<String>,
    style_index: Option<usize>,
    raw: String,
}

/// Row reconstruction state, separate from the XML pull handle so event
/// handling can borrow it while the parser borrows its own buffer.
struct SheetState {
    name: String,
    shared_strings: Arc<SharedStrings>,
    styles: Arc<Styles>,
    buffer: RowBuffer,
    declared_rows: u32,
    declared_cols: u32,
    /// Implied column for cells without an `r` attribute: one past the
    /// previous cell in the row.
    next_col: u32,
    cell: CellState,
    finished: bool,
}

impl SheetState {
    /// Handle the worksheet's declared used-range marker.
    ///
    /// Sizing is strictly an optimization hint: a missing `ref`
    /// attribute, a single-cell value without `:`, or unparseable
    /// endpoints all leave the counts untouched.
    fn apply_dimension(&mut self, e: &BytesStart<'_>) {
        let mut range = None;
        for attr in e.attributes().flatten() {
            if attr.key.as_ref() == b"ref" {
                range = Some(String::from_utf8_lossy(&attr.value).to_string());
            }
        }

        let Some(range) = range else { return };
        if !range.contains(':') {
            return;
        }
        if let Some((first_row, first_col, last_row, last_col)) = parse_range(&range) {
            self.declared_rows = last_row.saturating_sub(first_row) + 1;
            self.declared_cols = last_col.saturating_sub(first_col) + 1;
        }
    }

    fn begin_row(&mut self) {
        self.buffer.start_row(self.declared_cols as usize);
        self.next_col = 0;
    }

    fn begin_cell(&mut self, e: &BytesStart<'_>) {
        self.cell.in_cell = true;
        self.cell.in_value = false;
        self.cell.raw.clear();
        self.cell.cell_type = None;
        self.cell.style_index = None;
        self.cell.col = self.next_col;

        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    self.cell.col = column_index(&String::from_utf8_lossy(&attr.value));
                }
                b"t" => {
                    self.cell.cell_type =
                        Some(String::from_utf8_lossy(&attr.value).to_string());
                }
                b"s" => {
                    self.cell.style_index = String::from_utf8_lossy(&attr.value).parse().ok();
                }
                _ => {}
            }
        }
    }

    fn finish_cell(&mut self) {
        let value = self.resolve_value();
        self.buffer.set(self.cell.col as usize, value);
        self.next_col = self.cell.col + 1;
        self.cell.in_cell = false;
        self.cell.in_value = false;
    }

    /// Resolve the raw accumulated cell content into its display string,
    /// keyed by the cell's `t` type attribute.
    fn resolve_value(&self) -> String {
        match self.cell.cell_type.as_deref() {
            Some("s") => {
                // Shared string index
                if let Ok(idx) = self.cell.raw.trim().parse::<usize>() {
                    self.shared_strings.get(idx).unwrap_or("").to_string()
                } else {
                    self.cell.raw.clone()
                }
            }
            Some("b") => {
                if self.cell.raw.trim() == "1" {
                    "TRUE".to_string()
                } else {
                    "FALSE".to_string()
                }
            }
            // Error literals ("#DIV/0!", "#N/A") pass through as-is.
            Some("e") => self.cell.raw.clone(),
            Some("str") | Some("inlineStr") => self.cell.raw.clone(),
            _ => {
                // Number or general; date-styled numbers become ISO 8601.
                self.styles
                    .format_numeric(&self.cell.raw, self.cell.style_index.unwrap_or(0))
            }
        }
    }

    fn on_start(&mut self, e: &BytesStart<'_>) {
        match e.local_name().as_ref() {
            // Synthetic bookkeeping, not cell data.
            b"dimension" => self.apply_dimension(e),
            b"row" => self.begin_row(),
            b"c" => self.begin_cell(e),
            b"v" if self.cell.in_cell => self.cell.in_value = true,
            // Inline string text, <is><t>...</t></is>
            b"t" if self.cell.in_cell => self.cell.in_value = true,
            _ => {}
        }
    }

    /// Self-closing elements: a bare `<row/>` is an empty row and yields
    /// immediately; a bare `<c/>` is a valueless cell that still claims
    /// its column slot.
    fn on_empty(&mut self, e: &BytesStart<'_>) -> Option<Vec<String>> {
        match e.local_name().as_ref() {
            b"dimension" => {
                self.apply_dimension(e);
                None
            }
            b"row" => {
                self.begin_row();
                Some(self.buffer.snapshot())
            }
            b"c" => {
                self.begin_cell(e);
                self.finish_cell();
                None
            }
            _ => None,
        }
    }

    fn on_text(&mut self, text: &str) {
        if self.cell.in_value {
            self.cell.raw.push_str(text);
        }
    }

    fn on_end(&mut self, local: &[u8]) -> Option<Vec<String>> {
        match local {
            b"v" | b"t" => {
                self.cell.in_value = false;
                None
            }
            b"c" => {
                self.finish_cell();
                None
            }
            b"row" => Some(self.buffer.snapshot()),
            _ => None,
        }
    }
}

/// Forward-only, single-pass reader over one worksheet's rows.
///
/// Rows are pulled on demand; the reader never looks more than one row
/// ahead, and a sheet cannot be re-iterated once exhausted. Each yielded
/// row is an independent snapshot whose length covers the declared
/// column count or the widest row seen so far, whichever is larger, with
/// unwritten slots as empty strings.
///
/// Not restartable by design: a second iteration over the same reader
/// yields nothing, because the underlying byte source is already
/// exhausted. Reading a sheet again requires opening it again.
pub struct SheetReader<R: BufRead> {
    reader: Option<quick_xml::Reader<R>>,
    buf: Vec<u8>,
    state: SheetState,
}

impl<R: BufRead> SheetReader<R> {
    /// Create a reader over a worksheet part's XML byte source.
    pub(crate) fn new(
        name: impl Into<String>,
        source: R,
        shared_strings: Arc<SharedStrings>,
        styles: Arc<Styles>,
    ) -> Self {
        let mut reader = quick_xml::Reader::from_reader(source);
        reader.config_mut().trim_text(true);

        Self {
            reader: Some(reader),
            buf: Vec::new(),
            state: SheetState {
                name: name.into(),
                shared_strings,
                styles,
                buffer: RowBuffer::new(),
                declared_rows: 0,
                declared_cols: 0,
                next_col: 0,
                cell: CellState::default(),
                finished: false,
            },
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Row count declared by the worksheet's dimension hint.
    ///
    /// Advisory only: 0 when the hint is absent or malformed, and the
    /// actual number of streamed rows wins when they disagree.
    pub fn declared_row_count(&self) -> u32 {
        self.state.declared_rows
    }

    /// Column count declared by the worksheet's dimension hint.
    /// Advisory only; 0 when unknown.
    pub fn declared_column_count(&self) -> u32 {
        self.state.declared_cols
    }

    /// Random row access. Always fails: a streaming sheet is read
    /// front to back exactly once.
    pub fn row(&self, row_index: u32) -> Result<Vec<String>> {
        Err(Error::Unsupported(format!(
            "getting row {} by index is not available while streaming",
            row_index
        )))
    }

    /// Pull the next row from the worksheet.
    ///
    /// Returns `Ok(None)` at end of document and on every call after
    /// that, or after [`close`](Self::close). A parse or I/O failure is
    /// fatal: the error is returned once and the reader is finished.
    pub fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        if self.state.finished {
            return Ok(None);
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        loop {
            self.buf.clear();
            match reader.read_event_into(&mut self.buf) {
                Ok(Event::Start(ref e)) => self.state.on_start(e),
                Ok(Event::Empty(ref e)) => {
                    if let Some(row) = self.state.on_empty(e) {
                        return Ok(Some(row));
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().unwrap_or_default();
                    self.state.on_text(&text);
                }
                Ok(Event::End(ref e)) => {
                    if let Some(row) = self.state.on_end(e.local_name().as_ref()) {
                        return Ok(Some(row));
                    }
                }
                Ok(Event::Eof) => {
                    self.state.finished = true;
                    return Ok(None);
                }
                Err(e) => {
                    self.state.finished = true;
                    return Err(Error::XmlParse(format!(
                        "error reading sheet '{}': {}",
                        self.state.name, e
                    )));
                }
                _ => {}
            }
        }
    }

    /// Release the XML parser and its byte source.
    ///
    /// Calling this mid-stream is a hard stop: subsequent pulls yield no
    /// rows. Dropping the reader releases the same resources.
    pub fn close(&mut self) {
        self.reader = None;
        self.state.finished = true;
    }
}

impl<R: BufRead> Iterator for SheetReader<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

impl<R: BufRead> std::fmt::Debug for SheetReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetReader")
            .field("name", &self.state.name)
            .field("declared_rows", &self.state.declared_rows)
            .field("declared_cols", &self.state.declared_cols)
            .field("finished", &self.state.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader_from_xml(xml: &'static str) -> SheetReader<Cursor<&'static [u8]>> {
        SheetReader::new(
            "TestSheet",
            Cursor::new(xml.as_bytes()),
            Arc::new(SharedStrings::default()),
            Arc::new(Styles::default()),
        )
    }

    fn collect_rows<R: BufRead>(reader: &mut SheetReader<R>) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        while let Some(row) = reader.next_row().unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn test_dimension_hint_and_rows() {
        let xml = r#"<?xml version="1.0"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <dimension ref="A1:B2"/>
    <sheetData>
        <row r="1">
            <c r="A1" t="str"><v>x</v></c>
            <c r="B1" t="str"><v>y</v></c>
        </row>
        <row r="2">
            <c r="A2"><v>1</v></c>
            <c r="B2"><v>2</v></c>
        </row>
    </sheetData>
</worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(reader.declared_row_count(), 2);
        assert_eq!(reader.declared_column_count(), 2);
        assert_eq!(rows, vec![vec!["x", "y"], vec!["1", "2"]]);
    }

    #[test]
    fn test_no_dimension_hint() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="C1" t="str"><v>z</v></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(reader.declared_row_count(), 0);
        assert_eq!(reader.declared_column_count(), 0);
        assert_eq!(rows, vec![vec!["", "", "z"]]);
    }

    #[test]
    fn test_malformed_dimension_is_ignored() {
        let xml = r#"<worksheet>
            <dimension ref="A1"/>
            <sheetData><row><c r="A1"><v>7</v></c></row></sheetData>
        </worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(reader.declared_row_count(), 0);
        assert_eq!(rows, vec![vec!["7"]]);
    }

    #[test]
    fn test_sparse_row_fills_empty_strings() {
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" t="str"><v>first</v></c>
                <c r="E1" t="str"><v>last</v></c>
            </row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(rows, vec![vec!["first", "", "", "", "last"]]);
    }

    #[test]
    fn test_width_grows_monotonically_across_rows() {
        let xml = r#"<worksheet>
            <dimension ref="A1:A2"/>
            <sheetData>
                <row r="1"><c r="E1" t="str"><v>wide</v></c></row>
                <row r="2"><c r="A2" t="str"><v>a</v></c></row>
            </sheetData>
        </worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        // The hint said one column, the data proved five; observed data
        // wins and the grown width carries into the next row.
        assert_eq!(rows[0], vec!["", "", "", "", "wide"]);
        assert_eq!(rows[1], vec!["a", "", "", "", ""]);
    }

    #[test]
    fn test_row_width_covers_declared_columns() {
        let xml = r#"<worksheet>
            <dimension ref="A1:D3"/>
            <sheetData>
                <row r="1"><c r="A1"><v>1</v></c></row>
                <row r="2"/>
                <row r="3"><c r="B3"><v>2</v></c></row>
            </sheetData>
        </worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(rows.len() as u32, reader.declared_row_count());
        for row in &rows {
            assert!(row.len() as u32 >= reader.declared_column_count());
        }
        assert_eq!(rows[1], vec!["", "", "", ""]);
    }

    #[test]
    fn test_end_of_sequence_is_sticky() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        assert!(reader.next_row().unwrap().is_some());
        assert!(reader.next_row().unwrap().is_none());
        assert!(reader.next_row().unwrap().is_none());
        assert!(reader.next_row().unwrap().is_none());
    }

    #[test]
    fn test_second_iteration_yields_nothing() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
            <row r="2"><c r="A2"><v>2</v></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        assert_eq!(reader.by_ref().count(), 2);
        assert_eq!(reader.by_ref().count(), 0);
    }

    #[test]
    fn test_close_mid_stream_stops_production() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
            <row r="2"><c r="A2"><v>2</v></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        assert!(reader.next_row().unwrap().is_some());
        reader.close();
        assert!(reader.next_row().unwrap().is_none());
    }

    #[test]
    fn test_snapshots_are_independent() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="str"><v>one</v></c></row>
            <row r="2"><c r="A2" t="str"><v>two</v></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let mut first = reader.next_row().unwrap().unwrap();
        first[0] = "mutated".to_string();
        let second = reader.next_row().unwrap().unwrap();

        assert_eq!(second, vec!["two"]);
    }

    #[test]
    fn test_random_access_is_unsupported() {
        let reader = reader_from_xml("<worksheet/>");
        assert!(matches!(reader.row(0), Err(Error::Unsupported(_))));
        assert!(matches!(reader.row(41), Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_malformed_xml_is_fatal_once() {
        let xml = "<worksheet><sheetData><row></worksheet>";
        let mut reader = reader_from_xml(xml);

        assert!(reader.next_row().is_err());
        // After the fatal error the sequence is over, not erroring again.
        assert!(reader.next_row().unwrap().is_none());
    }

    #[test]
    fn test_shared_string_resolution() {
        let sst = SharedStrings::parse(
            r#"<sst><si><t>alpha</t></si><si><t>beta</t></si></sst>"#,
        )
        .unwrap();
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" t="s"><v>1</v></c>
                <c r="B1" t="s"><v>0</v></c>
                <c r="C1" t="s"><v>99</v></c>
            </row>
        </sheetData></worksheet>"#;

        let mut reader = SheetReader::new(
            "Strings",
            Cursor::new(xml.as_bytes()),
            Arc::new(sst),
            Arc::new(Styles::default()),
        );
        let rows = collect_rows(&mut reader);

        // An out-of-range index resolves to an empty string.
        assert_eq!(rows, vec![vec!["beta", "alpha", ""]]);
    }

    #[test]
    fn test_boolean_and_error_cells() {
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" t="b"><v>1</v></c>
                <c r="B1" t="b"><v>0</v></c>
                <c r="C1" t="e"><v>#DIV/0!</v></c>
            </row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(rows, vec![vec!["TRUE", "FALSE", "#DIV/0!"]]);
    }

    #[test]
    fn test_inline_string_cell() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>inline text</t></is></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(rows, vec![vec!["inline text"]]);
    }

    #[test]
    fn test_formula_text_is_not_cell_value() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><f>SUM(B1:C1)</f><v>42</v></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(rows, vec![vec!["42"]]);
    }

    #[test]
    fn test_date_styled_cell_is_formatted() {
        let styles = Styles::parse(
            r#"<styleSheet><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14"/></cellXfs></styleSheet>"#,
        );
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" s="1"><v>44197</v></c>
                <c r="B1" s="0"><v>44197</v></c>
            </row>
        </sheetData></worksheet>"#;

        let mut reader = SheetReader::new(
            "Dates",
            Cursor::new(xml.as_bytes()),
            Arc::new(SharedStrings::default()),
            Arc::new(styles),
        );
        let rows = collect_rows(&mut reader);

        assert_eq!(rows, vec![vec!["2021-01-01", "44197"]]);
    }

    #[test]
    fn test_cells_without_reference_take_implied_columns() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c><v>1</v></c><c><v>2</v></c><c><v>3</v></c></row>
            <row r="2"><c r="B2"><v>4</v></c><c><v>5</v></c></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(rows[0], vec!["1", "2", "3"]);
        // Implied position continues after an explicit reference.
        assert_eq!(rows[1], vec!["", "4", "5"]);
    }

    #[test]
    fn test_valueless_cell_claims_its_slot() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="D1"/></row>
        </sheetData></worksheet>"#;

        let mut reader = reader_from_xml(xml);
        let rows = collect_rows(&mut reader);

        assert_eq!(rows, vec![vec!["", "", "", ""]]);
    }

    #[test]
    fn test_iterator_protocol() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1"><v>1</v></c></row>
            <row r="2"><c r="A2"><v>2</v></c></row>
        </sheetData></worksheet>"#;

        let reader = reader_from_xml(xml);
        let rows: Result<Vec<_>> = reader.collect();
        assert_eq!(rows.unwrap(), vec![vec!["1"], vec!["2"]]);
    }

    #[test]
    fn test_empty_sheet_data() {
        let xml = r#"<worksheet><dimension ref="A1:B2"/><sheetData/></worksheet>"#;
        let mut reader = reader_from_xml(xml);
        assert!(reader.next_row().unwrap().is_none());
        assert_eq!(reader.declared_row_count(), 2);
    }
}

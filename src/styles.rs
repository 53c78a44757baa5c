//! Style table parsing for number formats.
//!
//! Only the slice of `xl/styles.xml` that affects a cell's displayed
//! text is modeled: the style-index to number-format mapping, and
//! whether a number format renders a serial date.

use std::collections::HashMap;

/// Number-format information parsed from `xl/styles.xml`.
#[derive(Debug, Default)]
pub struct Styles {
    /// Custom number formats: numFmtId -> formatCode
    num_fmts: HashMap<u32, String>,
    /// Cell style formats: style index -> numFmtId
    cell_xfs: Vec<u32>,
}

fn attr_u32(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<u32> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name {
            return String::from_utf8_lossy(&attr.value).parse().ok();
        }
    }
    None
}

fn attr_string(e: &quick_xml::events::BytesStart<'_>, name: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name {
            return Some(String::from_utf8_lossy(&attr.value).to_string());
        }
    }
    None
}

impl Styles {
    /// Parse styles from `xl/styles.xml` content.
    ///
    /// A malformed styles part yields whatever was readable before the
    /// failure; cells then fall back to their raw values.
    pub fn parse(xml: &str) -> Self {
        let mut styles = Self::default();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_num_fmts = false;
        let mut in_cell_xfs = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e))
                | Ok(quick_xml::events::Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = true,
                    b"cellXfs" => in_cell_xfs = true,
                    b"numFmt" if in_num_fmts => {
                        if let Some(id) = attr_u32(e, b"numFmtId") {
                            let code = attr_string(e, b"formatCode").unwrap_or_default();
                            styles.num_fmts.insert(id, code);
                        }
                    }
                    b"xf" if in_cell_xfs => {
                        styles.cell_xfs.push(attr_u32(e, b"numFmtId").unwrap_or(0));
                    }
                    _ => {}
                },
                Ok(quick_xml::events::Event::End(ref e)) => match e.local_name().as_ref() {
                    b"numFmts" => in_num_fmts = false,
                    b"cellXfs" => in_cell_xfs = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        styles
    }

    /// Get the numFmtId for a cell style index (the `s` attribute).
    pub fn num_fmt_id(&self, style_index: usize) -> Option<u32> {
        self.cell_xfs.get(style_index).copied()
    }

    /// Check if a cell style index refers to a date format.
    pub fn is_date_style(&self, style_index: usize) -> bool {
        self.num_fmt_id(style_index)
            .is_some_and(|id| self.is_date_format(id))
    }

    /// Check if a numFmtId represents a date format.
    pub fn is_date_format(&self, num_fmt_id: u32) -> bool {
        // Built-in ids: 14-22 are dates, 45-47 are times.
        if (14..=22).contains(&num_fmt_id) || (45..=47).contains(&num_fmt_id) {
            return true;
        }

        self.num_fmts
            .get(&num_fmt_id)
            .is_some_and(|code| is_date_format_code(code))
    }

    /// Render a raw numeric cell value under the given style index.
    ///
    /// Date-styled numbers become ISO 8601 strings; everything else
    /// passes through unchanged.
    pub fn format_numeric(&self, raw: &str, style_index: usize) -> String {
        if self.is_date_style(style_index) {
            if let Some(date) = raw.parse::<f64>().ok().and_then(format_serial_date) {
                return date;
            }
        }
        raw.to_string()
    }
}

/// Check if a format code string represents a date format.
///
/// Looks for day/year/month tokens outside quoted literals and
/// bracketed sections (color codes, locale prefixes).
fn is_date_format_code(format_code: &str) -> bool {
    let mut in_bracket = false;
    let mut in_quote = false;
    let mut prev = '\0';
    let mut has_month_candidate = false;

    for c in format_code.chars() {
        match c {
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            '"' => in_quote = !in_quote,
            '\\' if !in_bracket && !in_quote => {}
            _ if !in_bracket && !in_quote => match c.to_ascii_lowercase() {
                'd' | 'y' => return true,
                // 'm' is month next to day/year tokens, minute next to
                // hour/second tokens.
                'm' => {
                    let p = prev.to_ascii_lowercase();
                    if p == 'd' || p == 'y' {
                        return true;
                    }
                    has_month_candidate = true;
                }
                _ => {}
            },
            _ => {}
        }
        prev = c;
    }

    if has_month_candidate {
        let lower = format_code.to_lowercase();
        return lower.contains('d') || lower.contains('y');
    }

    false
}

/// Convert an Excel serial date number to an ISO 8601 string.
///
/// Serial dates count days from the 1900 epoch, with the Lotus 1-2-3
/// leap-year bug: Excel believes Feb 29, 1900 exists (serial 60).
pub fn format_serial_date(serial: f64) -> Option<String> {
    if serial < 0.0 {
        return None;
    }

    let adjusted = if serial > 60.0 { serial - 1.0 } else { serial };
    let days = adjusted.floor() as i64;

    let (year, month, day) = days_to_ymd(days)?;

    let time_fraction = serial.fract();
    if time_fraction > 0.0001 {
        let total_seconds = (time_fraction * 86400.0).round() as u32;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        Some(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year, month, day, hours, minutes, seconds
        ))
    } else {
        Some(format!("{:04}-{:02}-{:02}", year, month, day))
    }
}

/// Convert days since December 31, 1899 to (year, month, day).
fn days_to_ymd(days: i64) -> Option<(i32, u32, u32)> {
    if days < 1 {
        return None;
    }

    let mut year = 1900;
    let mut remaining = days;

    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining <= days_in_year {
            break;
        }
        remaining -= days_in_year;
        year += 1;
    }

    let month_days = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 1u32;
    for &in_month in &month_days {
        if remaining <= in_month as i64 {
            break;
        }
        remaining -= in_month as i64;
        month += 1;
    }

    Some((year, month, remaining.max(1) as u32))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

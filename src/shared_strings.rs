//! Shared strings table parsing.
//!
//! Text cells in a worksheet store an index into the workbook-wide
//! `xl/sharedStrings.xml` pool instead of the text itself.

use crate::error::{Error, Result};

/// Deduplicated string pool referenced by index from text cells.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    /// All strings in order
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse shared strings from `xl/sharedStrings.xml` content.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut strings = Vec::new();
        let mut reader = quick_xml::Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut in_si = false;
        let mut in_text = false;
        let mut in_phonetic = false;
        let mut current = String::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"sst" => {
                        // uniqueCount gives the entry count up front
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"uniqueCount" {
                                if let Ok(n) =
                                    String::from_utf8_lossy(&attr.value).parse::<usize>()
                                {
                                    strings.reserve(n);
                                }
                            }
                        }
                    }
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    // Phonetic guide runs are annotations, not cell text.
                    b"rPh" if in_si => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_text = true,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Text(ref e)) => {
                    if in_text {
                        let text = e.unescape().unwrap_or_default();
                        current.push_str(&text);
                    }
                }
                Ok(quick_xml::events::Event::End(ref e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(current.clone());
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { strings })
    }

    /// Get a string by index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Number of entries in the pool.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="3">
    <si><t>Hello</t></si>
    <si><t>World</t></si>
    <si><t>Test</t></si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 3);
        assert_eq!(ss.get(0), Some("Hello"));
        assert_eq!(ss.get(1), Some("World"));
        assert_eq!(ss.get(2), Some("Test"));
        assert_eq!(ss.get(3), None);
    }

    #[test]
    fn test_rich_text_runs_concatenate() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <si>
        <r><t>Hello</t></r>
        <r><t>World</t></r>
    </si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.len(), 1);
        assert_eq!(ss.get(0), Some("HelloWorld"));
    }

    #[test]
    fn test_phonetic_runs_excluded() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <si>
        <t>東京</t>
        <rPh sb="0" eb="2"><t>トウキョウ</t></rPh>
    </si>
</sst>"#;

        let ss = SharedStrings::parse(xml).unwrap();
        assert_eq!(ss.get(0), Some("東京"));
    }

    #[test]
    fn test_empty_pool() {
        let xml = r#"<?xml version="1.0"?><sst/>"#;
        let ss = SharedStrings::parse(xml).unwrap();
        assert!(ss.is_empty());
    }
}

//! Workbook opening and sheet lookup.

use crate::container::{OoxmlContainer, Relationships};
use crate::detect;
use crate::error::{Error, Result};
use crate::shared_strings::SharedStrings;
use crate::sheet::SheetReader;
use crate::styles::Styles;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// Rows streamed from a worksheet part held by a [`Workbook`].
pub type SheetRows = SheetReader<Cursor<Vec<u8>>>;

/// Sheet entry from workbook.xml.
#[derive(Debug, Clone)]
struct SheetInfo {
    name: String,
    rel_id: String,
}

/// An opened XLSX workbook.
///
/// Holds the container plus the workbook-wide lookup tables (shared
/// strings, styles) that cell resolution needs, and hands out one
/// streaming reader per sheet request. Each reader is independent;
/// requesting the same sheet twice starts a fresh pass.
pub struct Workbook {
    container: OoxmlContainer,
    sheets: Vec<SheetInfo>,
    relationships: Relationships,
    shared_strings: Arc<SharedStrings>,
    styles: Arc<Styles>,
}

impl Workbook {
    /// Open a workbook from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = OoxmlContainer::open(path)?;
        Self::from_container(container)
    }

    /// Open a workbook from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = OoxmlContainer::from_bytes(data)?;
        Self::from_container(container)
    }

    /// Open a workbook from a reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let container = OoxmlContainer::from_reader(reader)?;
        Self::from_container(container)
    }

    fn from_container(container: OoxmlContainer) -> Result<Self> {
        let content_types = container.read_xml("[Content_Types].xml").ok();
        detect::verify_workbook_content(content_types.as_deref(), &container.list_parts())?;

        // Both lookup parts are optional; a workbook without text cells
        // has no sharedStrings.xml at all.
        let shared_strings = match container.read_xml("xl/sharedStrings.xml") {
            Ok(xml) => SharedStrings::parse(&xml)?,
            Err(_) => SharedStrings::default(),
        };

        let styles = match container.read_xml("xl/styles.xml") {
            Ok(xml) => Styles::parse(&xml),
            Err(_) => Styles::default(),
        };

        let sheets = Self::parse_workbook(&container)?;
        let relationships = container.read_relationships("xl/workbook.xml")?;

        Ok(Self {
            container,
            sheets,
            relationships,
            shared_strings: Arc::new(shared_strings),
            styles: Arc::new(styles),
        })
    }

    /// Parse xl/workbook.xml for the sheet list.
    fn parse_workbook(container: &OoxmlContainer) -> Result<Vec<SheetInfo>> {
        let xml = container.read_xml("xl/workbook.xml")?;

        let mut sheets = Vec::new();
        let mut reader = quick_xml::Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(quick_xml::events::Event::Empty(ref e))
                | Ok(quick_xml::events::Event::Start(ref e))
                    if e.local_name().as_ref() == b"sheet" =>
                {
                    let mut name = String::new();
                    let mut rel_id = String::new();

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            b"r:id" => {
                                rel_id = String::from_utf8_lossy(&attr.value).to_string();
                            }
                            _ => {}
                        }
                    }

                    if !name.is_empty() && !rel_id.is_empty() {
                        sheets.push(SheetInfo { name, rel_id });
                    }
                }
                Ok(quick_xml::events::Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Number of sheets in the workbook.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Sheet names, in workbook order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    /// Open a streaming reader over the named sheet.
    pub fn stream_sheet(&self, name: &str) -> Result<SheetRows> {
        let sheet = self
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        self.open_sheet(sheet)
    }

    /// Open a streaming reader over the sheet at the given position.
    pub fn stream_sheet_at(&self, index: usize) -> Result<SheetRows> {
        let sheet = self
            .sheets
            .get(index)
            .ok_or_else(|| Error::SheetNotFound(format!("index {}", index)))?;
        self.open_sheet(sheet)
    }

    fn open_sheet(&self, sheet: &SheetInfo) -> Result<SheetRows> {
        let target = self
            .relationships
            .target(&sheet.rel_id)
            .ok_or_else(|| Error::MissingComponent(format!("relationship {}", sheet.rel_id)))?;

        let part_path = OoxmlContainer::resolve_path("xl/workbook.xml", target);
        let bytes = self.container.read_part(&part_path)?;

        Ok(SheetReader::new(
            sheet.name.clone(),
            Cursor::new(bytes),
            Arc::clone(&self.shared_strings),
            Arc::clone(&self.styles),
        ))
    }
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook")
            .field("sheets", &self.sheet_names())
            .finish()
    }
}

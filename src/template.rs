//! The MODS reference template.
//!
//! The template is a MODS XML document in which every value a spreadsheet can
//! supply is a `[[code]]` placeholder, in element text or attribute values:
//!
//! ```xml
//! <titleInfo type="[[ti1:type]]">
//!   <title>[[ti1:title]]</title>
//! </titleInfo>
//! ```
//!
//! Header codes that have no placeholder in the template are reported so that
//! users notice typos and columns that will be silently dropped.

use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use lazy_static::lazy_static;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::error::Result;

/// The template shipped with the validator.
pub const BUNDLED_TEMPLATE: &str = include_str!("../data/mods_template.xml");

lazy_static! {
    static ref PLACEHOLDER: Regex = Regex::new(r"\[\[([A-Za-z0-9:]+)\]\]").expect("valid regex");
}

/// Header codes known to a reference template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    codes: IndexSet<String>,
}

impl Template {
    /// Collect the placeholder codes from template XML, in document order.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::Template` if the XML is malformed.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        let mut buf = Vec::new();
        let mut codes = IndexSet::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) => {
                    for attr in e.attributes() {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        let value = attr.decode_and_unescape_value(&reader)?;
                        collect_placeholders(&value, &mut codes);
                    }
                },
                Event::Text(e) => {
                    let text = e.unescape()?;
                    collect_placeholders(&text, &mut codes);
                },
                Event::CData(e) => {
                    collect_placeholders(&String::from_utf8_lossy(&e), &mut codes);
                },
                Event::Eof => break,
                _ => {},
            }
            buf.clear();
        }

        Ok(Template { codes })
    }

    /// Read and parse a template file.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::IoError` if the file cannot be read, or
    /// `RpsError::Template` if it is malformed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let xml = fs::read_to_string(path)?;
        Self::parse(&xml)
    }

    /// The bundled template.
    ///
    /// # Errors
    ///
    /// Returns `RpsError::Template` if the bundled XML does not parse.
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_TEMPLATE)
    }

    /// Whether the template has a placeholder for `code`.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Placeholder codes in document order, without repeats.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Number of distinct placeholder codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the template has no placeholders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

fn collect_placeholders(text: &str, codes: &mut IndexSet<String>) {
    for caps in PLACEHOLDER.captures_iter(text) {
        codes.insert(caps[1].to_string());
    }
}

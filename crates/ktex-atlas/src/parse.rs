//! Sidecar XML parsing.
//!
//! The sidecar looks like:
//!
//! ```xml
//! <Atlas>
//!     <Texture filename="hud.tex"/>
//!     <Elements>
//!         <Element name="button.tex" u1="0.0" u2="0.25" v1="0.75" v2="1.0"/>
//!     </Elements>
//! </Atlas>
//! ```
//!
//! Parsing never fails. Problems are collected as [`AtlasWarning`]s next to
//! whatever elements could be recovered.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::warn;

use crate::element::{AtlasElement, UvRect};

/// Name given to entries without a `name` attribute.
pub const UNKNOWN_NAME: &str = "Unknown";

const ROOT_TAG: &[u8] = b"Atlas";
const ELEMENTS_TAG: &[u8] = b"Elements";

/// A non-fatal problem found while reading a sidecar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasWarning {
    /// The document is not well-formed XML. No elements were kept.
    #[error("malformed atlas document: {0}")]
    Malformed(String),

    /// The document has no `Atlas/Elements` node.
    #[error("atlas document has no Atlas/Elements node")]
    MissingElements,

    /// An entry had no `name` attribute.
    #[error("atlas element #{index} has no name, using \"Unknown\"")]
    MissingName { index: usize },

    /// A coordinate attribute was not a decimal number.
    #[error("atlas element '{element}': {attribute}=\"{value}\" is not a number, using 0")]
    InvalidNumber {
        element: String,
        attribute: &'static str,
        value: String,
    },

    /// The sidecar exists but could not be read.
    #[error("atlas sidecar could not be read: {0}")]
    Unreadable(String),
}

/// Result of parsing a sidecar: recovered elements plus any warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtlasParse {
    pub elements: Vec<AtlasElement>,
    pub warnings: Vec<AtlasWarning>,
}

impl AtlasParse {
    /// An empty result carrying a single warning.
    pub fn with_warning(warning: AtlasWarning) -> Self {
        warn!("{}", warning);
        Self {
            elements: Vec::new(),
            warnings: vec![warning],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// First element whose rectangle contains the point (edges inclusive).
    pub fn element_at(&self, x: f64, y: f64) -> Option<&AtlasElement> {
        self.elements.iter().find(|e| e.rect.contains(x, y))
    }

    /// First element with the given name.
    pub fn find(&self, name: &str) -> Option<&AtlasElement> {
        self.elements.iter().find(|e| e.name == name)
    }

    fn push_warning(&mut self, warning: AtlasWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Parse sidecar bytes. Invalid UTF-8 is reported as a malformed document.
pub fn parse_bytes(xml: &[u8], reference_width: u32, reference_height: u32) -> AtlasParse {
    match std::str::from_utf8(xml) {
        Ok(text) => parse(text, reference_width, reference_height),
        Err(e) => AtlasParse::with_warning(AtlasWarning::Malformed(e.to_string())),
    }
}

/// Parse a sidecar and map every `Atlas/Elements/*` entry onto a
/// `reference_width` x `reference_height` texture.
pub fn parse(xml: &str, reference_width: u32, reference_height: u32) -> AtlasParse {
    let mut result = AtlasParse::default();

    let entries = match collect_entries(xml) {
        Ok(Some(entries)) => entries,
        Ok(None) => {
            result.push_warning(AtlasWarning::MissingElements);
            return result;
        }
        Err(message) => return AtlasParse::with_warning(AtlasWarning::Malformed(message)),
    };

    for (index, entry) in entries.into_iter().enumerate() {
        let name = match entry.name {
            Some(name) => name,
            None => {
                result.push_warning(AtlasWarning::MissingName { index });
                UNKNOWN_NAME.to_string()
            }
        };

        let mut number = |attribute: &'static str, value: &Option<String>| -> f64 {
            match parse_number(value.as_deref()) {
                Ok(n) => n,
                Err(bad) => {
                    result.push_warning(AtlasWarning::InvalidNumber {
                        element: name.clone(),
                        attribute,
                        value: bad,
                    });
                    0.0
                }
            }
        };

        let uv = UvRect {
            u1: number("u1", &entry.u1),
            u2: number("u2", &entry.u2),
            v1: number("v1", &entry.v1),
            v2: number("v2", &entry.v2),
        };

        let rect = uv.to_pixels(reference_width, reference_height);
        result.elements.push(AtlasElement::new(name, rect));
    }

    result
}

/// Raw attribute values of one `Elements` child.
#[derive(Debug, Default)]
struct RawEntry {
    name: Option<String>,
    u1: Option<String>,
    u2: Option<String>,
    v1: Option<String>,
    v2: Option<String>,
}

/// Walk the document and pull the attributes of every child of the first
/// `Atlas/Elements` node.
///
/// `Ok(None)` means the document is well-formed but has no such node; `Err`
/// carries the reason the document is not well-formed.
fn collect_entries(xml: &str) -> Result<Option<Vec<RawEntry>>, String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut seen_root = false;
    let mut entries: Option<Vec<RawEntry>> = None;
    // True while inside the first Atlas/Elements node.
    let mut collecting = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if path.is_empty() && seen_root {
                    return Err("multiple root elements".into());
                }
                seen_root = true;
                if collecting && path.len() == 2 {
                    push_entry(&mut entries, &e)?;
                }
                path.push(e.name().as_ref().to_vec());
                if path.len() == 2 && entries.is_none() && is_elements_path(&path) {
                    entries = Some(Vec::new());
                    collecting = true;
                }
            }
            Ok(Event::Empty(e)) => {
                if path.is_empty() && seen_root {
                    return Err("multiple root elements".into());
                }
                seen_root = true;
                if collecting && path.len() == 2 {
                    push_entry(&mut entries, &e)?;
                }
                if path.len() == 1
                    && entries.is_none()
                    && path[0] == ROOT_TAG
                    && e.name().as_ref() == ELEMENTS_TAG
                {
                    // `<Elements/>`: present but empty.
                    entries = Some(Vec::new());
                }
            }
            Ok(Event::End(_)) => {
                if path.len() == 2 && collecting {
                    collecting = false;
                }
                path.pop();
            }
            Ok(Event::Text(t)) if path.is_empty() && t.iter().any(|b| !b.is_ascii_whitespace()) => {
                return Err("text outside root element".into());
            }
            Ok(Event::CData(_)) if path.is_empty() => {
                return Err("CDATA outside root element".into());
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                ))
            }
        }
    }

    if !seen_root {
        return Err("no root element".into());
    }
    if let Some(open) = path.last() {
        return Err(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(open)
        ));
    }

    Ok(entries)
}

fn is_elements_path(path: &[Vec<u8>]) -> bool {
    path.len() == 2 && path[0] == ROOT_TAG && path[1] == ELEMENTS_TAG
}

fn push_entry(entries: &mut Option<Vec<RawEntry>>, start: &BytesStart<'_>) -> Result<(), String> {
    let mut entry = RawEntry::default();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("bad attribute: {}", e))?;
        let value = attr
            .unescape_value()
            .map_err(|e| format!("bad attribute value: {}", e))?
            .into_owned();

        match attr.key.as_ref() {
            b"name" => entry.name = Some(value),
            b"u1" => entry.u1 = Some(value),
            b"u2" => entry.u2 = Some(value),
            b"v1" => entry.v1 = Some(value),
            b"v2" => entry.v2 = Some(value),
            _ => {}
        }
    }

    if let Some(list) = entries.as_mut() {
        list.push(entry);
    }
    Ok(())
}

/// Parse a decimal-point number. Missing or blank values are 0.0; anything
/// else unparsable is returned as `Err` with the original text.
fn parse_number(value: Option<&str>) -> Result<f64, String> {
    match value.map(str::trim) {
        None | Some("") => Ok(0.0),
        Some(text) => text.parse::<f64>().map_err(|_| text.to_string()),
    }
}

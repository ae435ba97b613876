//! Incremental XML rendering for `urlset` and `sitemapindex` documents.
//!
//! A [`DocumentBuilder`] keeps the rendered bytes of every entry it holds, so
//! the serialized size of the finished document is always known without
//! rendering it again. The planner relies on that to check the byte limit
//! after each append and to undo the last append when a limit is crossed.

use std::fmt;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Serialize};

use crate::rules::{Metadata, format_lastmod};
use crate::{Error, Result};

/// Default XML declaration written before the root element.
pub const DEFAULT_XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// Namespace of the sitemaps.org protocol, used for both document kinds.
pub const SITEMAP_XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// The two document kinds the protocol defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentKind {
    /// A `<urlset>` listing page URLs.
    UrlSet,
    /// A `<sitemapindex>` listing other sitemap files.
    SitemapIndex,
}

impl DocumentKind {
    /// Name of the root element.
    #[must_use]
    pub const fn root_element(self) -> &'static str {
        match self {
            Self::UrlSet => "urlset",
            Self::SitemapIndex => "sitemapindex",
        }
    }

    /// Name of the per-entry element.
    #[must_use]
    pub const fn entry_element(self) -> &'static str {
        match self {
            Self::UrlSet => "url",
            Self::SitemapIndex => "sitemap",
        }
    }

    /// Detect the kind from a root element name.
    #[must_use]
    pub fn from_root_element(name: &[u8]) -> Option<Self> {
        match name {
            b"urlset" => Some(Self::UrlSet),
            b"sitemapindex" => Some(Self::SitemapIndex),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UrlSet => f.write_str("sitemap"),
            Self::SitemapIndex => f.write_str("index"),
        }
    }
}

/// The declaration and namespace used for one document kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFormat {
    /// Text written verbatim before the root element.
    pub header: String,
    /// Value of the root element's `xmlns` attribute.
    pub xmlns: String,
}

impl Default for DocumentFormat {
    fn default() -> Self {
        Self {
            header: DEFAULT_XML_HEADER.to_string(),
            xmlns: SITEMAP_XMLNS.to_string(),
        }
    }
}

/// One document under construction.
///
/// Rendered entries are kept back to back in `body`; `boundaries` records
/// where each entry starts so the last one can be cut off again.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    kind: DocumentKind,
    prologue: Vec<u8>,
    body: Vec<u8>,
    boundaries: Vec<usize>,
    epilogue: Vec<u8>,
}

impl DocumentBuilder {
    /// Start an empty document of `kind`.
    pub fn new(kind: DocumentKind, format: &DocumentFormat) -> Result<Self> {
        let mut prologue = Writer::new(format.header.as_bytes().to_vec());
        let root =
            BytesStart::new(kind.root_element()).with_attributes([("xmlns", format.xmlns.as_str())]);
        prologue.write_event(Event::Start(root))?;
        let mut prologue = prologue.into_inner();
        prologue.push(b'\n');

        let mut epilogue = Writer::new(Vec::new());
        epilogue.write_event(Event::End(BytesEnd::new(kind.root_element())))?;
        let mut epilogue = epilogue.into_inner();
        epilogue.push(b'\n');

        Ok(Self {
            kind,
            prologue,
            body: Vec::new(),
            boundaries: Vec::new(),
            epilogue,
        })
    }

    /// The kind of document being built.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Append one entry.
    ///
    /// Index documents only carry `<lastmod>`; `priority` and `changefreq`
    /// are ignored for them.
    ///
    /// Fails with [`Error::InvalidUrl`] when `location` holds a character
    /// XML 1.0 does not allow, such as a control character.
    pub fn append(&mut self, location: &str, metadata: &Metadata) -> Result<()> {
        if let Some(c) = first_non_xml_char(location) {
            return Err(Error::InvalidUrl(format!(
                "\"{}\" contains U+{:04X}, which XML does not allow",
                location.escape_debug(),
                u32::from(c)
            )));
        }
        let start = self.body.len();
        match self.render_entry(location, metadata) {
            Ok(()) => {
                self.boundaries.push(start);
                Ok(())
            },
            Err(e) => {
                self.body.truncate(start);
                Err(e)
            },
        }
    }

    fn render_entry(&mut self, location: &str, metadata: &Metadata) -> Result<()> {
        let entry = self.kind.entry_element();
        self.body.extend_from_slice(b"  ");
        let mut writer = Writer::new(&mut self.body);

        writer.write_event(Event::Start(BytesStart::new(entry)))?;
        write_text_element(&mut writer, "loc", location)?;
        if let Some(lastmod) = &metadata.lastmod {
            write_text_element(&mut writer, "lastmod", &format_lastmod(lastmod))?;
        }
        if self.kind == DocumentKind::UrlSet {
            if let Some(priority) = metadata.priority {
                write_text_element(&mut writer, "priority", &priority.to_string())?;
            }
            if let Some(changefreq) = metadata.changefreq {
                write_text_element(&mut writer, "changefreq", changefreq.as_str())?;
            }
        }
        writer.write_event(Event::End(BytesEnd::new(entry)))?;
        self.body.push(b'\n');
        Ok(())
    }

    /// Serialized size in bytes of the document as it would be finalized now.
    #[must_use]
    pub fn current_size(&self) -> usize {
        self.prologue.len() + self.body.len() + self.epilogue.len()
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn current_count(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether the document holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Remove the most recently appended entry.
    pub fn rollback_last(&mut self) -> Result<()> {
        let start = self
            .boundaries
            .pop()
            .ok_or_else(|| Error::Other("rollback on an empty document".to_string()))?;
        self.body.truncate(start);
        Ok(())
    }

    /// Consume the builder and return the complete document.
    #[must_use]
    pub fn finalize(self) -> Vec<u8> {
        let mut bytes = self.prologue;
        bytes.reserve(self.body.len() + self.epilogue.len());
        bytes.extend_from_slice(&self.body);
        bytes.extend_from_slice(&self.epilogue);
        bytes
    }
}

/// First character of `text` outside the XML 1.0 `Char` production.
pub(crate) fn first_non_xml_char(text: &str) -> Option<char> {
    text.chars().find(|&c| {
        !matches!(c,
            '\t' | '\n' | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}')
    })
}

fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

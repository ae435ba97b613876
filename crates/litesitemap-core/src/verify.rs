//! Reading sitemap documents back.
//!
//! Used twice: before publishing, every staged document is parsed again and
//! compared with what the planner believes it wrote; and the `check` command
//! uses the same parser to report on existing files.
//!
//! The parser is strict. Unknown root elements, entries without `<loc>`, and
//! invalid `lastmod`, `priority`, or `changefreq` values are errors rather
//! than skipped.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::config::{MAX_LIMIT_LINK, MAX_LIMIT_SIZE};
use crate::document::{DocumentKind, first_non_xml_char};
use crate::naming::Nameable;
use crate::rules::{ChangeFrequency, Priority, parse_lastmod};
use crate::staging::StagedFile;
use crate::{Error, Result};

/// One `<url>` or `<sitemap>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedEntry {
    /// Location.
    pub loc: String,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<DateTime<Utc>>,
    /// Priority (URL documents only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Change frequency (URL documents only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<ChangeFrequency>,
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    /// Kind detected from the root element.
    pub kind: DocumentKind,
    /// `xmlns` of the root element, if present.
    pub namespace: Option<String>,
    /// Entries in document order.
    pub entries: Vec<ParsedEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Loc,
    Lastmod,
    Priority,
    Changefreq,
}

impl Field {
    fn from_name(name: &[u8], kind: DocumentKind) -> Option<Self> {
        match (name, kind) {
            (b"loc", _) => Some(Self::Loc),
            (b"lastmod", _) => Some(Self::Lastmod),
            (b"priority", DocumentKind::UrlSet) => Some(Self::Priority),
            (b"changefreq", DocumentKind::UrlSet) => Some(Self::Changefreq),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct PartialEntry {
    loc: Option<String>,
    lastmod: Option<DateTime<Utc>>,
    priority: Option<Priority>,
    changefreq: Option<ChangeFrequency>,
}

impl PartialEntry {
    fn set(&mut self, field: Field, text: &str) -> Result<()> {
        match field {
            Field::Loc => self.loc = Some(text.to_string()),
            Field::Lastmod => {
                self.lastmod = Some(
                    parse_lastmod(text)
                        .ok_or_else(|| Error::Parse(format!("invalid lastmod \"{text}\"")))?,
                );
            },
            Field::Priority => {
                let value: f32 = text
                    .parse()
                    .map_err(|_| Error::Parse(format!("invalid priority \"{text}\"")))?;
                self.priority = Some(
                    Priority::new(value)
                        .ok_or_else(|| Error::Parse(format!("priority out of range \"{text}\"")))?,
                );
            },
            Field::Changefreq => self.changefreq = Some(text.parse()?),
        }
        Ok(())
    }

    fn finish(self, index: usize) -> Result<ParsedEntry> {
        let loc = self
            .loc
            .filter(|loc| !loc.is_empty())
            .ok_or_else(|| Error::Parse(format!("entry {} has no <loc>", index + 1)))?;
        Ok(ParsedEntry {
            loc,
            lastmod: self.lastmod,
            priority: self.priority,
            changefreq: self.changefreq,
        })
    }
}

fn read_root(e: &BytesStart<'_>) -> Result<(DocumentKind, Option<String>)> {
    let name = e.local_name();
    let kind = DocumentKind::from_root_element(name.as_ref()).ok_or_else(|| {
        Error::Parse(format!(
            "unexpected root element <{}>",
            String::from_utf8_lossy(name.as_ref())
        ))
    })?;
    let namespace = e
        .try_get_attribute("xmlns")
        .map_err(|e| Error::Parse(format!("invalid root attribute: {e}")))?
        .map(|attr| {
            attr.unescape_value()
                .map(std::borrow::Cow::into_owned)
                .map_err(|e| Error::Parse(format!("invalid namespace: {e}")))
        })
        .transpose()?;
    Ok((kind, namespace))
}

/// Parse a `urlset` or `sitemapindex` document.
pub fn parse_document(xml: &[u8]) -> Result<ParsedDocument> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut root: Option<(DocumentKind, Option<String>)> = None;
    let mut entries = Vec::new();
    let mut current: Option<PartialEntry> = None;
    let mut field: Option<Field> = None;
    let mut closed = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name();
                match root.as_ref().map(|(kind, _)| *kind) {
                    None => root = Some(read_root(&e)?),
                    Some(kind) => {
                        if name.as_ref() == kind.entry_element().as_bytes() {
                            current = Some(PartialEntry::default());
                        } else if current.is_some() {
                            field = Field::from_name(name.as_ref(), kind);
                        }
                    },
                }
            },
            Ok(Event::End(e)) => {
                if let Some((kind, _)) = &root {
                    let name = e.local_name();
                    if name.as_ref() == kind.entry_element().as_bytes() {
                        if let Some(entry) = current.take() {
                            entries.push(entry.finish(entries.len())?);
                        }
                    } else if name.as_ref() == kind.root_element().as_bytes() {
                        closed = true;
                    }
                }
                field = None;
            },
            Ok(Event::Empty(e)) if root.is_none() => {
                root = Some(read_root(&e)?);
                closed = true;
            },
            Ok(Event::Text(e)) => {
                if let (Some(entry), Some(active)) = (current.as_mut(), field) {
                    let text = e.unescape().map_err(|e| Error::Parse(e.to_string()))?;
                    if let Some(c) = first_non_xml_char(&text) {
                        return Err(Error::Parse(format!(
                            "entry {} contains U+{:04X}, which XML does not allow",
                            entries.len() + 1,
                            u32::from(c)
                        )));
                    }
                    entry.set(active, text.trim())?;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            _ => {},
        }
        buf.clear();
    }

    let (kind, namespace) =
        root.ok_or_else(|| Error::Parse("document has no root element".to_string()))?;
    if !closed {
        return Err(Error::Parse(format!(
            "document ends before </{}>",
            kind.root_element()
        )));
    }
    Ok(ParsedDocument {
        kind,
        namespace,
        entries,
    })
}

/// Check a staged document against what the planner wrote.
pub fn verify_staged(staged: &StagedFile) -> Result<()> {
    let label = staged
        .final_name()
        .map_or_else(|| staged.temp_path().display().to_string(), str::to_string);
    let bytes = staged.read_back()?;
    let parsed = parse_document(&bytes)
        .map_err(|e| Error::Verification(format!("{label} does not parse: {e}")))?;

    if parsed.kind != staged.kind() {
        return Err(Error::Verification(format!(
            "{label} has root <{}>, expected <{}>",
            parsed.kind.root_element(),
            staged.kind().root_element()
        )));
    }
    if parsed.entries.len() != staged.entry_count() {
        return Err(Error::Verification(format!(
            "{label} holds {} entries, expected {}",
            parsed.entries.len(),
            staged.entry_count()
        )));
    }
    if bytes.len() != staged.size() {
        return Err(Error::Verification(format!(
            "{label} is {} bytes on disk, expected {}",
            bytes.len(),
            staged.size()
        )));
    }
    Ok(())
}

/// Summary of an existing sitemap file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedFile {
    /// File that was checked.
    pub path: PathBuf,
    /// Kind of document.
    pub kind: DocumentKind,
    /// Number of entries.
    pub entries: usize,
    /// Size in bytes.
    pub bytes: usize,
    /// `xmlns` of the root element.
    pub namespace: Option<String>,
    /// Whether the file stays within the protocol's entry and size maxima.
    pub within_limits: bool,
}

/// Parse an existing file and summarize it.
pub fn check_file(path: &Path) -> Result<CheckedFile> {
    let bytes = std::fs::read(path)?;
    let parsed = parse_document(&bytes)?;
    Ok(CheckedFile {
        path: path.to_path_buf(),
        kind: parsed.kind,
        entries: parsed.entries.len(),
        bytes: bytes.len(),
        namespace: parsed.namespace,
        within_limits: parsed.entries.len() <= MAX_LIMIT_LINK && bytes.len() <= MAX_LIMIT_SIZE,
    })
}

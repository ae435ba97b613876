//! Partitioning of entries into size- and count-bounded documents.
//!
//! The planner fills one [`DocumentBuilder`] at a time. After every append it
//! checks the limits; when the document went over, the entry is rolled back,
//! the document is finished, and the same entry opens the next document.
//! Finished documents are handed to a [`ChunkSink`] as they complete.
//!
//! The URL pass runs once over the input. When it produced more than one
//! document, the index pass runs the same loop over the produced file names.
//! Index documents that are themselves split are fed back into the queue of
//! the index pass until a single index document references everything.
//!
//! ## Limit semantics
//!
//! A document is over the limit when it holds more than `max_entries`
//! entries or its serialized size exceeds `max_bytes`. Both passes use the
//! same check.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::Settings;
use crate::document::{DocumentBuilder, DocumentKind};
use crate::naming::NamingResolver;
use crate::rules::{UrlRule, resolve};
use crate::{Error, Result};

/// Per-document limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of entries in one document.
    pub max_entries: usize,
    /// Maximum serialized size of one document in bytes.
    pub max_bytes: usize,
}

impl Limits {
    /// Whether a document with `count` entries and `size` bytes is too big.
    #[must_use]
    pub const fn exceeded_by(&self, count: usize, size: usize) -> bool {
        count > self.max_entries || size > self.max_bytes
    }
}

/// Source of serial numbers, shared by both passes of one run.
///
/// Serials start at 1 and are never reused, so URL chunks and index chunks
/// never collide on generated names.
#[derive(Debug, Clone, Default)]
pub struct SerialCounter {
    last: u32,
}

impl SerialCounter {
    /// A counter whose first serial is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Hand out the next serial.
    pub const fn next_serial(&mut self) -> u32 {
        self.last += 1;
        self.last
    }

    /// The serial handed out most recently, 0 if none.
    #[must_use]
    pub const fn last(&self) -> u32 {
        self.last
    }
}

/// A finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedChunk {
    /// Serial number assigned at finalization.
    pub serial: u32,
    /// Kind of the document.
    pub kind: DocumentKind,
    /// Number of entries written.
    pub entry_count: usize,
    /// Name chosen at finalization time. Only index chunks get one here;
    /// URL chunks are named after the pass, once the chunk count is known.
    pub name: Option<String>,
    /// The serialized document.
    pub bytes: Vec<u8>,
}

/// Receiver of finished chunks.
pub trait ChunkSink {
    /// Take ownership of one finished chunk.
    fn accept(&mut self, chunk: FinishedChunk) -> Result<()>;
}

impl ChunkSink for Vec<FinishedChunk> {
    fn accept(&mut self, chunk: FinishedChunk) -> Result<()> {
        self.push(chunk);
        Ok(())
    }
}

/// One entry of the index pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEntry {
    /// A file produced by the URL pass.
    Staged(String),
    /// An index chunk produced earlier in this pass.
    Pending {
        /// Serial of the index chunk.
        serial: u32,
        /// Generated name of the index chunk.
        name: String,
    },
}

impl IndexEntry {
    /// File name the entry points to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Staged(name) | Self::Pending { name, .. } => name,
        }
    }
}

/// Runs both passes for one set of settings and rules.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPlanner<'a> {
    settings: &'a Settings,
    rules: &'a [UrlRule],
}

impl<'a> ChunkPlanner<'a> {
    /// Planner over `settings` and `rules`.
    #[must_use]
    pub const fn new(settings: &'a Settings, rules: &'a [UrlRule]) -> Self {
        Self { settings, rules }
    }

    fn new_document(&self, kind: DocumentKind) -> Result<DocumentBuilder> {
        DocumentBuilder::new(kind, self.settings.format(kind))
    }

    /// Partition `urls` into `urlset` documents.
    ///
    /// Always produces at least one document; an empty input yields one
    /// empty `urlset`. Returns the number of documents produced.
    #[instrument(level = "debug", skip_all, fields(urls = urls.len()))]
    pub fn plan_urls<S>(
        &self,
        urls: &[S],
        counter: &mut SerialCounter,
        sink: &mut impl ChunkSink,
    ) -> Result<usize>
    where
        S: AsRef<str>,
    {
        let limits = self.settings.limits();
        let defaults = self.settings.defaults(DocumentKind::UrlSet);
        let mut doc = self.new_document(DocumentKind::UrlSet)?;
        let mut produced = 0;
        let mut position = 0;

        while let Some(url) = urls.get(position) {
            let url = url.as_ref();
            let metadata = resolve(url, self.rules, &defaults);
            doc.append(url, &metadata)?;

            if limits.exceeded_by(doc.current_count(), doc.current_size()) {
                if doc.current_count() == 1 {
                    return Err(Error::EntryTooLarge {
                        entry: url.to_string(),
                        size: doc.current_size(),
                        limit: limits.max_bytes,
                    });
                }
                doc.rollback_last()?;
                let full = std::mem::replace(&mut doc, self.new_document(DocumentKind::UrlSet)?);
                emit(full, counter, sink)?;
                produced += 1;
                // the rolled-back entry opens the next document
                continue;
            }
            position += 1;
        }

        emit(doc, counter, sink)?;
        Ok(produced + 1)
    }

    /// Build the index over the files named in `chunk_names`.
    ///
    /// Every index chunk is named through the naming strategy as it is
    /// finished. The last chunk returned is the one that references all
    /// others, directly or through intermediate index chunks.
    #[instrument(level = "debug", skip_all, fields(files = chunk_names.len()))]
    pub fn plan_index(
        &self,
        chunk_names: Vec<String>,
        counter: &mut SerialCounter,
        sink: &mut impl ChunkSink,
    ) -> Result<usize> {
        let limits = self.settings.limits();
        let defaults = self.settings.defaults(DocumentKind::SitemapIndex);
        let naming = NamingResolver::new(self.settings.name(), self.settings.naming());
        let domain = self.settings.link_domain();

        let mut queue: VecDeque<IndexEntry> =
            chunk_names.into_iter().map(IndexEntry::Staged).collect();
        let mut doc = self.new_document(DocumentKind::SitemapIndex)?;
        let mut produced = 0;

        while let Some(entry) = queue.pop_front() {
            let location = format!("{domain}{}", entry.name());
            let metadata = resolve(&location, self.rules, &defaults);
            doc.append(&location, &metadata)?;

            if !limits.exceeded_by(doc.current_count(), doc.current_size()) {
                continue;
            }

            if doc.current_count() == 1 {
                return Err(Error::EntryTooLarge {
                    entry: location,
                    size: doc.current_size(),
                    limit: limits.max_bytes,
                });
            }
            doc.rollback_last()?;
            queue.push_front(entry);

            // A chunk holding one entry replaces it with one entry: no progress.
            if doc.current_count() < 2 {
                return Err(Error::ResourceLimited(format!(
                    "index documents hold at most {} entry under the current limits; \
                     the index cannot converge",
                    doc.current_count()
                )));
            }

            let serial = counter.next_serial();
            let name = naming.generated(serial);
            let full =
                std::mem::replace(&mut doc, self.new_document(DocumentKind::SitemapIndex)?);
            finish(full, serial, Some(name.clone()), sink)?;
            produced += 1;
            queue.push_back(IndexEntry::Pending { serial, name });
        }

        let serial = counter.next_serial();
        finish(doc, serial, Some(naming.generated(serial)), sink)?;
        Ok(produced + 1)
    }
}

fn emit(doc: DocumentBuilder, counter: &mut SerialCounter, sink: &mut impl ChunkSink) -> Result<()> {
    let serial = counter.next_serial();
    finish(doc, serial, None, sink)
}

fn finish(
    doc: DocumentBuilder,
    serial: u32,
    name: Option<String>,
    sink: &mut impl ChunkSink,
) -> Result<()> {
    let kind = doc.kind();
    let entry_count = doc.current_count();
    let bytes = doc.finalize();
    debug!(
        serial,
        %kind,
        entries = entry_count,
        bytes = bytes.len(),
        name = name.as_deref().unwrap_or("-"),
        "finalized chunk"
    );
    sink.accept(FinishedChunk {
        serial,
        kind,
        entry_count,
        name,
        bytes,
    })
}

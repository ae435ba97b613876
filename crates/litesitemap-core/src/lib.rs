//! # litesitemap-core
//!
//! Core functionality for litesitemap - a generator for sitemaps.org XML
//! sitemaps that stay within the protocol's entry and size limits.
//!
//! Given an ordered list of URLs and a set of override rules, the crate
//! partitions the URLs into as many `urlset` documents as the limits require,
//! and when there is more than one, builds a `sitemapindex` over them. Every
//! document is staged in a temporary file and only installed once the whole
//! run succeeded.
//!
//! ## Architecture
//!
//! - **Rules**: regex-keyed overrides for `lastmod`, `priority`, `changefreq`
//! - **Document**: incremental XML rendering with running size and rollback
//! - **Planner**: the partitioning loop for URL documents and index documents
//! - **Naming**: canonical and generated file names
//! - **Staging / Publish**: locked temporary files and atomic installation
//! - **Verify**: re-parsing documents before they are installed
//! - **Configuration**: validated settings, loadable from TOML
//! - **Error Handling**: one error type with categories
//!
//! ## Quick Start
//!
//! ```rust
//! use litesitemap_core::{ChangeFrequency, Settings, SitemapGenerator, UrlRule};
//!
//! let dir = tempfile::tempdir()?;
//! let mut settings = Settings::new("https://example.com")?;
//! settings
//!     .set_dir(dir.path())?
//!     .set_limit_link(2)?
//!     .set_changefreq_default(ChangeFrequency::Monthly);
//!
//! let rules = vec![UrlRule::new("/blog/")?.with_priority(0.8)?];
//! let urls = [
//!     "https://example.com/",
//!     "https://example.com/blog/hello",
//!     "https://example.com/about",
//! ];
//!
//! let report = SitemapGenerator::new(settings).make(&urls, &rules)?;
//!
//! // Two URL documents and an index under the canonical name
//! assert_eq!(report.sitemap_files, 2);
//! assert_eq!(report.entry_point().map(|f| f.name.as_str()), Some("sitemap.xml"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]. Any error aborts the run and
//! removes every staged file:
//!
//! ```rust
//! use litesitemap_core::{Error, Settings, SitemapGenerator};
//!
//! let dir = tempfile::tempdir()?;
//! let mut settings = Settings::new("https://example.com")?;
//! settings.set_dir(dir.path())?;
//!
//! match SitemapGenerator::new(settings).make(&["/relative"], &[]) {
//!     Ok(_) => println!("generated"),
//!     Err(Error::InvalidUrl(msg)) => eprintln!("bad input: {msg}"),
//!     Err(e) => eprintln!("{} error: {e}", e.category()),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Validated settings and settings files
pub mod config;
/// XML rendering of single documents
pub mod document;
/// Error types and result aliases
pub mod error;
/// The end-to-end generation run
pub mod generator;
/// Chunk naming strategies
pub mod naming;
/// Partitioning of entries into bounded documents
pub mod planner;
/// Installation of staged files
pub mod publish;
/// Per-URL override rules
pub mod rules;
/// Temporary files for finished chunks
pub mod staging;
/// Parsing documents back for verification and checks
pub mod verify;

// Re-export commonly used types
pub use config::{Protocol, Settings, SettingsFile};
pub use document::{DocumentBuilder, DocumentFormat, DocumentKind};
pub use error::{Error, Result};
pub use generator::{GenerationReport, SitemapGenerator};
pub use naming::{ChunkNamer, ChunkNaming, NamingResolver, SerialPrefixNamer, TemplateNamer};
pub use planner::{ChunkPlanner, ChunkSink, FinishedChunk, IndexEntry, Limits, SerialCounter};
pub use publish::{PublishedFile, Publisher};
pub use rules::{ChangeFrequency, Metadata, Priority, UrlRule, parse_lastmod, resolve};
pub use staging::{StagedFile, TempSink};
pub use verify::{CheckedFile, ParsedDocument, ParsedEntry, check_file, parse_document};

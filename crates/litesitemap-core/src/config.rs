//! Generation settings.
//!
//! [`Settings`] holds everything a run needs besides the URLs and rules:
//! where to write, what to call the files, the link domain, the limits, the
//! XML declaration and namespace, and the metadata defaults. Every setter
//! validates its input and returns [`Error::Config`] immediately, so a
//! `Settings` value is always usable.
//!
//! Settings can also be loaded from a TOML file through [`SettingsFile`],
//! which routes every value through the same setters.
//!
//! ## Examples
//!
//! ```rust
//! use litesitemap_core::{ChangeFrequency, Settings};
//!
//! let mut settings = Settings::new("HTTPS://Example.com")?;
//! settings
//!     .set_limit_link(10_000)?
//!     .set_priority_default(0.5)?
//!     .set_changefreq_default(ChangeFrequency::Weekly);
//!
//! assert_eq!(settings.link_domain(), "https://example.com/");
//!
//! settings.set_protocol("http")?;
//! assert_eq!(settings.link_domain(), "http://example.com/");
//! # Ok::<(), litesitemap_core::Error>(())
//! ```
//!
//! ### Settings file
//!
//! ```toml
//! dir = "public"
//! domain = "https://example.com/"
//! limit_link = 10000
//! clear_dir = true
//! chunk_name = "{n}-{name}"
//!
//! [defaults]
//! changefreq = "weekly"
//! priority = 0.5
//!
//! [[rules]]
//! pattern = "^https://example\\.com/blog/"
//! priority = 0.8
//! changefreq = "daily"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::document::{DocumentFormat, DocumentKind};
use crate::naming::{ChunkNamer, ChunkNaming, TemplateNamer};
use crate::planner::Limits;
use crate::rules::{ChangeFrequency, Metadata, Priority, UrlRule, parse_lastmod};
use crate::{Error, Result};

/// Largest number of entries the protocol allows in one document.
pub const MAX_LIMIT_LINK: usize = 50_000;

/// Largest uncompressed document size the protocol allows (50 MiB).
pub const MAX_LIMIT_SIZE: usize = 52_428_800;

/// Default canonical file name.
pub const DEFAULT_NAME: &str = "sitemap.xml";

/// Scheme used for every link written into the documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// `http://`
    Http,
    /// `https://`
    Https,
}

impl Protocol {
    /// Lowercase scheme name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            _ => Err(Error::Config(format!(
                "protocol must be HTTP or HTTPS, got \"{s}\""
            ))),
        }
    }
}

/// Validated settings for one generator.
#[derive(Debug, Clone)]
pub struct Settings {
    dir: PathBuf,
    name: String,
    link_domain: String,
    protocol: Protocol,
    limits: Limits,
    naming: ChunkNaming,
    url_format: DocumentFormat,
    index_format: DocumentFormat,
    url_defaults: Metadata,
    index_lastmod_default: Option<DateTime<Utc>>,
    clear_dir: bool,
    clear_mask: Option<Regex>,
    validation: bool,
}

impl Settings {
    /// Settings for `link_domain` with every other value at its default.
    ///
    /// The output directory defaults to the current working directory.
    pub fn new(link_domain: &str) -> Result<Self> {
        let dir = std::env::current_dir()
            .map_err(|e| Error::Config(format!("Failed to resolve working directory: {e}")))?;
        let (link_domain, protocol) = normalize_domain(link_domain)?;

        Ok(Self {
            dir,
            name: DEFAULT_NAME.to_string(),
            link_domain,
            protocol,
            limits: Limits {
                max_entries: MAX_LIMIT_LINK,
                max_bytes: MAX_LIMIT_SIZE,
            },
            naming: ChunkNaming::default(),
            url_format: DocumentFormat::default(),
            index_format: DocumentFormat::default(),
            url_defaults: Metadata::default(),
            index_lastmod_default: None,
            clear_dir: false,
            clear_mask: None,
            validation: true,
        })
    }

    /// Set the output directory. It must already exist.
    pub fn set_dir(&mut self, dir: impl AsRef<Path>) -> Result<&mut Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::Config(format!(
                "output directory {} does not exist",
                dir.display()
            )));
        }
        self.dir = dir.to_path_buf();
        Ok(self)
    }

    /// Set the canonical file name.
    pub fn set_name(&mut self, name: &str) -> Result<&mut Self> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') || name.contains('\\') || name == "." || name == ".."
        {
            return Err(Error::Config(format!(
                "file name \"{name}\" must be a plain, non-empty file name"
            )));
        }
        self.name = name.to_string();
        Ok(self)
    }

    /// Set the domain every link is prefixed with.
    ///
    /// The domain is lowercased and given a trailing `/`; it must start with
    /// `http://` or `https://`. The protocol follows the domain's scheme.
    pub fn set_link_domain(&mut self, link_domain: &str) -> Result<&mut Self> {
        let (link_domain, protocol) = normalize_domain(link_domain)?;
        self.link_domain = link_domain;
        self.protocol = protocol;
        Ok(self)
    }

    /// Switch the scheme of the link domain. Accepts HTTP or HTTPS in any case.
    pub fn set_protocol(&mut self, protocol: &str) -> Result<&mut Self> {
        let protocol: Protocol = protocol.parse()?;
        let rest = self
            .link_domain
            .split_once("://")
            .map_or(self.link_domain.as_str(), |(_, rest)| rest);
        self.link_domain = format!("{}://{rest}", protocol.as_str());
        self.protocol = protocol;
        Ok(self)
    }

    /// Maximum number of entries per document, `1..=50000`.
    pub fn set_limit_link(&mut self, limit: usize) -> Result<&mut Self> {
        if !(1..=MAX_LIMIT_LINK).contains(&limit) {
            return Err(Error::Config(format!(
                "limit_link must be from 1 to {MAX_LIMIT_LINK}, got {limit}"
            )));
        }
        self.limits.max_entries = limit;
        Ok(self)
    }

    /// Maximum serialized size per document in bytes, at most 50 MiB.
    pub fn set_limit_size(&mut self, limit: usize) -> Result<&mut Self> {
        if !(1..=MAX_LIMIT_SIZE).contains(&limit) {
            return Err(Error::Config(format!(
                "limit_size must be from 1 to {MAX_LIMIT_SIZE} bytes, got {limit}"
            )));
        }
        self.limits.max_bytes = limit;
        Ok(self)
    }

    /// Strategy for naming chunks when a pass produces more than one.
    pub fn set_chunk_namer(&mut self, namer: impl ChunkNamer + 'static) -> &mut Self {
        self.naming = ChunkNaming::new(namer);
        self
    }

    /// XML declaration written at the top of URL documents.
    pub fn set_sitemap_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.url_format.header = header.into();
        self
    }

    /// Namespace of the `urlset` root element.
    pub fn set_sitemap_xmlns(&mut self, xmlns: impl Into<String>) -> &mut Self {
        self.url_format.xmlns = xmlns.into();
        self
    }

    /// XML declaration written at the top of index documents.
    pub fn set_index_header(&mut self, header: impl Into<String>) -> &mut Self {
        self.index_format.header = header.into();
        self
    }

    /// Namespace of the `sitemapindex` root element.
    pub fn set_index_xmlns(&mut self, xmlns: impl Into<String>) -> &mut Self {
        self.index_format.xmlns = xmlns.into();
        self
    }

    /// Default `lastmod` for URL entries no rule sets.
    pub fn set_lastmod_default(&mut self, lastmod: DateTime<Utc>) -> &mut Self {
        self.url_defaults.lastmod = Some(lastmod);
        self
    }

    /// Default `priority` for URL entries no rule sets.
    pub fn set_priority_default(&mut self, priority: f32) -> Result<&mut Self> {
        let value = Priority::new(priority).ok_or_else(|| {
            Error::Config(format!(
                "default priority must be from 0.1 to 1.0, got \"{priority}\""
            ))
        })?;
        self.url_defaults.priority = Some(value);
        Ok(self)
    }

    /// Default `changefreq` for URL entries no rule sets.
    pub fn set_changefreq_default(&mut self, changefreq: ChangeFrequency) -> &mut Self {
        self.url_defaults.changefreq = Some(changefreq);
        self
    }

    /// Default `lastmod` for index entries.
    pub fn set_index_lastmod_default(&mut self, lastmod: DateTime<Utc>) -> &mut Self {
        self.index_lastmod_default = Some(lastmod);
        self
    }

    /// Remove stale files matching the clear mask before publishing.
    pub fn set_clear_dir(&mut self, clear_dir: bool) -> &mut Self {
        self.clear_dir = clear_dir;
        self
    }

    /// Pattern selecting which existing files count as stale output.
    pub fn set_clear_mask(&mut self, mask: &str) -> Result<&mut Self> {
        let mask = Regex::new(mask)
            .map_err(|e| Error::Config(format!("invalid clear mask \"{mask}\": {e}")))?;
        self.clear_mask = Some(mask);
        Ok(self)
    }

    /// Re-parse every staged document before publishing it.
    pub fn set_validation(&mut self, validation: bool) -> &mut Self {
        self.validation = validation;
        self
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Canonical file name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized link domain, always ending in `/`.
    #[must_use]
    pub fn link_domain(&self) -> &str {
        &self.link_domain
    }

    /// Scheme of the link domain.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Entry and byte limits per document.
    #[must_use]
    pub const fn limits(&self) -> Limits {
        self.limits
    }

    /// Chunk naming strategy.
    #[must_use]
    pub const fn naming(&self) -> &ChunkNaming {
        &self.naming
    }

    /// Declaration and namespace for `kind`.
    #[must_use]
    pub const fn format(&self, kind: DocumentKind) -> &DocumentFormat {
        match kind {
            DocumentKind::UrlSet => &self.url_format,
            DocumentKind::SitemapIndex => &self.index_format,
        }
    }

    /// Metadata defaults for `kind`.
    ///
    /// Index entries only ever carry `lastmod`.
    #[must_use]
    pub fn defaults(&self, kind: DocumentKind) -> Metadata {
        match kind {
            DocumentKind::UrlSet => self.url_defaults.clone(),
            DocumentKind::SitemapIndex => Metadata {
                lastmod: self.index_lastmod_default,
                ..Metadata::default()
            },
        }
    }

    /// Whether stale files are removed before publishing.
    #[must_use]
    pub const fn clear_dir(&self) -> bool {
        self.clear_dir
    }

    /// Pattern for stale files.
    ///
    /// Without an explicit mask, matches the canonical name optionally
    /// prefixed by `<digits>-` and suffixed by `.gz`.
    pub fn clear_mask(&self) -> Result<Regex> {
        if let Some(mask) = &self.clear_mask {
            return Ok(mask.clone());
        }
        let pattern = format!(r"^(([0-9]+-)?){}((\.gz)?)$", regex::escape(&self.name));
        Regex::new(&pattern).map_err(|e| Error::Config(format!("invalid clear mask: {e}")))
    }

    /// Whether staged documents are verified before publishing.
    #[must_use]
    pub const fn validation(&self) -> bool {
        self.validation
    }
}

fn normalize_domain(link_domain: &str) -> Result<(String, Protocol)> {
    let mut domain = link_domain.trim().to_lowercase();
    let protocol = if domain.starts_with("https://") {
        Protocol::Https
    } else if domain.starts_with("http://") {
        Protocol::Http
    } else {
        return Err(Error::Config(format!(
            "link domain must start with http:// or https://, got \"{link_domain}\""
        )));
    };
    if !domain.ends_with('/') {
        domain.push('/');
    }

    let parsed = url::Url::parse(&domain)
        .map_err(|e| Error::Config(format!("invalid link domain \"{link_domain}\": {e}")))?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::Config(format!(
            "link domain \"{link_domain}\" has no host"
        )));
    }

    Ok((domain, protocol))
}

/// On-disk form of [`Settings`] plus override rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    /// Output directory, relative to the working directory.
    pub dir: Option<PathBuf>,
    /// Link domain.
    pub domain: Option<String>,
    /// Canonical file name.
    pub name: Option<String>,
    /// `http` or `https`.
    pub protocol: Option<String>,
    /// Maximum entries per document.
    pub limit_link: Option<usize>,
    /// Maximum bytes per document.
    pub limit_size: Option<usize>,
    /// Chunk name template with `{n}` and `{name}` placeholders.
    pub chunk_name: Option<String>,
    /// Remove stale output before publishing.
    pub clear_dir: Option<bool>,
    /// Pattern for stale output.
    pub clear_mask: Option<String>,
    /// Verify staged documents before publishing.
    pub validation: Option<bool>,
    /// Metadata defaults.
    pub defaults: DefaultsSection,
    /// XML declaration and namespace overrides.
    pub xml: XmlSection,
    /// Override rules, first match wins.
    pub rules: Vec<RuleSection>,
}

/// `[defaults]` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DefaultsSection {
    /// Default `lastmod` for URL entries.
    pub lastmod: Option<String>,
    /// Default `priority` for URL entries.
    pub priority: Option<f32>,
    /// Default `changefreq` for URL entries.
    pub changefreq: Option<String>,
    /// Default `lastmod` for index entries.
    pub index_lastmod: Option<String>,
}

/// `[xml]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XmlSection {
    /// Declaration for URL documents.
    pub sitemap_header: Option<String>,
    /// Namespace for URL documents.
    pub sitemap_xmlns: Option<String>,
    /// Declaration for index documents.
    pub index_header: Option<String>,
    /// Namespace for index documents.
    pub index_xmlns: Option<String>,
}

/// One `[[rules]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSection {
    /// Regular expression searched in each location.
    pub pattern: String,
    /// `lastmod` override.
    #[serde(default)]
    pub lastmod: Option<String>,
    /// `priority` override.
    #[serde(default)]
    pub priority: Option<f32>,
    /// `changefreq` override.
    #[serde(default)]
    pub changefreq: Option<String>,
}

impl TryFrom<&RuleSection> for UrlRule {
    type Error = Error;

    fn try_from(section: &RuleSection) -> Result<Self> {
        let mut rule = Self::new(&section.pattern)?;
        if let Some(lastmod) = &section.lastmod {
            let lastmod = parse_lastmod(lastmod).ok_or_else(|| {
                Error::Rule(format!(
                    "rule \"{}\": unrecognized lastmod \"{lastmod}\"",
                    section.pattern
                ))
            })?;
            rule = rule.with_lastmod(lastmod);
        }
        if let Some(priority) = section.priority {
            rule = rule.with_priority(priority)?;
        }
        if let Some(changefreq) = &section.changefreq {
            rule = rule.with_changefreq(changefreq)?;
        }
        Ok(rule)
    }
}

impl SettingsFile {
    /// Read and parse a settings file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read settings {}: {e}", path.display()))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse settings {}: {e}", path.display()))
        })
    }

    /// Build validated settings and rules.
    ///
    /// `domain` overrides the file's domain; one of the two must be present.
    /// A relative `dir` is resolved against `base`.
    pub fn resolve(&self, domain: Option<&str>, base: &Path) -> Result<(Settings, Vec<UrlRule>)> {
        let domain = domain
            .or(self.domain.as_deref())
            .ok_or_else(|| Error::Config("a link domain is required".to_string()))?;
        let mut settings = Settings::new(domain)?;

        if let Some(dir) = &self.dir {
            settings.set_dir(base.join(dir))?;
        }
        if let Some(name) = &self.name {
            settings.set_name(name)?;
        }
        if let Some(protocol) = &self.protocol {
            settings.set_protocol(protocol)?;
        }
        if let Some(limit) = self.limit_link {
            settings.set_limit_link(limit)?;
        }
        if let Some(limit) = self.limit_size {
            settings.set_limit_size(limit)?;
        }
        if let Some(template) = &self.chunk_name {
            settings.set_chunk_namer(TemplateNamer::new(template.as_str())?);
        }
        if let Some(clear_dir) = self.clear_dir {
            settings.set_clear_dir(clear_dir);
        }
        if let Some(mask) = &self.clear_mask {
            settings.set_clear_mask(mask)?;
        }
        if let Some(validation) = self.validation {
            settings.set_validation(validation);
        }

        self.apply_defaults(&mut settings)?;
        self.apply_xml(&mut settings);

        let rules = self
            .rules
            .iter()
            .map(UrlRule::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok((settings, rules))
    }

    fn apply_defaults(&self, settings: &mut Settings) -> Result<()> {
        let defaults = &self.defaults;
        if let Some(lastmod) = &defaults.lastmod {
            settings.set_lastmod_default(parse_config_lastmod(lastmod)?);
        }
        if let Some(priority) = defaults.priority {
            settings.set_priority_default(priority)?;
        }
        if let Some(changefreq) = &defaults.changefreq {
            let changefreq = changefreq
                .parse::<ChangeFrequency>()
                .map_err(|e| Error::Config(format!("default {e}")))?;
            settings.set_changefreq_default(changefreq);
        }
        if let Some(lastmod) = &defaults.index_lastmod {
            settings.set_index_lastmod_default(parse_config_lastmod(lastmod)?);
        }
        Ok(())
    }

    fn apply_xml(&self, settings: &mut Settings) {
        let xml = &self.xml;
        if let Some(header) = &xml.sitemap_header {
            settings.set_sitemap_header(header.as_str());
        }
        if let Some(xmlns) = &xml.sitemap_xmlns {
            settings.set_sitemap_xmlns(xmlns.as_str());
        }
        if let Some(header) = &xml.index_header {
            settings.set_index_header(header.as_str());
        }
        if let Some(xmlns) = &xml.index_xmlns {
            settings.set_index_xmlns(xmlns.as_str());
        }
    }
}

fn parse_config_lastmod(value: &str) -> Result<DateTime<Utc>> {
    parse_lastmod(value)
        .ok_or_else(|| Error::Config(format!("unrecognized lastmod \"{value}\"")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::rules::resolve;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn settings() -> Settings {
        Settings::new("https://example.com").unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = settings();

        assert_eq!(settings.name(), "sitemap.xml");
        assert_eq!(settings.link_domain(), "https://example.com/");
        assert_eq!(settings.protocol(), Protocol::Https);
        assert_eq!(settings.limits().max_entries, 50_000);
        assert_eq!(settings.limits().max_bytes, 52_428_800);
        assert!(!settings.clear_dir());
        assert!(settings.validation());
        assert_eq!(
            settings.format(DocumentKind::UrlSet).xmlns,
            "http://www.sitemaps.org/schemas/sitemap/0.9"
        );
        assert_eq!(
            settings.format(DocumentKind::SitemapIndex).header,
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"
        );
        assert_eq!(settings.defaults(DocumentKind::UrlSet), Metadata::default());
    }

    #[test]
    fn test_link_domain_is_normalized() {
        let mut settings = settings();

        settings.set_link_domain("HTTP://WWW.Example.COM/Docs").unwrap();

        assert_eq!(settings.link_domain(), "http://www.example.com/docs/");
        assert_eq!(settings.protocol(), Protocol::Http);
    }

    #[test]
    fn test_link_domain_requires_http_scheme() {
        for domain in ["example.com", "ftp://example.com", "", "https://"] {
            assert!(
                matches!(Settings::new(domain), Err(Error::Config(_))),
                "{domain:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_protocol_rewrites_domain() {
        let mut settings = settings();

        settings.set_protocol("HTTP").unwrap();
        assert_eq!(settings.link_domain(), "http://example.com/");

        settings.set_protocol("Https").unwrap();
        assert_eq!(settings.link_domain(), "https://example.com/");
        assert_eq!(settings.protocol(), Protocol::Https);
    }

    #[test]
    fn test_protocol_rejects_ftp() {
        let mut settings = settings();

        let result = settings.set_protocol("FTP");

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(settings.link_domain(), "https://example.com/");
    }

    #[test]
    fn test_limit_link_bounds() {
        let mut settings = settings();

        assert!(settings.set_limit_link(1).is_ok());
        assert!(settings.set_limit_link(50_000).is_ok());
        assert!(matches!(settings.set_limit_link(0), Err(Error::Config(_))));
        assert!(matches!(
            settings.set_limit_link(50_001),
            Err(Error::Config(_))
        ));
        assert_eq!(settings.limits().max_entries, 50_000);
    }

    #[test]
    fn test_limit_size_bounds() {
        let mut settings = settings();

        assert!(settings.set_limit_size(1024).is_ok());
        assert!(matches!(
            settings.set_limit_size(52_428_801),
            Err(Error::Config(_))
        ));
        assert_eq!(settings.limits().max_bytes, 1024);
    }

    #[test]
    fn test_dir_must_exist() {
        let temp = TempDir::new().unwrap();
        let mut settings = settings();

        assert!(settings.set_dir(temp.path()).is_ok());
        assert_eq!(settings.dir(), temp.path());
        assert!(matches!(
            settings.set_dir(temp.path().join("missing")),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_name_must_be_plain() {
        let mut settings = settings();

        assert!(settings.set_name("map.xml").is_ok());
        assert!(settings.set_name("").is_err());
        assert!(settings.set_name("a/b.xml").is_err());
        assert_eq!(settings.name(), "map.xml");
    }

    #[test]
    fn test_default_priority_is_validated() {
        let mut settings = settings();

        assert!(matches!(
            settings.set_priority_default(0.0),
            Err(Error::Config(_))
        ));
        settings.set_priority_default(0.4).unwrap();
        assert_eq!(
            settings.defaults(DocumentKind::UrlSet).priority,
            Priority::new(0.4)
        );
    }

    #[test]
    fn test_index_defaults_only_carry_lastmod() {
        let mut settings = settings();
        let lastmod = parse_lastmod("2024-02-01").unwrap();
        settings
            .set_priority_default(0.4)
            .unwrap()
            .set_changefreq_default(ChangeFrequency::Daily)
            .set_index_lastmod_default(lastmod);

        let index = settings.defaults(DocumentKind::SitemapIndex);

        assert_eq!(index.lastmod, Some(lastmod));
        assert!(index.priority.is_none());
        assert!(index.changefreq.is_none());
    }

    #[test]
    fn test_default_clear_mask_follows_name() {
        let mut settings = settings();
        let mask = settings.clear_mask().unwrap();

        assert!(mask.is_match("sitemap.xml"));
        assert!(mask.is_match("12-sitemap.xml"));
        assert!(mask.is_match("3-sitemap.xml.gz"));
        assert!(!mask.is_match("sitemap.xml.bak"));
        assert!(!mask.is_match("index.html"));

        settings.set_name("map.xml").unwrap();
        assert!(settings.clear_mask().unwrap().is_match("2-map.xml"));
    }

    #[test]
    fn test_invalid_clear_mask() {
        assert!(matches!(
            settings().set_clear_mask("(["),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_settings_file_resolves() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("public")).unwrap();
        let file: SettingsFile = toml::from_str(
            r#"
            dir = "public"
            domain = "https://Example.com"
            limit_link = 100
            clear_dir = true
            chunk_name = "part-{n}-{name}"

            [defaults]
            changefreq = "weekly"
            priority = 0.5
            index_lastmod = "2024-01-01"

            [xml]
            sitemap_xmlns = "urn:custom"

            [[rules]]
            pattern = "/blog/"
            priority = 0.8

            [[rules]]
            pattern = "/about$"
            changefreq = "never"
            lastmod = "2023-06-01T12:00:00Z"
            "#,
        )
        .unwrap();

        let (settings, rules) = file.resolve(None, temp.path()).unwrap();

        assert_eq!(settings.dir(), temp.path().join("public"));
        assert_eq!(settings.link_domain(), "https://example.com/");
        assert_eq!(settings.limits().max_entries, 100);
        assert!(settings.clear_dir());
        assert_eq!(settings.naming().chunk_name(2, "sitemap.xml"), "part-2-sitemap.xml");
        assert_eq!(settings.format(DocumentKind::UrlSet).xmlns, "urn:custom");
        assert_eq!(rules.len(), 2);

        let blog = resolve(
            "https://example.com/blog/x",
            &rules,
            &settings.defaults(DocumentKind::UrlSet),
        );
        assert_eq!(blog.priority, Priority::new(0.8));
        assert_eq!(blog.changefreq, Some(ChangeFrequency::Weekly));
    }

    #[test]
    fn test_settings_file_domain_override() {
        let file = SettingsFile {
            domain: Some("https://from-file.example".to_string()),
            ..SettingsFile::default()
        };

        let (settings, _) = file
            .resolve(Some("http://override.example"), Path::new("."))
            .unwrap();

        assert_eq!(settings.link_domain(), "http://override.example/");
    }

    #[test]
    fn test_settings_file_requires_domain() {
        let result = SettingsFile::default().resolve(None, Path::new("."));

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_settings_file_invalid_rule() {
        let file: SettingsFile = toml::from_str(
            r#"
            domain = "https://example.com"
            [[rules]]
            pattern = "."
            priority = 1.5
            "#,
        )
        .unwrap();

        let result = file.resolve(None, Path::new("."));

        assert!(matches!(result, Err(Error::Rule(_))));
    }

    #[test]
    fn test_settings_file_rejects_unknown_keys() {
        let parsed: std::result::Result<SettingsFile, _> = toml::from_str("limit_links = 3");

        assert!(parsed.is_err());
    }

    #[test]
    fn test_settings_file_load_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("litesitemap.toml");
        std::fs::write(&path, "domain = \"https://example.com\"\nname = \"map.xml\"\n").unwrap();

        let file = SettingsFile::load(&path).unwrap();

        assert_eq!(file.name.as_deref(), Some("map.xml"));
        assert!(matches!(
            SettingsFile::load(&temp.path().join("missing.toml")),
            Err(Error::Config(_))
        ));
    }

    proptest! {
        #[test]
        fn test_any_valid_limit_link_is_accepted(limit in 1usize..=50_000) {
            let mut settings = settings();
            prop_assert!(settings.set_limit_link(limit).is_ok());
            prop_assert_eq!(settings.limits().max_entries, limit);
        }

        #[test]
        fn test_domain_always_ends_with_slash(host in "[a-z]{1,12}\\.(com|org|net)", path in "(/[a-z]{1,6}){0,3}") {
            let settings = Settings::new(&format!("https://{host}{path}")).unwrap();
            prop_assert!(settings.link_domain().ends_with('/'));
            prop_assert!(settings.link_domain().starts_with("https://"));
        }
    }
}

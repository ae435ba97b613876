//! Per-URL metadata override rules.
//!
//! A [`UrlRule`] pairs a regular expression with optional `lastmod`,
//! `priority`, and `changefreq` values. While a document is being built, every
//! location is matched against the rules in order; the first rule that matches
//! supplies its values, and anything it leaves unset falls back to the
//! configured defaults.
//!
//! ```rust
//! use litesitemap_core::{ChangeFrequency, Metadata, UrlRule, resolve};
//!
//! let rules = vec![
//!     UrlRule::new(r"^https://example\.com/blog/")?
//!         .with_priority(0.8)?
//!         .with_change_frequency(ChangeFrequency::Daily),
//! ];
//! let defaults = Metadata {
//!     changefreq: Some(ChangeFrequency::Monthly),
//!     ..Metadata::default()
//! };
//!
//! let blog = resolve("https://example.com/blog/post-1", &rules, &defaults);
//! assert_eq!(blog.changefreq, Some(ChangeFrequency::Daily));
//!
//! let about = resolve("https://example.com/about", &rules, &defaults);
//! assert_eq!(about.changefreq, Some(ChangeFrequency::Monthly));
//! assert!(about.priority.is_none());
//! # Ok::<(), litesitemap_core::Error>(())
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Lowest priority the sitemaps.org protocol allows for generated entries.
pub const MIN_PRIORITY: f32 = 0.1;

/// Highest priority the sitemaps.org protocol allows.
pub const MAX_PRIORITY: f32 = 1.0;

/// Change frequency hints for `<changefreq>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// The page changes every time it is accessed.
    Always,
    /// The page changes hourly.
    Hourly,
    /// The page changes daily.
    Daily,
    /// The page changes weekly.
    Weekly,
    /// The page changes monthly.
    Monthly,
    /// The page changes yearly.
    Yearly,
    /// The page is archived and will not change.
    Never,
}

impl ChangeFrequency {
    /// All values accepted by the protocol, in protocol order.
    pub const ALL: [Self; 7] = [
        Self::Always,
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Yearly,
        Self::Never,
    ];

    /// The value as written into `<changefreq>`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|freq| freq.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|f| f.as_str()).collect();
                Error::Parse(format!(
                    "changefreq must be one of [{}], got \"{s}\"",
                    allowed.join(",")
                ))
            })
    }
}

/// A validated `<priority>` value in `[0.1, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Priority(f32);

impl Priority {
    /// Validate a raw priority.
    ///
    /// Returns `None` for values outside `[0.1, 1.0]` and for NaN.
    #[must_use]
    pub fn new(value: f32) -> Option<Self> {
        (MIN_PRIORITY..=MAX_PRIORITY)
            .contains(&value)
            .then_some(Self(value))
    }

    /// The raw value.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f32's shortest round-trip form: 1.0 renders as "1", 0.8 as "0.8"
        write!(f, "{}", self.0)
    }
}

/// Optional metadata attached to one entry.
///
/// Fields that are `None` are omitted from the rendered element rather than
/// written as empty tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    /// Value for `<lastmod>`.
    pub lastmod: Option<DateTime<Utc>>,
    /// Value for `<priority>`.
    pub priority: Option<Priority>,
    /// Value for `<changefreq>`.
    pub changefreq: Option<ChangeFrequency>,
}

/// A regex-keyed override of per-entry metadata.
///
/// Rules are immutable once built: every builder method consumes the rule
/// and validates its input, so an invalid rule never exists.
#[derive(Debug, Clone)]
pub struct UrlRule {
    pattern: Regex,
    metadata: Metadata,
}

impl UrlRule {
    /// Create a rule matching `pattern` with no overrides set yet.
    ///
    /// The pattern is compiled immediately; it is searched anywhere in the
    /// location, so anchor it with `^`/`$` when needed.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::Rule(format!("invalid pattern \"{pattern}\": {e}")))?;
        Ok(Self {
            pattern,
            metadata: Metadata::default(),
        })
    }

    /// Set the `lastmod` override.
    #[must_use]
    pub const fn with_lastmod(mut self, lastmod: DateTime<Utc>) -> Self {
        self.metadata.lastmod = Some(lastmod);
        self
    }

    /// Set the `priority` override, rejecting values outside `[0.1, 1.0]`.
    pub fn with_priority(mut self, priority: f32) -> Result<Self> {
        let priority = Priority::new(priority).ok_or_else(|| {
            Error::Rule(format!(
                "priority must be from {MIN_PRIORITY} to {MAX_PRIORITY}, got \"{priority}\""
            ))
        })?;
        self.metadata.priority = Some(priority);
        Ok(self)
    }

    /// Set the `changefreq` override from its textual form.
    pub fn with_changefreq(self, changefreq: &str) -> Result<Self> {
        let freq = changefreq
            .parse::<ChangeFrequency>()
            .map_err(|e| Error::Rule(e.to_string()))?;
        Ok(self.with_change_frequency(freq))
    }

    /// Set the `changefreq` override.
    #[must_use]
    pub const fn with_change_frequency(mut self, changefreq: ChangeFrequency) -> Self {
        self.metadata.changefreq = Some(changefreq);
        self
    }

    /// The source text of the pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// The overrides carried by this rule.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Whether the rule applies to `location`.
    #[must_use]
    pub fn matches(&self, location: &str) -> bool {
        self.pattern.is_match(location)
    }
}

/// Resolve the metadata for one location.
///
/// The first rule whose pattern matches wins; later rules are not consulted
/// even if they would also match. Each field of the winning rule falls back
/// to the corresponding default independently. Without a match (or without
/// rules) the defaults are returned as-is.
#[must_use]
pub fn resolve(location: &str, rules: &[UrlRule], defaults: &Metadata) -> Metadata {
    let Some(rule) = rules.iter().find(|rule| rule.matches(location)) else {
        return defaults.clone();
    };

    let overrides = &rule.metadata;
    Metadata {
        lastmod: overrides.lastmod.or(defaults.lastmod),
        priority: overrides.priority.or(defaults.priority),
        changefreq: overrides.changefreq.or(defaults.changefreq),
    }
}

/// Format a timestamp the way `<lastmod>` expects (W3C datetime).
#[must_use]
pub fn format_lastmod(lastmod: &DateTime<Utc>) -> String {
    lastmod.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Parse a `lastmod` value into a `DateTime<Utc>`.
///
/// Supports multiple date formats:
/// - `2024-01-15` (date only)
/// - `2024-01-15T10:30:00Z` (ISO 8601 with Z)
/// - `2024-01-15T10:30:00+00:00` (ISO 8601 with offset)
/// - `2024-01-15T10:30:00.000Z` (with milliseconds)
#[must_use]
pub fn parse_lastmod(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }

    tracing::debug!(date_str = %s, "Could not parse lastmod date");
    None
}

//! Error types and handling for litesitemap-core operations.
//!
//! This module provides a single error type that covers every failure a
//! generation run can hit. Errors are categorized for easier handling.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: invalid limits, domains, protocols, directories, defaults
//! - **Rule Errors**: a rule violates its own invariants (priority range, changefreq, regex)
//! - **Staging Errors**: a temporary file could not be locked or written
//! - **Publish Errors**: a stale file could not be removed or a chunk could not be installed
//! - **Input Errors**: invalid URLs, oversized entries, unparseable input files
//! - **Verification Errors**: a staged document failed the pre-publish re-parse
//!
//! ## Propagation
//!
//! Every error aborts the whole `make` call. Nothing is retried internally and
//! all staged temporary files are removed before the error reaches the caller.
//!
//! ```rust
//! use litesitemap_core::{Error, Settings};
//!
//! let mut settings = Settings::new("https://example.com")?;
//! match settings.set_protocol("ftp") {
//!     Err(Error::Config(msg)) => eprintln!("rejected: {msg}"),
//!     Err(e) => eprintln!("unexpected {}: {e}", e.category()),
//!     Ok(_) => unreachable!(),
//! }
//! # Ok::<(), litesitemap_core::Error>(())
//! ```

use thiserror::Error;

/// The main error type for litesitemap-core operations.
///
/// All public functions in litesitemap-core return `Result<T, Error>`. The
/// error chain is preserved through `source()` for wrapped I/O errors.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Covers reading input files and directory listings that are not part of
    /// staging or publishing (those are reported as [`Error::Staging`] and
    /// [`Error::Publish`] with context).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input could not be parsed.
    ///
    /// Raised for malformed URL lists, malformed sitemap XML read back by the
    /// verifier or the `check` command, and unparseable timestamps.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid.
    ///
    /// Raised eagerly by the validating setters on [`crate::Settings`], never
    /// deferred to generation time.
    ///
    /// ## Common Causes
    ///
    /// - Entry or byte limits above the sitemaps.org maxima
    /// - A domain without an `http://` or `https://` prefix
    /// - A protocol other than HTTP or HTTPS
    /// - An output directory that does not exist
    /// - A default priority outside `[0.1, 1.0]`
    #[error("Configuration error: {0}")]
    Config(String),

    /// An override rule violates its own invariants.
    ///
    /// Raised when a [`crate::UrlRule`] is constructed with a priority outside
    /// `[0.1, 1.0]`, an unknown change frequency, or a pattern that does not
    /// compile.
    #[error("Rule validation error: {0}")]
    Rule(String),

    /// A finished chunk could not be staged.
    ///
    /// Covers failing to create, lock, truncate, or write a temporary file.
    /// Fatal for the whole run.
    #[error("Staging error: {0}")]
    Staging(String),

    /// A staged chunk could not be installed at its final path.
    ///
    /// Files already installed earlier in the same run are not rolled back.
    #[error("Publish error: {0}")]
    Publish(String),

    /// A staged document failed verification before publishing.
    #[error("Verification failed: {0}")]
    Verification(String),

    /// URL is malformed or not absolute.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A single entry does not fit into an otherwise empty document.
    ///
    /// The planner refuses to emit an oversized chunk and refuses to loop;
    /// the run fails instead.
    #[error("Entry '{entry}' needs {size} bytes on its own, over the {limit} byte limit")]
    EntryTooLarge {
        /// Location of the offending entry.
        entry: String,
        /// Serialized size of a document holding only this entry.
        size: usize,
        /// Configured byte limit.
        limit: usize,
    },

    /// The configured limits cannot be satisfied.
    ///
    /// Used when the index pass cannot make progress, e.g. when an index
    /// document can hold only a single entry.
    #[error("Resource limited: {0}")]
    ResourceLimited(String),

    /// Serialization or deserialization failed.
    ///
    /// Covers TOML settings files and JSON reports.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Self::Parse(format!("XML error: {err}"))
    }
}

impl Error {
    /// Get the error category as a string identifier.
    ///
    /// Returns one of `"io"`, `"parse"`, `"config"`, `"rule"`, `"staging"`,
    /// `"publish"`, `"verification"`, `"invalid_url"`, `"entry_too_large"`,
    /// `"resource_limited"`, `"serialization"`, or `"other"`.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
            Self::Rule(_) => "rule",
            Self::Staging(_) => "staging",
            Self::Publish(_) => "publish",
            Self::Verification(_) => "verification",
            Self::InvalidUrl(_) => "invalid_url",
            Self::EntryTooLarge { .. } => "entry_too_large",
            Self::ResourceLimited(_) => "resource_limited",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::disallowed_macros,
    clippy::unwrap_used,
    clippy::unnecessary_wraps
)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io;

    #[test]
    fn test_error_display_formatting() {
        // Given: Different error variants
        let errors = vec![
            (Error::Parse("bad line".to_string()), "Parse error"),
            (Error::Config("limit too high".to_string()), "Configuration error"),
            (Error::Rule("priority 1.5".to_string()), "Rule validation error"),
            (Error::Staging("lock failed".to_string()), "Staging error"),
            (Error::Publish("rename failed".to_string()), "Publish error"),
            (Error::Verification("root".to_string()), "Verification failed"),
            (Error::InvalidUrl("not a url".to_string()), "Invalid URL"),
            (Error::ResourceLimited("no progress".to_string()), "Resource limited"),
        ];

        for (error, prefix) in errors {
            // When: Converting to string
            let error_string = error.to_string();

            // Then: Should carry the category prefix
            assert!(
                error_string.starts_with(prefix),
                "'{error_string}' should start with '{prefix}'"
            );
        }
    }

    #[test]
    fn test_entry_too_large_display() {
        let error = Error::EntryTooLarge {
            entry: "https://example.com/huge".to_string(),
            size: 180,
            limit: 120,
        };

        let message = error.to_string();
        assert!(message.contains("https://example.com/huge"));
        assert!(message.contains("180"));
        assert!(message.contains("120"));
        assert_eq!(error.category(), "entry_too_large");
    }

    #[test]
    fn test_error_from_io_error() {
        let error: Error = io::Error::new(io::ErrorKind::NotFound, "file not found").into();

        match error {
            Error::Io(inner) => assert!(inner.to_string().contains("file not found")),
            other => panic!("Expected IO error variant, got {other:?}"),
        }
    }

    #[test]
    fn test_error_from_toml_error() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("name = ");
        let error: Error = parsed.unwrap_err().into();

        assert_eq!(error.category(), "serialization");
    }

    #[test]
    fn test_error_categories() {
        let error_categories = vec![
            (Error::Io(io::Error::other("test")), "io"),
            (Error::Parse("test".to_string()), "parse"),
            (Error::Config("test".to_string()), "config"),
            (Error::Rule("test".to_string()), "rule"),
            (Error::Staging("test".to_string()), "staging"),
            (Error::Publish("test".to_string()), "publish"),
            (Error::Verification("test".to_string()), "verification"),
            (Error::InvalidUrl("test".to_string()), "invalid_url"),
            (
                Error::ResourceLimited("test".to_string()),
                "resource_limited",
            ),
            (Error::Serialization("test".to_string()), "serialization"),
            (Error::Other("test".to_string()), "other"),
        ];

        for (error, expected_category) in error_categories {
            assert_eq!(error.category(), expected_category);
        }
    }

    #[test]
    fn test_error_chain_source() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: Error = io_error.into();

        let source = std::error::Error::source(&error);

        assert!(source.is_some());
        assert!(source.unwrap().to_string().contains("access denied"));
    }

    #[test]
    fn test_error_size() {
        let error_size = std::mem::size_of::<Error>();

        assert!(error_size <= 64, "Error type too large: {error_size} bytes");
    }

    proptest! {
        #[test]
        fn test_config_error_with_arbitrary_messages(msg in r".{0,200}") {
            let error = Error::Config(msg.clone());
            let error_string = error.to_string();

            prop_assert!(error_string.contains("Configuration error"));
            prop_assert!(error_string.contains(&msg));
            prop_assert_eq!(error.category(), "config");
        }

        #[test]
        fn test_other_error_with_arbitrary_messages(msg in r".{0,200}") {
            let error = Error::Other(msg.clone());

            prop_assert_eq!(error.to_string(), msg);
            prop_assert_eq!(error.category(), "other");
        }
    }
}

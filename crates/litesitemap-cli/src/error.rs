//! CLI error handling with semantic exit codes.
//!
//! This module provides categorized errors that map to specific exit codes,
//! so scripts and CI pipelines can tell a bad flag from a failed write.
//!
//! # Exit Code Categories
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid arguments, settings, or rules |
//! | 3 | `NotFound` | Input file or directory not found |
//! | 4 | `InvalidInput` | Malformed URL list or sitemap file |
//! | 5 | `Limits` | Input cannot be split under the configured limits |
//! | 6 | `Filesystem` | Staging or installing output failed |
//! | 7 | `Integrity` | Output failed verification or exceeds protocol limits |
//!
//! # Usage
//!
//! ```bash
//! litesitemap make --domain https://example.com --urls urls.txt
//! case $? in
//!     0) echo "Done" ;;
//!     4) echo "Fix the URL list" ;;
//!     *) echo "Other error" ;;
//! esac
//! ```

use std::fmt;
use std::process::ExitCode;

use litesitemap_core::Error as CoreError;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,

    /// Invalid arguments or configuration (exit code 2).
    ///
    /// Covers flag validation, settings files, and override rules.
    Usage = 2,

    /// Requested file not found (exit code 3).
    NotFound = 3,

    /// Malformed input (exit code 4).
    ///
    /// A relative or non-HTTP URL in the list, or a sitemap file that does
    /// not parse.
    InvalidInput = 4,

    /// Limits cannot be met (exit code 5).
    ///
    /// A single entry is larger than the byte limit, or the index cannot
    /// shrink under the entry limit.
    Limits = 5,

    /// Writing output failed (exit code 6).
    Filesystem = 6,

    /// Output is inconsistent (exit code 7).
    Integrity = 7,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Create an `ExitCode` from this category.
    #[must_use]
    pub fn as_exit_code(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::NotFound => "not found",
            Self::InvalidInput => "invalid input",
            Self::Limits => "limits exceeded",
            Self::Filesystem => "filesystem error",
            Self::Integrity => "integrity error",
        }
    }

    /// Category for an error from the core library.
    #[must_use]
    pub fn from_core(err: &CoreError) -> Self {
        match err {
            CoreError::Config(_) | CoreError::Rule(_) | CoreError::Serialization(_) => Self::Usage,
            CoreError::InvalidUrl(_) | CoreError::Parse(_) => Self::InvalidInput,
            CoreError::EntryTooLarge { .. } | CoreError::ResourceLimited(_) => Self::Limits,
            CoreError::Staging(_) | CoreError::Publish(_) => Self::Filesystem,
            CoreError::Verification(_) => Self::Integrity,
            CoreError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => Self::NotFound,
            CoreError::Io(_) => Self::Filesystem,
            CoreError::Other(_) => Self::Internal,
        }
    }

    /// Infer the error category from an error message.
    ///
    /// Fallback for errors that were never categorized explicitly.
    #[must_use]
    pub fn infer_from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("not found")
            || msg_lower.contains("no such")
            || msg_lower.contains("does not exist")
        {
            return Self::NotFound;
        }

        if msg_lower.contains("verification") || msg_lower.contains("integrity") {
            return Self::Integrity;
        }

        if msg_lower.contains("invalid argument")
            || msg_lower.contains("missing required")
            || msg_lower.contains("invalid value")
            || msg_lower.contains("cannot use")
        {
            return Self::Usage;
        }

        Self::Internal
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
///
/// Wraps an `anyhow::Error` with an `ErrorCategory` to enable proper
/// exit codes while preserving full error context and chains.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Create a not-found error.
    pub fn not_found(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::NotFound, source)
    }

    /// Create an integrity error.
    pub fn integrity(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Integrity, source)
    }

    /// Wrap the underlying error with additional context, keeping the category.
    #[must_use]
    pub fn with_context<C>(self, context: C) -> Self
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        Self {
            category: self.category,
            source: self.source.context(context),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::new(ErrorCategory::from_core(&err), err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// A `CliError` keeps its category, a bare core error is mapped by kind, and
/// anything else is inferred from the message.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<CoreError>() {
        return ErrorCategory::from_core(core_err).exit_code();
    }

    ErrorCategory::infer_from_message(&err.to_string()).exit_code()
}

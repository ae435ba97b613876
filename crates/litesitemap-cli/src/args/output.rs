//! Output format arguments shared by the subcommands.
//!
//! # Examples
//!
//! ```bash
//! litesitemap make --domain https://example.com --urls urls.txt --format json
//! litesitemap check public/sitemap.xml --json
//! ```

use clap::{Args, ValueEnum};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};

/// Output format for CLI results.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary (default for terminals).
    #[default]
    Text,
    /// A single JSON document (default for pipes).
    Json,
}

impl OutputFormat {
    /// Check if this format is meant for other programs.
    #[must_use]
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }

    /// Detect the best format based on terminal status.
    ///
    /// Returns `Text` for interactive terminals, `Json` for pipes/redirects.
    #[must_use]
    pub fn detect() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Text
        } else {
            Self::Json
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Output format selection with a `--json` shorthand.
#[derive(Args, Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputArgs {
    /// Output format (defaults to text on a terminal, json otherwise)
    #[arg(
        short = 'f',
        long = "format",
        value_enum,
        env = "LITESITEMAP_OUTPUT_FORMAT",
        conflicts_with = "json"
    )]
    pub format: Option<OutputFormat>,

    /// Shorthand for `--format json`
    #[arg(long)]
    pub json: bool,
}

impl OutputArgs {
    /// Resolve the effective format.
    #[must_use]
    pub fn resolve(&self) -> OutputFormat {
        if self.json {
            return OutputFormat::Json;
        }
        self.format.unwrap_or_else(OutputFormat::detect)
    }
}

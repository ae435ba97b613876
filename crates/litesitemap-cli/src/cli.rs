//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{CheckArgs, MakeArgs};

/// Generate sitemaps.org sitemaps that respect the protocol limits
#[derive(Parser, Clone, Debug)]
#[command(name = "litesitemap")]
#[command(version)]
#[command(about = "Generate sitemaps.org sitemaps that respect the protocol limits", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Show debug logging including per-chunk decisions
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output (also respects `NO_COLOR`)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Generate sitemap files from a list of URLs
    Make(MakeArgs),

    /// Inspect existing sitemap or index files
    Check(CheckArgs),
}

//! litesitemap CLI - generate bounded sitemaps.org sitemaps from URL lists
//!
//! The binary in `main.rs` only forwards to [`run`]; everything else lives in
//! this library so that commands and renderers can be unit tested.

/// Shared argument groups
pub mod args;
/// Top-level parser and subcommands
pub mod cli;
/// `make` and `check`
pub mod commands;
/// Exit codes and categorized errors
pub mod error;
/// Text and JSON renderers
pub mod output;
/// Logging setup and URL list input
pub mod utils;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

/// Parse the command line, set up logging, and run the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let format = match &cli.command {
        Commands::Make(args) => args.output.resolve(),
        Commands::Check(args) => args.output.resolve(),
    };
    utils::initialize_logging(&cli, format.is_machine_readable())?;

    execute_command(&cli, format)
}

fn execute_command(cli: &Cli, format: args::OutputFormat) -> Result<()> {
    match &cli.command {
        Commands::Make(args) => commands::make::execute(args, format),
        Commands::Check(args) => commands::check::execute(args, format),
    }
}

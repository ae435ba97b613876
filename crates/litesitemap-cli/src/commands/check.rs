//! `litesitemap check` - inspect existing sitemap and index files.
//!
//! # Examples
//!
//! ```bash
//! litesitemap check public/sitemap.xml
//! litesitemap check public/*.xml --json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use litesitemap_core::{CheckedFile, check_file};
use tracing::debug;

use crate::args::{OutputArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Arguments for `litesitemap check`
#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Sitemap or sitemap index files to inspect
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Parse every file and print a summary.
///
/// Fails on the first unreadable or malformed file. A file beyond the
/// protocol maxima is reported and then turned into an integrity error.
pub fn execute(args: &CheckArgs, format: OutputFormat) -> Result<()> {
    let mut checked: Vec<CheckedFile> = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = check_file(path).map_err(|e| {
            CliError::from(e).with_context(format!("failed to check {}", path.display()))
        })?;
        debug!(path = %path.display(), entries = file.entries, bytes = file.bytes, "checked");
        checked.push(file);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => output::write_json(&mut out, &checked)?,
        OutputFormat::Text => output::write_checks(&mut out, &checked)?,
    }

    let over: Vec<String> = checked
        .iter()
        .filter(|f| !f.within_limits)
        .map(|f| f.path.display().to_string())
        .collect();
    if !over.is_empty() {
        return Err(CliError::integrity(anyhow::anyhow!(
            "exceeds protocol limits: {}",
            over.join(", ")
        ))
        .into());
    }
    Ok(())
}

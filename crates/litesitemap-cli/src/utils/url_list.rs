//! Reading URL lists from files or stdin.

use std::fs;
use std::io::{self, BufRead, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::CliError;

/// Read one URL per line from `source`, or from stdin when it is `-`.
pub fn read_url_list(source: &Path) -> Result<Vec<String>> {
    if source == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .lock()
            .read_to_string(&mut content)
            .context("failed to read URLs from stdin")?;
        return Ok(parse_url_list(content.as_bytes()));
    }

    if !source.exists() {
        return Err(CliError::not_found(anyhow::anyhow!(
            "URL list not found: {}",
            source.display()
        ))
        .into());
    }

    let content = fs::read(source)
        .with_context(|| format!("failed to read URL list {}", source.display()))?;
    Ok(parse_url_list(content.as_slice()))
}

/// Split a URL list into entries.
///
/// Blank lines and lines starting with `#` are skipped, surrounding
/// whitespace is trimmed, order is kept.
pub fn parse_url_list(reader: impl BufRead) -> Vec<String> {
    reader
        .lines()
        .map_while(std::result::Result::ok)
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                None
            } else {
                Some(line.to_string())
            }
        })
        .collect()
}

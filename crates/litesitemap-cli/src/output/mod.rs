//! # Output Formatting
//!
//! Renders command results either as a short human-readable summary or as a
//! single pretty-printed JSON document. Writers are passed in so that the
//! renderers can be tested without touching stdout.

use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use litesitemap_core::{CheckedFile, DocumentKind, GenerationReport};
use serde::Serialize;

/// Write `value` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Human-readable summary of a generation run.
pub fn write_report<W: Write>(out: &mut W, report: &GenerationReport) -> Result<()> {
    let Some(entry) = report.entry_point() else {
        writeln!(out, "{} nothing was written", "!".yellow())?;
        return Ok(());
    };

    writeln!(
        out,
        "{} {} URLs -> {}",
        "✓".green(),
        report.url_count,
        entry.path.display().to_string().bold()
    )?;

    for file in &report.files {
        writeln!(
            out,
            "  {:<7} {:<32} {:>6} entries {:>10}",
            kind_label(file.kind),
            file.name,
            file.entries,
            format_bytes(file.bytes)
        )?;
    }

    if !report.removed.is_empty() {
        writeln!(out, "  {} {}", "removed:".dimmed(), report.removed.join(", "))?;
    }
    Ok(())
}

/// Human-readable summary of checked files.
pub fn write_checks<W: Write>(out: &mut W, files: &[CheckedFile]) -> Result<()> {
    for file in files {
        let status = if file.within_limits {
            "✓".green()
        } else {
            "✗".red()
        };
        writeln!(out, "{status} {}", file.path.display().to_string().bold())?;
        writeln!(out, "  Kind: {}", kind_label(file.kind))?;
        writeln!(out, "  Entries: {}", file.entries)?;
        writeln!(out, "  Size: {}", format_bytes(file.bytes))?;
        if let Some(namespace) = &file.namespace {
            writeln!(out, "  Namespace: {namespace}")?;
        }
    }
    Ok(())
}

const fn kind_label(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::UrlSet => "urlset",
        DocumentKind::SitemapIndex => "index",
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}

//! `litesitemap make` - generate sitemap files from a URL list.
//!
//! # Examples
//!
//! ```bash
//! litesitemap make --domain https://example.com --urls urls.txt
//! cat urls.txt | litesitemap make --domain https://example.com --dir public --clear-dir
//! litesitemap make --config litesitemap.toml --limit-link 10000 --json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use litesitemap_core::{
    ChangeFrequency, GenerationReport, Settings, SettingsFile, SitemapGenerator, TemplateNamer,
    UrlRule, parse_lastmod,
};
use tracing::{debug, info};

use crate::args::{OutputArgs, OutputFormat};
use crate::error::CliError;
use crate::output;
use crate::utils::read_url_list;

/// Arguments for `litesitemap make`
#[derive(Args, Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct MakeArgs {
    /// Domain prefixed to every link (e.g. `https://example.com`)
    #[arg(long, env = "LITESITEMAP_DOMAIN")]
    pub domain: Option<String>,

    /// Output directory (must exist)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// File with one URL per line, `-` for stdin
    #[arg(long, default_value = "-")]
    pub urls: PathBuf,

    /// TOML settings file with defaults and override rules
    #[arg(long, env = "LITESITEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Canonical file name of the entry document
    #[arg(long)]
    pub name: Option<String>,

    /// Scheme of the link domain (http or https)
    #[arg(long)]
    pub protocol: Option<String>,

    /// Maximum entries per document
    #[arg(long)]
    pub limit_link: Option<usize>,

    /// Maximum document size in bytes
    #[arg(long)]
    pub limit_size: Option<usize>,

    /// Template for generated chunk names, must contain `{n}`
    #[arg(long)]
    pub chunk_name: Option<String>,

    /// Default lastmod for URL entries (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub lastmod: Option<String>,

    /// Default priority for URL entries (0.1 to 1.0)
    #[arg(long)]
    pub priority: Option<f32>,

    /// Default change frequency for URL entries
    #[arg(long)]
    pub changefreq: Option<String>,

    /// Remove stale sitemap files from the output directory
    #[arg(long)]
    pub clear_dir: bool,

    /// Skip re-parsing staged files before installing them
    #[arg(long)]
    pub no_validate: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Run the make command.
pub fn execute(args: &MakeArgs, format: OutputFormat) -> Result<()> {
    let (settings, rules) = build_settings(args)?;
    let urls = read_url_list(&args.urls)?;
    debug!(count = urls.len(), source = %args.urls.display(), "read URL list");

    let report = SitemapGenerator::new(settings)
        .make(&urls, &rules)
        .map_err(CliError::from)?;
    info!(files = report.files.len(), "generation finished");

    print_report(&report, format)
}

fn print_report(report: &GenerationReport, format: OutputFormat) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => output::write_json(&mut out, report),
        OutputFormat::Text => output::write_report(&mut out, report),
    }
}

/// Settings from the config file (if any) with command-line overrides on top.
fn build_settings(args: &MakeArgs) -> Result<(Settings, Vec<UrlRule>)> {
    let (file, base) = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::not_found(anyhow::anyhow!(
                    "settings file not found: {}",
                    path.display()
                ))
                .into());
            }
            let file = SettingsFile::load(path).map_err(CliError::from)?;
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (file, base)
        },
        None => (
            SettingsFile::default(),
            std::env::current_dir().context("failed to resolve working directory")?,
        ),
    };

    if args.domain.is_none() && file.domain.is_none() {
        return Err(CliError::usage(anyhow::anyhow!(
            "missing required --domain (or `domain` in the settings file)"
        ))
        .into());
    }

    let (mut settings, rules) = file
        .resolve(args.domain.as_deref(), &base)
        .map_err(CliError::from)?;
    apply_overrides(&mut settings, args).map_err(CliError::from)?;
    Ok((settings, rules))
}

fn apply_overrides(settings: &mut Settings, args: &MakeArgs) -> litesitemap_core::Result<()> {
    if let Some(dir) = &args.dir {
        settings.set_dir(dir)?;
    }
    if let Some(name) = &args.name {
        settings.set_name(name)?;
    }
    if let Some(protocol) = &args.protocol {
        settings.set_protocol(protocol)?;
    }
    if let Some(limit) = args.limit_link {
        settings.set_limit_link(limit)?;
    }
    if let Some(limit) = args.limit_size {
        settings.set_limit_size(limit)?;
    }
    if let Some(template) = &args.chunk_name {
        settings.set_chunk_namer(TemplateNamer::new(template.as_str())?);
    }
    if let Some(lastmod) = &args.lastmod {
        let lastmod = parse_lastmod(lastmod).ok_or_else(|| {
            litesitemap_core::Error::Config(format!("unrecognized --lastmod \"{lastmod}\""))
        })?;
        settings.set_lastmod_default(lastmod);
    }
    if let Some(priority) = args.priority {
        settings.set_priority_default(priority)?;
    }
    if let Some(changefreq) = &args.changefreq {
        let changefreq = changefreq
            .parse::<ChangeFrequency>()
            .map_err(|e| litesitemap_core::Error::Config(format!("--changefreq: {e}")))?;
        settings.set_changefreq_default(changefreq);
    }
    if args.clear_dir {
        settings.set_clear_dir(true);
    }
    if args.no_validate {
        settings.set_validation(false);
    }
    Ok(())
}

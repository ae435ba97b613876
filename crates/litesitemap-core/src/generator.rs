//! One generation run from URLs to published files.

use serde::Serialize;
use tracing::{info, instrument};

use crate::config::Settings;
use crate::document::{DocumentKind, first_non_xml_char};
use crate::naming::{Nameable, NamingResolver};
use crate::planner::{ChunkPlanner, SerialCounter};
use crate::publish::{PublishedFile, Publisher};
use crate::rules::UrlRule;
use crate::staging::{StagedFile, TempSink};
use crate::verify::verify_staged;
use crate::{Error, Result};

/// What a run wrote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Number of input URLs.
    pub url_count: usize,
    /// Number of `urlset` documents.
    pub sitemap_files: usize,
    /// Number of `sitemapindex` documents.
    pub index_files: usize,
    /// Every installed file, URL documents first.
    pub files: Vec<PublishedFile>,
    /// Stale files removed before installing.
    pub removed: Vec<String>,
}

impl GenerationReport {
    /// The file crawlers should be pointed at.
    #[must_use]
    pub fn entry_point(&self) -> Option<&PublishedFile> {
        self.files.last()
    }
}

/// Generates sitemap files for one set of [`Settings`].
///
/// ```rust,no_run
/// use litesitemap_core::{Settings, SitemapGenerator, UrlRule};
///
/// let mut settings = Settings::new("https://example.com")?;
/// settings.set_dir("public")?;
///
/// let rules = vec![UrlRule::new("/blog/")?.with_priority(0.8)?];
/// let urls = vec![
///     "https://example.com/".to_string(),
///     "https://example.com/blog/hello".to_string(),
/// ];
///
/// let report = SitemapGenerator::new(settings).make(&urls, &rules)?;
/// println!("wrote {} files", report.files.len());
/// # Ok::<(), litesitemap_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SitemapGenerator {
    settings: Settings,
}

impl SitemapGenerator {
    /// Generator using `settings`.
    #[must_use]
    pub const fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Settings in use.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Partition `urls` into documents, build an index when more than one
    /// document is needed, and publish everything.
    ///
    /// URLs are written in input order. Nothing is installed unless every
    /// document was staged (and verified, when validation is on); staged
    /// files are removed on every error path.
    #[instrument(skip_all, fields(urls = urls.len(), rules = rules.len()))]
    pub fn make<S>(&self, urls: &[S], rules: &[UrlRule]) -> Result<GenerationReport>
    where
        S: AsRef<str>,
    {
        validate_urls(urls)?;

        let settings = &self.settings;
        let planner = ChunkPlanner::new(settings, rules);
        let naming = NamingResolver::new(settings.name(), settings.naming());
        let mut counter = SerialCounter::new();

        let mut url_sink = TempSink::new(settings.dir());
        planner.plan_urls(urls, &mut counter, &mut url_sink)?;
        let mut staged = url_sink.into_staged();
        naming.assign(&mut staged);
        let sitemap_files = staged.len();

        let mut index_files = 0;
        if sitemap_files > 1 {
            let names = staged
                .iter()
                .map(|file| {
                    file.final_name().map(str::to_string).ok_or_else(|| {
                        Error::Other(format!("chunk {} has no name", file.serial()))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let mut index_sink = TempSink::new(settings.dir());
            planner.plan_index(names, &mut counter, &mut index_sink)?;
            let mut index = index_sink.into_staged();
            naming.promote_last(&mut index);
            index_files = index.len();
            staged.extend(index);
        }

        if settings.validation() {
            verify_all(&staged)?;
        }

        let mut publisher = Publisher::new(settings.dir());
        if settings.clear_dir() {
            publisher = publisher.with_stale_cleanup(settings.clear_mask()?);
        }
        let (files, removed) = publisher.publish(staged)?;

        info!(
            sitemap_files,
            index_files,
            entry_point = files.last().map_or("", |f| f.name.as_str()),
            "sitemap generation complete"
        );

        Ok(GenerationReport {
            url_count: urls.len(),
            sitemap_files,
            index_files,
            files,
            removed,
        })
    }
}

fn validate_urls<S: AsRef<str>>(urls: &[S]) -> Result<()> {
    for (line, url) in urls.iter().enumerate() {
        let url = url.as_ref();
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::InvalidUrl(format!("#{} \"{url}\": {e}", line + 1)))?;
        if let Some(c) = first_non_xml_char(url) {
            return Err(Error::InvalidUrl(format!(
                "#{} \"{}\" contains U+{:04X}, which XML does not allow",
                line + 1,
                url.escape_debug(),
                u32::from(c)
            )));
        }
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(Error::InvalidUrl(format!(
                "#{} \"{url}\" is not an absolute http(s) URL",
                line + 1
            )));
        }
    }
    Ok(())
}

fn verify_all(staged: &[StagedFile]) -> Result<()> {
    for file in staged {
        verify_staged(file)?;
    }
    let index_files = staged
        .iter()
        .filter(|file| file.kind() == DocumentKind::SitemapIndex)
        .count();
    tracing::debug!(files = staged.len(), index_files, "verified staged files");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::rules::ChangeFrequency;
    use crate::verify::parse_document;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn generator(dir: &Path, limit_link: usize) -> SitemapGenerator {
        let mut settings = Settings::new("https://example.com").unwrap();
        settings
            .set_dir(dir)
            .unwrap()
            .set_limit_link(limit_link)
            .unwrap();
        SitemapGenerator::new(settings)
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn locs(path: &Path) -> Vec<String> {
        let doc = parse_document(&fs::read(path).unwrap()).unwrap();
        doc.entries.into_iter().map(|e| e.loc).collect()
    }

    #[test]
    fn test_single_file_when_everything_fits() {
        let temp = TempDir::new().unwrap();
        let urls = ["https://example.com/", "https://example.com/about"];

        let report = generator(temp.path(), 50_000).make(&urls, &[]).unwrap();

        assert_eq!(listing(temp.path()), vec!["sitemap.xml"]);
        assert_eq!(report.sitemap_files, 1);
        assert_eq!(report.index_files, 0);
        assert_eq!(locs(&temp.path().join("sitemap.xml")), urls);
    }

    #[test]
    fn test_three_urls_two_per_file() {
        // Given: limit_link = 2 and URLs A, B, C
        let temp = TempDir::new().unwrap();
        let urls = [
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
        ];

        // When: generated
        let report = generator(temp.path(), 2).make(&urls, &[]).unwrap();

        // Then: two sitemap files plus the index under the canonical name
        assert_eq!(
            listing(temp.path()),
            vec!["1-sitemap.xml", "2-sitemap.xml", "sitemap.xml"]
        );
        assert_eq!(locs(&temp.path().join("1-sitemap.xml")), urls[..2]);
        assert_eq!(locs(&temp.path().join("2-sitemap.xml")), urls[2..]);
        assert_eq!(
            locs(&temp.path().join("sitemap.xml")),
            vec![
                "https://example.com/1-sitemap.xml",
                "https://example.com/2-sitemap.xml"
            ]
        );
        assert_eq!(report.entry_point().unwrap().name, "sitemap.xml");
        assert_eq!(report.entry_point().unwrap().kind, DocumentKind::SitemapIndex);
    }

    #[test]
    fn test_nested_index_covers_every_chunk() {
        // Given: 9 URLs, 2 per file: 5 URL chunks need a nested index
        let temp = TempDir::new().unwrap();
        let urls: Vec<String> = (1..=9).map(|i| format!("https://example.com/p{i}")).collect();

        let report = generator(temp.path(), 2).make(&urls, &[]).unwrap();

        // Then: walking the index from the canonical file reaches every URL once
        let mut pending = vec![temp.path().join("sitemap.xml")];
        let mut reached = Vec::new();
        while let Some(path) = pending.pop() {
            let doc = parse_document(&fs::read(&path).unwrap()).unwrap();
            for entry in doc.entries {
                match doc.kind {
                    DocumentKind::SitemapIndex => {
                        let name = entry.loc.trim_start_matches("https://example.com/");
                        pending.push(temp.path().join(name));
                    },
                    DocumentKind::UrlSet => reached.push(entry.loc),
                }
            }
        }
        reached.sort();
        let mut expected = urls.clone();
        expected.sort();
        assert_eq!(reached, expected);
        assert_eq!(report.sitemap_files, 5);
        assert!(report.index_files > 1);
    }

    #[test]
    fn test_identical_inputs_give_identical_files() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let urls: Vec<String> = (1..=7).map(|i| format!("https://example.com/p{i}")).collect();
        let rules = vec![
            UrlRule::new("p[0-3]$")
                .unwrap()
                .with_change_frequency(ChangeFrequency::Daily),
        ];

        generator(first.path(), 3).make(&urls, &rules).unwrap();
        generator(second.path(), 3).make(&urls, &rules).unwrap();

        let names = listing(first.path());
        assert_eq!(names, listing(second.path()));
        for name in names {
            assert_eq!(
                fs::read(first.path().join(&name)).unwrap(),
                fs::read(second.path().join(&name)).unwrap(),
                "{name} differs"
            );
        }
    }

    #[test]
    fn test_empty_input_writes_empty_urlset() {
        let temp = TempDir::new().unwrap();

        let report = generator(temp.path(), 10)
            .make(&Vec::<String>::new(), &[])
            .unwrap();

        assert_eq!(listing(temp.path()), vec!["sitemap.xml"]);
        assert_eq!(report.files[0].entries, 0);
    }

    #[test]
    fn test_oversized_entry_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let mut settings = Settings::new("https://example.com").unwrap();
        settings.set_dir(temp.path()).unwrap().set_limit_size(300).unwrap();
        let urls = vec![
            "https://example.com/short".to_string(),
            format!("https://example.com/{}", "x".repeat(400)),
        ];

        let result = SitemapGenerator::new(settings).make(&urls, &[]);

        assert!(matches!(result, Err(Error::EntryTooLarge { .. })));
        assert!(listing(temp.path()).is_empty());
    }

    #[test]
    fn test_relative_url_is_rejected_before_planning() {
        let temp = TempDir::new().unwrap();

        let result = generator(temp.path(), 10).make(&["https://example.com/", "/about"], &[]);

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
        assert!(listing(temp.path()).is_empty());
    }

    #[test]
    fn test_non_http_url_is_rejected() {
        let temp = TempDir::new().unwrap();

        let result = generator(temp.path(), 10).make(&["mailto:someone@example.com"], &[]);

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_control_character_in_url_is_rejected() {
        // Given: a URL the parser accepts but XML cannot carry
        let temp = TempDir::new().unwrap();
        let urls = ["https://example.com/", "https://example.com/a\u{1}b"];

        // When: generated
        let result = generator(temp.path(), 10).make(&urls, &[]);

        // Then: the run fails before anything is written
        assert!(matches!(result, Err(Error::InvalidUrl(msg)) if msg.contains("U+0001")));
        assert!(listing(temp.path()).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_published_files_are_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let urls = ["https://example.com/a", "https://example.com/b", "https://example.com/c"];

        generator(temp.path(), 2).make(&urls, &[]).unwrap();

        for name in listing(temp.path()) {
            let mode = fs::metadata(temp.path().join(&name))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o644, "{name}");
        }
    }

    #[test]
    fn test_non_convergent_index_fails_cleanly() {
        let temp = TempDir::new().unwrap();

        let result = generator(temp.path(), 1).make(&["https://example.com/a", "https://example.com/b"], &[]);

        assert!(matches!(result, Err(Error::ResourceLimited(_))));
        assert!(listing(temp.path()).is_empty());
    }

    #[test]
    fn test_clear_dir_removes_stale_chunks() {
        // Given: output of an earlier, bigger run
        let temp = TempDir::new().unwrap();
        for name in ["1-sitemap.xml", "2-sitemap.xml", "3-sitemap.xml", "sitemap.xml"] {
            fs::write(temp.path().join(name), "old").unwrap();
        }
        let mut settings = Settings::new("https://example.com").unwrap();
        settings.set_dir(temp.path()).unwrap().set_clear_dir(true);

        // When: a run that fits in one file
        let report = SitemapGenerator::new(settings)
            .make(&["https://example.com/"], &[])
            .unwrap();

        // Then: only the new canonical file remains
        assert_eq!(listing(temp.path()), vec!["sitemap.xml"]);
        assert_eq!(
            report.removed,
            vec!["1-sitemap.xml", "2-sitemap.xml", "3-sitemap.xml"]
        );
    }

    #[test]
    fn test_report_serializes() {
        let temp = TempDir::new().unwrap();
        let report = generator(temp.path(), 10)
            .make(&["https://example.com/"], &[])
            .unwrap();

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["urlCount"], 1);
        assert_eq!(json["files"][0]["name"], "sitemap.xml");
        assert_eq!(json["files"][0]["kind"], "urlSet");
    }
}

//! Installing staged files at their final paths.
//!
//! Each staged file is moved over its target with a rename, so readers see
//! either the previous file or the complete new one. Files are installed in
//! order; a failure stops the run, and files installed earlier in the same
//! run stay in place.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document::DocumentKind;
use crate::naming::Nameable;
use crate::staging::{STAGING_PREFIX, StagedFile};
use crate::{Error, Result};

/// A file written by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedFile {
    /// File name inside the output directory.
    pub name: String,
    /// Full path.
    pub path: PathBuf,
    /// Kind of document.
    pub kind: DocumentKind,
    /// Number of entries.
    pub entries: usize,
    /// Size in bytes.
    pub bytes: usize,
}

/// Installs staged files into one directory.
#[derive(Debug)]
pub struct Publisher<'a> {
    dir: &'a Path,
    stale_mask: Option<Regex>,
}

impl<'a> Publisher<'a> {
    /// Publisher for `dir` that leaves existing files alone.
    #[must_use]
    pub const fn new(dir: &'a Path) -> Self {
        Self {
            dir,
            stale_mask: None,
        }
    }

    /// Remove existing files matching `mask` that the new run does not write.
    #[must_use]
    pub fn with_stale_cleanup(mut self, mask: Regex) -> Self {
        self.stale_mask = Some(mask);
        self
    }

    /// Remove stale files, then install every staged file.
    ///
    /// Returns the installed files in order and the names of removed files.
    pub fn publish(&self, staged: Vec<StagedFile>) -> Result<(Vec<PublishedFile>, Vec<String>)> {
        let mut names = HashSet::with_capacity(staged.len());
        for file in &staged {
            let name = file.final_name().ok_or_else(|| {
                Error::Publish(format!(
                    "staged chunk {} was never given a name",
                    file.serial()
                ))
            })?;
            if !names.insert(name.to_string()) {
                return Err(Error::Publish(format!(
                    "two chunks would be written to {name}"
                )));
            }
        }

        let removed = match &self.stale_mask {
            Some(mask) => self.remove_stale(mask, &names)?,
            None => Vec::new(),
        };

        let mut published = Vec::with_capacity(staged.len());
        for file in staged {
            published.push(self.install(file)?);
        }
        info!(
            files = published.len(),
            removed = removed.len(),
            dir = %self.dir.display(),
            "published sitemap files"
        );
        Ok((published, removed))
    }

    fn remove_stale(&self, mask: &Regex, keep: &HashSet<String>) -> Result<Vec<String>> {
        let entries = fs::read_dir(self.dir).map_err(|e| {
            Error::Publish(format!("Failed to list {}: {e}", self.dir.display()))
        })?;

        let mut removed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                Error::Publish(format!("Failed to list {}: {e}", self.dir.display()))
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.starts_with(STAGING_PREFIX) || keep.contains(&name) || !mask.is_match(&name) {
                continue;
            }
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                warn!(name = %name, "stale candidate is not a regular file, skipping");
                continue;
            }
            fs::remove_file(entry.path())
                .map_err(|e| Error::Publish(format!("Failed to remove stale {name}: {e}")))?;
            debug!(name = %name, "removed stale file");
            removed.push(name);
        }
        removed.sort();
        Ok(removed)
    }

    fn install(&self, file: StagedFile) -> Result<PublishedFile> {
        let name = file.final_name().unwrap_or_default().to_string();
        let target = self.dir.join(&name);
        let kind = file.kind();
        let entries = file.entry_count();
        let bytes = file.size();

        if target.is_dir() {
            return Err(Error::Publish(format!(
                "{} exists and is a directory",
                target.display()
            )));
        }

        // rename replaces an existing regular file in one step
        file.into_temp_file()
            .persist(&target)
            .map_err(|e| Error::Publish(format!("Failed to install {}: {}", target.display(), e.error)))?;
        debug!(name = %name, %kind, entries, bytes, "installed");

        Ok(PublishedFile {
            name,
            path: target,
            kind,
            entries,
            bytes,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::planner::{ChunkSink, FinishedChunk};
    use crate::staging::TempSink;
    use tempfile::TempDir;

    fn stage_named(dir: &Path, names: &[&str]) -> Vec<StagedFile> {
        let mut sink = TempSink::new(dir);
        for (i, name) in names.iter().enumerate() {
            sink.accept(FinishedChunk {
                serial: u32::try_from(i + 1).unwrap(),
                kind: DocumentKind::UrlSet,
                entry_count: 0,
                name: Some((*name).to_string()),
                bytes: format!("<urlset>{name}</urlset>").into_bytes(),
            })
            .unwrap();
        }
        sink.into_staged()
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_publish_installs_and_replaces() {
        // Given: an existing sitemap.xml with old content
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("sitemap.xml"), "old").unwrap();
        let staged = stage_named(temp.path(), &["sitemap.xml"]);

        // When: published
        let (published, removed) = Publisher::new(temp.path()).publish(staged).unwrap();

        // Then: the file is replaced and no temp files remain
        assert_eq!(
            fs::read_to_string(temp.path().join("sitemap.xml")).unwrap(),
            "<urlset>sitemap.xml</urlset>"
        );
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].name, "sitemap.xml");
        assert!(removed.is_empty());
        assert_eq!(listing(temp.path()), vec!["sitemap.xml"]);
    }

    #[test]
    fn test_stale_cleanup_removes_only_matching_files() {
        // Given: leftovers from a bigger previous run plus an unrelated file
        let temp = TempDir::new().unwrap();
        for name in ["1-sitemap.xml", "2-sitemap.xml", "3-sitemap.xml", "robots.txt"] {
            fs::write(temp.path().join(name), "old").unwrap();
        }
        let staged = stage_named(temp.path(), &["1-sitemap.xml", "2-sitemap.xml", "sitemap.xml"]);
        let mask = Regex::new(r"^([0-9]+-)?sitemap\.xml$").unwrap();

        // When: published with cleanup
        let (_, removed) = Publisher::new(temp.path())
            .with_stale_cleanup(mask)
            .publish(staged)
            .unwrap();

        // Then: only the stale chunk is gone
        assert_eq!(removed, vec!["3-sitemap.xml"]);
        assert_eq!(
            listing(temp.path()),
            vec!["1-sitemap.xml", "2-sitemap.xml", "robots.txt", "sitemap.xml"]
        );
    }

    #[test]
    fn test_without_cleanup_stale_files_stay() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("3-sitemap.xml"), "old").unwrap();
        let staged = stage_named(temp.path(), &["sitemap.xml"]);

        Publisher::new(temp.path()).publish(staged).unwrap();

        assert_eq!(listing(temp.path()), vec!["3-sitemap.xml", "sitemap.xml"]);
    }

    #[test]
    fn test_duplicate_names_are_rejected_before_writing() {
        let temp = TempDir::new().unwrap();
        let staged = stage_named(temp.path(), &["sitemap.xml", "sitemap.xml"]);

        let result = Publisher::new(temp.path()).publish(staged);

        assert!(matches!(result, Err(Error::Publish(_))));
        assert!(listing(temp.path()).is_empty());
    }

    #[test]
    fn test_target_directory_is_a_publish_error() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sitemap.xml")).unwrap();
        let staged = stage_named(temp.path(), &["sitemap.xml"]);

        let result = Publisher::new(temp.path()).publish(staged);

        assert!(matches!(result, Err(Error::Publish(_))));
    }
}

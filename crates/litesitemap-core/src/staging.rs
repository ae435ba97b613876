//! Temporary files for finished chunks.
//!
//! Each finished chunk is written to its own temporary file in the staging
//! directory while the run continues. The file is held exclusively while it
//! is written and is deleted when its [`StagedFile`] is dropped, so an
//! aborted run leaves nothing behind. Publishing moves the file instead.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::trace;

use crate::document::DocumentKind;
use crate::naming::Nameable;
use crate::planner::{ChunkSink, FinishedChunk};
use crate::{Error, Result};

/// Prefix shared by every staging file.
pub const STAGING_PREFIX: &str = ".litesitemap-";

/// Mode of staged files, kept when they are installed.
#[cfg(unix)]
pub const PUBLISHED_MODE: u32 = 0o644;

/// A chunk written to a temporary file and waiting to be published.
#[derive(Debug)]
pub struct StagedFile {
    serial: u32,
    kind: DocumentKind,
    entry_count: usize,
    size: usize,
    final_name: Option<String>,
    file: NamedTempFile,
}

impl StagedFile {
    /// Kind of document in the file.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Number of entries written.
    #[must_use]
    pub const fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Size of the file in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Current location of the temporary file.
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    /// Read the staged bytes back.
    pub fn read_back(&self) -> Result<Vec<u8>> {
        let mut handle = self.file.reopen().map_err(|e| {
            Error::Staging(format!("Failed to reopen {}: {e}", self.temp_path().display()))
        })?;
        let mut bytes = Vec::with_capacity(self.size);
        handle.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    /// Give up the staged file, returning the temp file handle for installing.
    pub(crate) fn into_temp_file(self) -> NamedTempFile {
        self.file
    }
}

impl Nameable for StagedFile {
    fn serial(&self) -> u32 {
        self.serial
    }

    fn final_name(&self) -> Option<&str> {
        self.final_name.as_deref()
    }

    fn set_final_name(&mut self, name: String) {
        self.final_name = Some(name);
    }
}

/// Writes finished chunks to temporary files in one directory.
#[derive(Debug)]
pub struct TempSink {
    dir: PathBuf,
    staged: Vec<StagedFile>,
}

impl TempSink {
    /// Stage files in `dir`.
    ///
    /// Staging in the output directory keeps the final rename on one
    /// filesystem.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            staged: Vec::new(),
        }
    }

    /// Write one chunk to a fresh temporary file.
    pub fn stage(&self, chunk: FinishedChunk) -> Result<StagedFile> {
        let prefix = format!("{STAGING_PREFIX}{}-", chunk.serial);
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(|e| {
                Error::Staging(format!(
                    "Failed to create temporary file in {}: {e}",
                    self.dir.display()
                ))
            })?;

        set_published_mode(file.as_file()).map_err(|e| {
            Error::Staging(format!(
                "Failed to set permissions on {}: {e}",
                file.path().display()
            ))
        })?;

        write_locked(file.as_file_mut(), &chunk.bytes).map_err(|e| {
            Error::Staging(format!(
                "Failed to write chunk {} to {}: {e}",
                chunk.serial,
                file.path().display()
            ))
        })?;
        trace!(serial = chunk.serial, path = %file.path().display(), "staged chunk");

        Ok(StagedFile {
            serial: chunk.serial,
            kind: chunk.kind,
            entry_count: chunk.entry_count,
            size: chunk.bytes.len(),
            final_name: chunk.name,
            file,
        })
    }

    /// Files staged so far, in finalization order.
    #[must_use]
    pub fn staged(&self) -> &[StagedFile] {
        &self.staged
    }

    /// Take the staged files out of the sink.
    #[must_use]
    pub fn into_staged(self) -> Vec<StagedFile> {
        self.staged
    }
}

impl ChunkSink for TempSink {
    fn accept(&mut self, chunk: FinishedChunk) -> Result<()> {
        let staged = self.stage(chunk)?;
        self.staged.push(staged);
        Ok(())
    }
}

// Temporary files start out owner-only.
#[cfg(unix)]
fn set_published_mode(file: &File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(PUBLISHED_MODE))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn set_published_mode(_file: &File) -> std::io::Result<()> {
    Ok(())
}

fn write_locked(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    FileExt::try_lock_exclusive(&*file)?;
    let written = write_synced(file, bytes);
    FileExt::unlock(&*file)?;
    written
}

fn write_synced(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.set_len(0)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

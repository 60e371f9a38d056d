//! Write-if-changed file commits.
//!
//! ## `write_if_changed`
//!
//! 1. Read the existing file; a missing file counts as different.
//! 2. Exact byte comparison with the new content → skip if identical.
//! 3. Dry run stops here with [`WriteResult::WouldWrite`].
//! 4. Create parent directories and write `<path>.manifestor.tmp`.
//! 5. Rename over the target; the tmp file is removed if that fails.
//!
//! Repeated syncs of an unchanged graph therefore touch no file at all.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

// ---------------------------------------------------------------------------
// Write result
// ---------------------------------------------------------------------------

/// Outcome of an individual file commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped, its content already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, WriteResult::Unchanged { .. })
    }
}

// ---------------------------------------------------------------------------
// Commit policies
// ---------------------------------------------------------------------------

/// Write `content` to `path` unless the file already holds exactly it.
pub fn write_if_changed(path: &Path, content: &[u8], dry_run: bool) -> Result<WriteResult, SyncError> {
    if content_matches(path, content)? {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }
    commit(path, content, dry_run)
}

/// Write `content` to `path` only if nothing exists there yet.
pub fn write_if_absent(path: &Path, content: &[u8], dry_run: bool) -> Result<WriteResult, SyncError> {
    if path.exists() {
        tracing::debug!("present, left as is: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }
    commit(path, content, dry_run)
}

/// Current content of `path`, or `None` if there is no file.
pub fn read_existing(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

fn content_matches(path: &Path, content: &[u8]) -> Result<bool, SyncError> {
    Ok(read_existing(path)?.is_some_and(|existing| existing == content))
}

fn commit(path: &Path, content: &[u8], dry_run: bool) -> Result<WriteResult, SyncError> {
    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    let tmp = PathBuf::from(format!("{}.manifestor.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)?;

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

fn atomic_write_with_tmp(path: &Path, content: &[u8], tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

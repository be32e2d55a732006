//! Journal file I/O.
//!
//! This module provides the `JournalIO` trait, which abstracts the handful of
//! filesystem operations the session performs on the encrypted journal, and
//! `FileSystemIO`, the implementation backed by the real filesystem.
//!
//! Only ciphertext ever passes through this module. Replacing a journal file is
//! atomic: the new blob is written to a sibling temporary file, flushed, and
//! renamed over the old one, so a crash leaves either the old or the new
//! journal and never a partial one.

use crate::errors::{AppError, AppResult};
use crate::journal::JournalLayout;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::debug;


/// Trait defining the filesystem operations on journal files.
pub trait JournalIO {
    /// Ensures the journal directory exists, creating it if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory couldn't be created.
    fn ensure_journal_dir(&self) -> AppResult<()>;

    /// The journal file that holds entries written on `date`.
    fn journal_path(&self, date: NaiveDate) -> PathBuf;

    /// Whether a journal file exists at `path`.
    ///
    /// # Errors
    ///
    /// Anything other than "not found" (e.g. permission denied on the
    /// directory) is reported rather than treated as absent.
    fn exists(&self, path: &Path) -> AppResult<bool>;

    /// Reads the full ciphertext blob.
    fn read(&self, path: &Path) -> AppResult<Vec<u8>>;

    /// Atomically replaces the journal file with `contents`.
    fn replace(&self, path: &Path, contents: &[u8]) -> AppResult<()>;
}

/// An implementation of the JournalIO trait that uses the filesystem.
///
/// # Examples
///
/// ```
/// use jrnl::journal::io::{FileSystemIO, JournalIO};
/// use jrnl::journal::JournalLayout;
/// use chrono::NaiveDate;
/// use std::path::PathBuf;
///
/// let io = FileSystemIO::new(PathBuf::from("/journal"), JournalLayout::Daily);
/// let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
/// assert_eq!(io.journal_path(date), PathBuf::from("/journal/2024/03/05.jrnl"));
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemIO {
    /// The directory where journal files are stored.
    pub journal_dir: PathBuf,
    /// One file, or one file per day.
    pub layout: JournalLayout,
}

impl FileSystemIO {
    pub fn new(journal_dir: PathBuf, layout: JournalLayout) -> Self {
        FileSystemIO {
            journal_dir,
            layout,
        }
    }
}

impl JournalIO for FileSystemIO {
    fn ensure_journal_dir(&self) -> AppResult<()> {
        ensure_journal_directory_exists(&self.journal_dir)
    }

    fn journal_path(&self, date: NaiveDate) -> PathBuf {
        self.layout.path_for(&self.journal_dir, date)
    }

    fn exists(&self, path: &Path) -> AppResult<bool> {
        path.try_exists().map_err(|e| AppError::file(path, e))
    }

    fn read(&self, path: &Path) -> AppResult<Vec<u8>> {
        fs::read(path).map_err(|e| AppError::file(path, e))
    }

    fn replace(&self, path: &Path, contents: &[u8]) -> AppResult<()> {
        let parent = path.parent().ok_or_else(|| {
            AppError::Config(format!(
                "Journal path has no parent directory: {}",
                path.display()
            ))
        })?;
        create_private_dir_all(parent).map_err(|e| AppError::file(parent, e))?;

        let mut staged =
            tempfile::NamedTempFile::new_in(parent).map_err(|e| AppError::file(parent, e))?;
        staged
            .write_all(contents)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| AppError::file(staged.path(), e))?;

        #[cfg(unix)]
        {
            let permissions = fs::Permissions::from_mode(crate::constants::DEFAULT_FILE_PERMISSIONS);
            fs::set_permissions(staged.path(), permissions)
                .map_err(|e| AppError::file(staged.path(), e))?;
        }

        staged
            .persist(path)
            .map_err(|e| AppError::file(path, e.error))?;
        debug!("Replaced journal file {:?} ({} bytes)", path, contents.len());
        Ok(())
    }
}

/// Ensures the journal directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns:
/// - `AppError::Config` if the provided path is not an absolute path
/// - `AppError::File` if the directory creation fails due to permission issues,
///   invalid paths, or other filesystem errors
pub fn ensure_journal_directory_exists(journal_dir: &Path) -> AppResult<()> {
    if !journal_dir.is_absolute() {
        return Err(AppError::Config(format!(
            "Journal directory path must be absolute: {}",
            journal_dir.display()
        )));
    }

    if !journal_dir.exists() {
        create_private_dir_all(journal_dir).map_err(|e| AppError::file(journal_dir, e))?;
        debug!("Created journal directory {:?}", journal_dir);
    }
    Ok(())
}

fn create_private_dir_all(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(crate::constants::DEFAULT_DIR_PERMISSIONS);
    builder.create(dir)
}

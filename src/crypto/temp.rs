//! Secure temporary file handling with tmpfs preference.
//!
//! The scratch copy is the only place plaintext is ever written outside the
//! editor's own buffers. It prefers RAM-based tmpfs filesystems when available to
//! minimize disk persistence of decrypted content, and it is removed when the
//! `ScratchCopy` guard is dropped, whatever path the session took to get there.

use crate::constants::{SCRATCH_PREFIX, SCRATCH_SUFFIX, TMPFS_PATHS};
use crate::errors::{AppError, AppResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, warn};
use zeroize::Zeroizing;

/// Get a secure temporary directory, preferring tmpfs when available.
///
/// On Linux/BSD systems, this function prefers RAM-based tmpfs filesystems
/// (`/dev/shm` or `/run/shm`). If tmpfs is not available, it falls back to
/// the system temp directory with a warning.
///
/// # Example
///
/// ```no_run
/// use jrnl::crypto::get_secure_temp_dir;
///
/// let temp_dir = get_secure_temp_dir();
/// println!("Using temp dir: {:?}", temp_dir);
/// ```
pub fn get_secure_temp_dir() -> PathBuf {
    for candidate in TMPFS_PATHS {
        let path = Path::new(candidate);
        if path.is_dir() {
            debug!("Using tmpfs for scratch copies: {:?}", path);
            return path.to_path_buf();
        }
    }

    let fallback = std::env::temp_dir();
    warn!(
        "No tmpfs available, decrypted text will be written to {:?}",
        fallback
    );
    fallback
}

/// A uniquely named plaintext working file that is deleted on drop.
///
/// Removal is registered at creation time, so an editor crash, an encryption
/// failure or an early `?` return all release the file the same way a
/// successful session does. Before unlinking, the contents are overwritten with
/// zeros on a best-effort basis.
///
/// # Example
///
/// ```no_run
/// use jrnl::crypto::ScratchCopy;
///
/// let path = {
///     let scratch = ScratchCopy::acquire(None)?;
///     scratch.append(b"\n### heading\n")?;
///     scratch.path().to_path_buf()
/// };
/// assert!(!path.exists());
/// # Ok::<(), jrnl::AppError>(())
/// ```
#[derive(Debug)]
pub struct ScratchCopy {
    path: TempPath,
}

impl ScratchCopy {
    /// Creates an empty scratch file.
    ///
    /// With `dir` set, the file is created there and nowhere else. Without it,
    /// tmpfs is tried first and the platform temp directory second.
    ///
    /// # Errors
    ///
    /// Returns `AppError::File` if the file cannot be created.
    pub fn acquire(dir: Option<&Path>) -> AppResult<Self> {
        let file = match dir {
            Some(dir) => Self::create_in(dir)?,
            None => {
                let dir = get_secure_temp_dir();
                match Self::create_in(&dir) {
                    Ok(file) => file,
                    Err(e) if dir != std::env::temp_dir() => {
                        warn!(
                            "Could not create scratch copy in {:?} ({}), falling back to system temp dir",
                            dir, e
                        );
                        Self::create_in(&std::env::temp_dir())?
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        let path = file.into_temp_path();
        debug!("Acquired scratch copy {:?}", path);
        Ok(ScratchCopy { path })
    }

    fn create_in(dir: &Path) -> AppResult<tempfile::NamedTempFile> {
        tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .suffix(SCRATCH_SUFFIX)
            .tempfile_in(dir)
            .map_err(|e| AppError::file(dir, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the file contents.
    pub fn write_all(&self, bytes: &[u8]) -> AppResult<()> {
        fs::write(self.path(), bytes).map_err(|e| AppError::file(self.path(), e))
    }

    /// Appends to the end of the file.
    pub fn append(&self, bytes: &[u8]) -> AppResult<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(self.path())
            .map_err(|e| AppError::file(self.path(), e))?;
        file.write_all(bytes)
            .map_err(|e| AppError::file(self.path(), e))
    }

    /// Reads the whole file into a buffer that is wiped on drop.
    pub fn read(&self) -> AppResult<Zeroizing<Vec<u8>>> {
        fs::read(self.path())
            .map(Zeroizing::new)
            .map_err(|e| AppError::file(self.path(), e))
    }
}

impl Drop for ScratchCopy {
    fn drop(&mut self) {
        // The TempPath field unlinks the file after this runs.
        if let Err(e) = overwrite_with_zeros(&self.path) {
            debug!("Could not overwrite scratch copy before removal: {}", e);
        }
        debug!("Releasing scratch copy {:?}", &*self.path);
    }
}

/// Best-effort wipe. Not a guarantee on journaling filesystems or SSDs.
fn overwrite_with_zeros(path: &Path) -> std::io::Result<()> {
    let len = fs::metadata(path)?.len();
    if len == 0 {
        return Ok(());
    }
    let mut file = OpenOptions::new().write(true).open(path)?;
    let zeros = vec![0u8; 8192];
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(zeros.len() as u64) as usize;
        file.write_all(&zeros[..chunk])?;
        remaining -= chunk as u64;
    }
    file.sync_all()
}

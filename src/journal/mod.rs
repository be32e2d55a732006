//! Core journal functionality for the jrnl application.
//!
//! This module ties the pieces of an editing session together. The journal is a
//! single encrypted file (or one per day, see [`JournalLayout`]); each run
//! decrypts it into a scratch copy, appends a timestamped heading, lets the user
//! edit, normalizes the result and encrypts it back.
//!
//! The session follows a dependency injection pattern, allowing the secret
//! store, prompt, editor and formatter to be replaced in tests.

pub mod format;
pub mod io;
pub mod session;


use crate::constants::{JOURNAL_FILE_EXTENSION, JOURNAL_FILE_NAME, SESSION_HEADING_FORMAT};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use format::{EntryFormatter, MarkdownFormatter};
pub use session::{JournalSession, SessionReport, SessionState, Stage};

/// How entries are spread across files in the journal directory.
///
/// # Examples
///
/// ```
/// use jrnl::journal::JournalLayout;
/// use chrono::NaiveDate;
/// use std::path::{Path, PathBuf};
///
/// let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
/// assert_eq!(
///     JournalLayout::Single.path_for(Path::new("/j"), date),
///     PathBuf::from("/j/jrnl")
/// );
/// assert_eq!(
///     JournalLayout::Daily.path_for(Path::new("/j"), date),
///     PathBuf::from("/j/2026/10/19.jrnl")
/// );
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalLayout {
    /// Every session appends to one `jrnl` file.
    #[default]
    Single,
    /// Sessions go to `YYYY/MM/DD.jrnl`, keyed by the local date.
    Daily,
}

impl JournalLayout {
    /// The journal file for entries written on `date`.
    pub fn path_for(self, journal_dir: &Path, date: NaiveDate) -> PathBuf {
        match self {
            JournalLayout::Single => journal_dir.join(JOURNAL_FILE_NAME),
            JournalLayout::Daily => journal_dir
                .join(format!("{:04}", date.year()))
                .join(format!("{:02}", date.month()))
                .join(format!("{:02}.{}", date.day(), JOURNAL_FILE_EXTENSION)),
        }
    }
}

/// The Markdown heading that opens each editing session.
///
/// It starts with a blank line so consecutive sessions stay visually apart.
///
/// # Examples
///
/// ```
/// use jrnl::journal::session_heading;
/// use chrono::{Local, TimeZone};
///
/// let now = Local.with_ymd_and_hms(2026, 10, 19, 9, 5, 3).unwrap();
/// assert_eq!(session_heading(&now), "\n### 10-19-2026 09:05:03 Mon\n");
/// ```
pub fn session_heading(now: &DateTime<Local>) -> String {
    format!("\n### {}\n", now.format(SESSION_HEADING_FORMAT))
}

//! The editing session state machine.

use crate::config::SessionConfig;
use crate::constants::RECOVERY_SUFFIX;
use crate::crypto::{decrypt, encrypt, Passphrase, ScratchCopy};
use crate::editor::Editor;
use crate::errors::{AppError, AppResult};
use crate::journal::format::{EntryFormatter, MarkdownFormatter};
use crate::journal::io::{FileSystemIO, JournalIO};
use crate::journal::session_heading;
use crate::secrets::{PassphrasePrompt, SecretStore};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

/// A step of a session that has not finished yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    ResolvingSecret,
    Decrypting,
    Editing,
    Formatting,
    Encrypting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ResolvingSecret => "resolving secret",
            Stage::Decrypting => "decrypting",
            Stage::Editing => "editing",
            Stage::Formatting => "formatting",
            Stage::Encrypting => "encrypting",
        };
        f.write_str(name)
    }
}

/// Where a session is.
///
/// Transitions only move forward:
/// `Idle → ResolvingSecret → Decrypting → Editing → Formatting → Encrypting → Done`,
/// skipping the secret and decrypt stages when the journal does not exist yet.
/// Any error moves to `Failed` and records the stage it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active(Stage),
    Done,
    Failed { during: Stage },
}

/// What a successful session did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// The journal file that was written.
    pub journal_path: PathBuf,
    /// True when this session created the journal.
    pub created: bool,
    /// Size of the ciphertext written.
    pub bytes_written: usize,
    /// True when the passphrase was saved to the secret store during this run.
    pub passphrase_saved: bool,
}

/// One run of "open the journal, append, edit, seal".
///
/// Plaintext only ever exists in memory buffers that are wiped on drop and in
/// the [`ScratchCopy`], which is removed on every exit path. The journal file is
/// only replaced after a successful encryption, so every failure leaves it
/// byte-for-byte unchanged.
///
/// # Examples
///
/// ```no_run
/// use jrnl::config::{Config, SessionConfig};
/// use jrnl::editor::SystemEditor;
/// use jrnl::journal::JournalSession;
/// use jrnl::secrets::{KeyringStore, TerminalPrompt};
///
/// let config = Config::default();
/// let session_config = SessionConfig::from_config(&config, Some("vim".to_string()))?;
/// let editor = SystemEditor::new(session_config.editor.clone());
///
/// let mut session = JournalSession::new(
///     session_config,
///     Box::new(KeyringStore::new()),
///     Box::new(TerminalPrompt),
///     Box::new(editor),
/// );
/// let report = session.run(&chrono::Local::now())?;
/// println!("wrote {:?}", report.journal_path);
/// # Ok::<(), jrnl::AppError>(())
/// ```
pub struct JournalSession {
    config: SessionConfig,
    io: Box<dyn JournalIO>,
    secrets: Box<dyn SecretStore>,
    prompt: Box<dyn PassphrasePrompt>,
    editor: Box<dyn Editor>,
    formatter: Box<dyn EntryFormatter>,
    state: SessionState,
}

impl JournalSession {
    /// Creates a session over the filesystem journal described by `config`,
    /// formatting with [`MarkdownFormatter`].
    pub fn new(
        config: SessionConfig,
        secrets: Box<dyn SecretStore>,
        prompt: Box<dyn PassphrasePrompt>,
        editor: Box<dyn Editor>,
    ) -> Self {
        let io = FileSystemIO::new(config.journal_dir.clone(), config.layout);
        JournalSession {
            config,
            io: Box::new(io),
            secrets,
            prompt,
            editor,
            formatter: Box::new(MarkdownFormatter),
            state: SessionState::Active(Stage::Idle),
        }
    }

    /// Replaces the journal file backend.
    pub fn with_io(mut self, io: Box<dyn JournalIO>) -> Self {
        self.io = io;
        self
    }

    /// Replaces the formatter.
    pub fn with_formatter(mut self, formatter: Box<dyn EntryFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion. `now` dates the heading and, with the
    /// daily layout, picks the journal file.
    ///
    /// # Errors
    ///
    /// Any failure ends the session in `SessionState::Failed` and is returned
    /// unchanged; the journal file is left untouched and the scratch copy is
    /// removed. A formatting failure comes back as `AppError::EditRecovered`
    /// when the edit could be sealed unformatted next to the journal, and as
    /// `AppError::EditDiscarded` when it could not.
    pub fn run(&mut self, now: &DateTime<Local>) -> AppResult<SessionReport> {
        if self.state != SessionState::Active(Stage::Idle) {
            return Err(AppError::Config(
                "a journal session can only run once".to_string(),
            ));
        }

        match self.run_stages(now) {
            Ok(report) => {
                self.state = SessionState::Done;
                info!(
                    path = ?report.journal_path,
                    created = report.created,
                    bytes = report.bytes_written,
                    "Journal session complete"
                );
                Ok(report)
            }
            Err(e) => {
                let during = match self.state {
                    SessionState::Active(stage) => stage,
                    _ => Stage::Idle,
                };
                self.state = SessionState::Failed { during };
                error!(stage = %during, "Journal session failed: {}", e);
                Err(e)
            }
        }
    }

    fn enter(&mut self, stage: Stage) {
        debug!(stage = %stage, "Session transition");
        self.state = SessionState::Active(stage);
    }

    fn run_stages(&mut self, now: &DateTime<Local>) -> AppResult<SessionReport> {
        // Nothing is touched until the editor is known to be usable.
        self.editor.ensure_available()?;
        self.io.ensure_journal_dir()?;

        let journal_path = self.io.journal_path(now.date_naive());
        let created = !self.io.exists(&journal_path)?;

        let mut passphrase: Option<Passphrase> = None;
        let mut prompted = false;
        let mut plaintext: Option<Zeroizing<Vec<u8>>> = None;

        if created {
            info!(path = ?journal_path, "No journal yet, starting a new one");
        } else {
            self.enter(Stage::ResolvingSecret);
            let (resolved, from_prompt) = self.resolve_existing_passphrase()?;

            self.enter(Stage::Decrypting);
            let blob = self.io.read(&journal_path)?;
            plaintext = Some(decrypt(&blob, &resolved)?);
            debug!(bytes = blob.len(), "Journal decrypted");

            passphrase = Some(resolved);
            prompted = from_prompt;
        }

        self.enter(Stage::Editing);
        let scratch = ScratchCopy::acquire(self.config.scratch_dir.as_deref())?;
        if let Some(plaintext) = plaintext.take() {
            scratch.write_all(&plaintext)?;
        }
        scratch.append(session_heading(now).as_bytes())?;
        self.editor.edit(scratch.path())?;

        self.enter(Stage::Formatting);
        let edited = scratch.read()?;
        let formatted = match self.formatter.format(&edited) {
            Ok(text) => Zeroizing::new(text),
            Err(e) => return Err(self.seal_unformatted(&journal_path, &edited, passphrase, e)),
        };

        self.enter(Stage::Encrypting);
        let passphrase = match passphrase {
            Some(passphrase) => passphrase,
            None => {
                prompted = true;
                self.prompt.new_passphrase()?
            }
        };
        let blob = encrypt(formatted.as_bytes(), &passphrase, self.config.key_derivation)?;
        self.io.replace(&journal_path, &blob)?;
        drop(scratch);

        let passphrase_saved = prompted && self.offer_to_store(&passphrase);

        Ok(SessionReport {
            journal_path,
            created,
            bytes_written: blob.len(),
            passphrase_saved,
        })
    }

    /// Encrypts the edit as typed into a sibling recovery file, leaving the
    /// journal alone. Returns the error the session ends with.
    fn seal_unformatted(
        &self,
        journal_path: &Path,
        edited: &[u8],
        passphrase: Option<Passphrase>,
        cause: AppError,
    ) -> AppError {
        let recovery = recovery_path(journal_path);
        let sealed = passphrase
            .map_or_else(|| self.prompt.new_passphrase(), Ok)
            .and_then(|passphrase| encrypt(edited, &passphrase, self.config.key_derivation))
            .and_then(|blob| self.io.replace(&recovery, &blob));

        match sealed {
            Ok(()) => {
                warn!(path = ?recovery, "Formatting failed, edit sealed unformatted");
                AppError::EditRecovered {
                    recovery,
                    source: Box::new(cause),
                }
            }
            Err(e) => {
                error!("Could not seal the unformatted edit: {}", e);
                AppError::EditDiscarded {
                    source: Box::new(cause),
                }
            }
        }
    }

    /// Keyring first, prompt second. The flag is true when the prompt was used.
    fn resolve_existing_passphrase(&self) -> AppResult<(Passphrase, bool)> {
        match self.secrets.fetch()? {
            Some(passphrase) => {
                debug!("Using stored passphrase");
                Ok((passphrase, false))
            }
            None => {
                debug!("No stored passphrase, prompting");
                Ok((self.prompt.existing_passphrase()?, true))
            }
        }
    }

    /// The journal is already written, so nothing here can fail the session.
    fn offer_to_store(&self, passphrase: &Passphrase) -> bool {
        match self.prompt.confirm_store() {
            Ok(true) => match self.secrets.store(passphrase) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Could not save passphrase: {}", e);
                    false
                }
            },
            Ok(false) => {
                debug!("Passphrase not saved at user's request");
                false
            }
            Err(e) => {
                warn!("Could not ask whether to save passphrase: {}", e);
                false
            }
        }
    }
}

/// `<journal>.unformatted` next to the journal file.
fn recovery_path(journal_path: &Path) -> PathBuf {
    let mut name = journal_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(RECOVERY_SUFFIX);
    journal_path.with_file_name(name)
}

impl fmt::Debug for JournalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JournalSession")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

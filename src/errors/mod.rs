//! Error handling utilities for the jrnl application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, as well as the
//! convenience type alias `AppResult` for functions that can return these errors.
//!
//! None of the error types in this module ever carry passphrase bytes. Messages
//! name the command, path or stage that failed together with the underlying cause.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Represents specific error cases that can occur when interacting with external editors.
///
/// Every failure that happens after the editor was actually attempted carries the
/// command and the full argument list that was passed to it, so the user can
/// reproduce the invocation by hand.
///
/// # Examples
///
/// ```
/// use jrnl::errors::EditorError;
///
/// let error = EditorError::NonZeroExit {
///     command: "vim".to_string(),
///     args: vec!["+$".to_string(), "/tmp/jrnl-abc.md".to_string()],
///     status_code: 1,
/// };
///
/// let message = format!("{}", error);
/// assert!(message.contains("non-zero status code"));
/// assert!(message.contains("vim"));
/// assert!(message.contains("/tmp/jrnl-abc.md"));
/// ```
#[derive(Debug, Error)]
pub enum EditorError {
    /// No editor command was found in the environment at startup.
    #[error("No editor configured. Set the JRNL_EDITOR or EDITOR environment variable (e.g. EDITOR=vim).")]
    NotConfigured,

    /// Error when the specified editor command cannot be found.
    #[error("Editor command '{command}' not found (args: {args:?}): {source}. Please check that the editor is installed and available in your PATH.")]
    CommandNotFound {
        /// The editor command that was not found
        command: String,
        /// The arguments the editor was launched with
        args: Vec<String>,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when permission is denied to execute the editor command.
    #[error("Permission denied when trying to execute editor '{command}' (args: {args:?}): {source}")]
    PermissionDenied {
        /// The editor command that had permission denied
        command: String,
        /// The arguments the editor was launched with
        args: Vec<String>,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor command fails to execute due to other I/O errors.
    #[error("Failed to execute editor '{command}' (args: {args:?}): {source}")]
    ExecutionFailed {
        /// The editor command that failed to execute
        command: String,
        /// The arguments the editor was launched with
        args: Vec<String>,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Error when the editor exits with a non-zero status code.
    #[error("Editor '{command}' exited with non-zero status code: {status_code} (args: {args:?}). Your journal was left unchanged.")]
    NonZeroExit {
        /// The editor command that exited with a non-zero status
        command: String,
        /// The arguments the editor was launched with
        args: Vec<String>,
        /// The exit status code, `-1` when the child was killed by a signal
        status_code: i32,
    },
}

/// Represents specific error cases that can occur during cryptographic operations.
///
/// `AuthenticationFailure` deliberately covers both a wrong passphrase and a
/// corrupted or tampered file; the two cannot and should not be told apart.
///
/// # Examples
///
/// ```
/// use jrnl::errors::CryptoError;
///
/// let error = CryptoError::InvalidKeySize { expected: 32, actual: 7 };
/// let message = format!("{}", error);
/// assert!(message.contains("32"));
/// assert!(message.contains("7"));
/// ```
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The passphrase does not have the length the cipher requires.
    #[error("Passphrase must be exactly {expected} bytes, got {actual}")]
    InvalidKeySize {
        /// Required key length in bytes
        expected: usize,
        /// Length of the passphrase that was supplied
        actual: usize,
    },

    /// The blob is too short to even hold the header and nonce.
    #[error("Journal file is truncated: {actual} bytes, need at least {minimum}")]
    TruncatedCiphertext {
        /// Minimum number of bytes a valid blob has
        minimum: usize,
        /// Number of bytes actually present
        actual: usize,
    },

    /// Tag verification failed.
    #[error("Could not decrypt journal: wrong passphrase or the file is corrupted")]
    AuthenticationFailure,

    /// The operating system random source could not produce a nonce or salt.
    #[error("Failed to gather randomness for encryption: {0}")]
    EntropyFailure(String),

    /// The AEAD refused to seal the plaintext.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// The key-stretching function rejected its inputs.
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Represents errors raised while resolving or persisting the passphrase.
///
/// # Examples
///
/// ```
/// use jrnl::errors::SecretError;
///
/// let error = SecretError::Unavailable("no secret service".to_string());
/// assert!(format!("{}", error).contains("credential store"));
/// ```
#[derive(Debug, Error)]
pub enum SecretError {
    /// The platform credential store could not be reached or refused the request.
    #[error("Platform credential store unavailable: {0}")]
    Unavailable(String),

    /// Reading the passphrase from the terminal failed.
    #[error("Failed to read passphrase from terminal: {0}")]
    Prompt(String),

    /// The user entered nothing.
    #[error("Passphrase cannot be empty")]
    Empty,

    /// The confirmation did not match the first entry.
    #[error("Passphrases do not match")]
    Mismatch,
}

/// Errors produced while normalizing an edited entry.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The edited plaintext is not valid UTF-8.
    #[error("Journal text is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 {
        /// Byte offset of the first invalid sequence
        offset: usize,
    },
}

/// Represents all possible errors that can occur in the jrnl application.
///
/// This enum is the central error type used across the application, with variants
/// for different error categories. It uses `thiserror` for deriving the `Error` trait
/// implementation and formatted error messages.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use jrnl::errors::AppError;
///
/// let error = AppError::Config("Missing journal directory".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Missing journal directory");
/// ```
///
/// Converting from an IO error:
/// ```
/// use jrnl::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem operations.
    ///
    /// This variant automatically converts from `std::io::Error` through the `From` trait.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input/output errors tied to a specific file.
    #[error("I/O error on {}: {source}", path.display())]
    File {
        /// The file that was being read, written or created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Errors when interacting with the text editor.
    #[error("Editor error: {0}")]
    Editor(#[from] EditorError),

    /// Errors related to cryptographic operations.
    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    /// Errors related to passphrase resolution and storage.
    #[error("Secret store error: {0}")]
    Secret(#[from] SecretError),

    /// Errors raised while formatting the edited entry.
    #[error("Formatting error: {0}")]
    Format(#[from] FormatError),

    /// Formatting failed, so the edit was sealed unformatted next to the journal.
    #[error("{source}. The journal is unchanged; this session's text was encrypted unformatted to {}", recovery.display())]
    EditRecovered {
        /// Encrypted copy of the full edited text
        recovery: PathBuf,
        /// Why formatting failed
        #[source]
        source: Box<AppError>,
    },

    /// Formatting failed and the edit could not be kept either.
    #[error("{source}. The journal is unchanged and this session's text was discarded")]
    EditDiscarded {
        /// Why formatting failed
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::File {
            path: path.into(),
            source,
        }
    }
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use jrnl::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Config("Something went wrong".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_app_error_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

        let app_error: AppError = io_error.into();

        match app_error {
            AppError::Io(inner) => {
                assert_eq!(inner.kind(), io::ErrorKind::NotFound);
            }
            _ => panic!("Expected AppError::Io variant"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let config_error = AppError::Config("Invalid configuration".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Configuration error: Invalid configuration"
        );

        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
        let app_io_error = AppError::Io(io_error);
        assert_eq!(format!("{}", app_io_error), "I/O error: permission denied");

        let auth = AppError::Crypto(CryptoError::AuthenticationFailure);
        assert_eq!(
            format!("{}", auth),
            "Cryptographic error: Could not decrypt journal: wrong passphrase or the file is corrupted"
        );
    }

    #[test]
    fn test_file_error_names_path_and_keeps_source() {
        let err = AppError::file(
            "/journal/jrnl",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );

        let message = err.to_string();
        assert!(message.contains("/journal/jrnl"));
        assert!(message.contains("denied"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_editor_error_wraps_source() {
        let err = EditorError::CommandNotFound {
            command: "nope".to_string(),
            args: vec!["/tmp/x.md".to_string()],
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };

        assert!(err.to_string().contains("nope"));
        assert!(err.to_string().contains("/tmp/x.md"));
        assert!(err.source().is_some());

        let app: AppError = err.into();
        assert!(matches!(
            app,
            AppError::Editor(EditorError::CommandNotFound { .. })
        ));
    }

    #[test]
    fn test_not_configured_mentions_env_vars() {
        let message = EditorError::NotConfigured.to_string();
        assert!(message.contains("EDITOR"));
    }

    #[test]
    fn test_truncated_reports_sizes() {
        let message = CryptoError::TruncatedCiphertext {
            minimum: 13,
            actual: 4,
        }
        .to_string();
        assert!(message.contains("13"));
        assert!(message.contains('4'));
    }
}

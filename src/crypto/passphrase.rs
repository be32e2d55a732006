//! The passphrase type handed between the secret store and the cipher.
//!
//! A `Passphrase` owns its bytes in a `Zeroizing` buffer so they are wiped when
//! the value is dropped, and its `Debug` output never shows the contents.

use crate::constants::{KEY_LEN, REDACTED_PLACEHOLDER};
use crate::errors::{AppResult, SecretError};
use std::fmt;
use zeroize::Zeroizing;

/// Secret bytes used as (or stretched into) the journal key.
///
/// # Example
///
/// ```
/// use jrnl::crypto::Passphrase;
///
/// let passphrase = Passphrase::new(vec![b'k'; 32]);
/// assert!(passphrase.has_key_len());
/// assert!(!format!("{:?}", passphrase).contains("kkkk"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Passphrase(Zeroizing<Vec<u8>>);

impl Passphrase {
    /// Wraps raw secret bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Passphrase(Zeroizing::new(bytes))
    }

    /// Builds a passphrase from a line typed at the terminal.
    ///
    /// Trailing whitespace (including the newline) is trimmed. Leading
    /// whitespace is kept because it may be part of the secret.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Empty` if nothing is left after trimming.
    pub fn from_terminal_input(input: String) -> AppResult<Self> {
        let input = Zeroizing::new(input);
        let trimmed = input.trim_end();
        if trimmed.is_empty() {
            return Err(SecretError::Empty.into());
        }
        Ok(Passphrase::new(trimmed.as_bytes().to_vec()))
    }

    /// Borrows the secret bytes.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Length of the secret in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the passphrase can be used directly as an AES-256 key.
    pub fn has_key_len(&self) -> bool {
        self.len() == KEY_LEN
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Passphrase")
            .field(&REDACTED_PLACEHOLDER)
            .finish()
    }
}

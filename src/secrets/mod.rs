//! Passphrase resolution: the platform credential store and the terminal prompt.
//!
//! The journal key lives in the operating system's secure credential store:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet), cached in kernel keyutils
//!
//! When nothing is stored the user is prompted without echo. Both sources sit
//! behind traits so the session can be driven without a terminal or a keyring.

use crate::constants::{KEYRING_PASSPHRASE_KEY, KEYRING_SERVICE};
use crate::crypto::Passphrase;
use crate::errors::{AppResult, SecretError};
use std::io::{self, BufRead, Write};
use tracing::{debug, info};

/// Persistent storage for the journal passphrase.
pub trait SecretStore {
    /// Looks up the stored passphrase. `Ok(None)` means nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::Unavailable` if the backend cannot be queried.
    fn fetch(&self) -> AppResult<Option<Passphrase>>;

    /// Persists `passphrase` so later runs skip the prompt.
    fn store(&self, passphrase: &Passphrase) -> AppResult<()>;

    /// Removes the stored passphrase. Removing a missing entry succeeds.
    fn forget(&self) -> AppResult<()>;
}

/// Interactive source of passphrases and confirmations.
pub trait PassphrasePrompt {
    /// Asks for the passphrase of an existing journal.
    fn existing_passphrase(&self) -> AppResult<Passphrase>;

    /// Asks for a passphrase for a journal that does not exist yet.
    fn new_passphrase(&self) -> AppResult<Passphrase>;

    /// Asks whether the passphrase should be saved in the credential store.
    fn confirm_store(&self) -> AppResult<bool>;
}

/// `SecretStore` backed by the platform keyring.
///
/// # Example
///
/// ```no_run
/// use jrnl::secrets::{KeyringStore, SecretStore};
///
/// let store = KeyringStore::new();
/// match store.fetch()? {
///     Some(_) => println!("passphrase found"),
///     None => println!("nothing stored yet"),
/// }
/// # Ok::<(), jrnl::AppError>(())
/// ```
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
    key: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        KeyringStore {
            service: KEYRING_SERVICE.to_string(),
            key: KEYRING_PASSPHRASE_KEY.to_string(),
        }
    }
}

impl KeyringStore {
    /// Store under the application's fixed service and key names.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self) -> AppResult<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.key).map_err(|e| {
            SecretError::Unavailable(format!("failed to open keyring entry: {e}")).into()
        })
    }
}

impl SecretStore for KeyringStore {
    fn fetch(&self) -> AppResult<Option<Passphrase>> {
        match self.entry()?.get_secret() {
            Ok(bytes) => {
                debug!(service = %self.service, "Passphrase found in keyring");
                Ok(Some(Passphrase::new(bytes)))
            }
            Err(keyring::Error::NoEntry) => {
                debug!(service = %self.service, "No passphrase in keyring");
                Ok(None)
            }
            Err(e) => Err(SecretError::Unavailable(format!("failed to read from keyring: {e}")).into()),
        }
    }

    fn store(&self, passphrase: &Passphrase) -> AppResult<()> {
        self.entry()?.set_secret(passphrase.expose()).map_err(|e| {
            SecretError::Unavailable(format!("failed to store passphrase in keyring: {e}"))
        })?;
        info!(service = %self.service, "Passphrase saved to keyring");
        Ok(())
    }

    fn forget(&self) -> AppResult<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                info!(service = %self.service, "Passphrase removed from keyring");
                Ok(())
            }
            Err(e) => Err(SecretError::Unavailable(format!("failed to delete from keyring: {e}")).into()),
        }
    }
}

/// Prompts on the controlling terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_secret(prompt: &str) -> AppResult<Passphrase> {
        let input =
            rpassword::prompt_password(prompt).map_err(|e| SecretError::Prompt(e.to_string()))?;
        Passphrase::from_terminal_input(input)
    }
}

impl PassphrasePrompt for TerminalPrompt {
    fn existing_passphrase(&self) -> AppResult<Passphrase> {
        debug!("Prompting for existing passphrase");
        Self::read_secret("Passphrase (32 bytes): ")
    }

    fn new_passphrase(&self) -> AppResult<Passphrase> {
        debug!("Prompting for new passphrase (first entry)");
        println!("Choose a passphrase of exactly 32 bytes to encrypt your journal.");

        let passphrase = Self::read_secret("Passphrase (32 bytes): ")?;
        let confirmation = Self::read_secret("Confirm passphrase: ")?;
        if passphrase != confirmation {
            return Err(SecretError::Mismatch.into());
        }
        Ok(passphrase)
    }

    fn confirm_store(&self) -> AppResult<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        read_yes_no(
            &mut stdin.lock(),
            &mut stdout,
            "Save passphrase in the system keyring?",
            true,
        )
    }
}

/// Asks a yes/no question until it gets an answer; empty input picks `default`.
///
/// End of input also picks `default`.
pub fn read_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
    default: bool,
) -> AppResult<bool> {
    let hint = if default { "[Y/n]" } else { "[y/N]" };

    loop {
        write!(output, "{} {} ", question, hint)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(default);
        }

        match line.trim().to_lowercase().as_str() {
            "" => return Ok(default),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please answer yes or no.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answers: &str, default: bool) -> (bool, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let answer = read_yes_no(&mut input, &mut output, "Save?", default).unwrap();
        (answer, String::from_utf8(output).unwrap())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_keyring_backend_survives_reboot() {
        use keyring::credential::CredentialPersistence;

        let builder = keyring::default::default_credential_builder();
        assert!(matches!(
            builder.persistence(),
            CredentialPersistence::UntilDelete
        ));
    }

    #[test]
    fn test_yes_no_explicit_answers() {
        assert!(ask("y\n", false).0);
        assert!(ask("YES\n", false).0);
        assert!(!ask("n\n", true).0);
        assert!(!ask("No\n", true).0);
    }

    #[test]
    fn test_yes_no_default_on_empty_line_and_eof() {
        assert!(ask("\n", true).0);
        assert!(!ask("\n", false).0);
        assert!(ask("", true).0);
    }

    #[test]
    fn test_yes_no_reprompts_on_garbage() {
        let (answer, output) = ask("maybe\ny\n", false);
        assert!(answer);
        assert!(output.contains("Please answer yes or no."));
        assert_eq!(output.matches("Save? [y/N]").count(), 2);
    }

    #[test]
    fn test_keyring_store_uses_fixed_names() {
        let store = KeyringStore::new();
        assert_eq!(store.service, KEYRING_SERVICE);
        assert_eq!(store.key, KEYRING_PASSPHRASE_KEY);
    }
}

/*!
# jrnl

jrnl is an encrypted, append-style journal. Each run decrypts the journal into a
temporary scratch copy, appends a timestamped heading, opens the copy in your
editor and, once you quit, normalizes the Markdown and encrypts it back.

## Core Features

- AES-256-GCM encryption with a fresh random nonce per write
- Optional Argon2id key stretching
- Passphrase kept in the platform keyring (Keychain, Credential Manager, Secret Service)
- Plaintext scratch copy on tmpfs when available, removed on every exit path
- Atomic replacement of the journal file
- One journal file, or one file per day

## Architecture

- `cli`: Command-line interface handling using clap
- `config`: Config file loading and session settings
- `crypto`: Cipher, passphrase handling and the scratch copy
- `editor`: External editor invocation
- `errors`: Error handling infrastructure
- `journal`: Journal files, formatting and the session state machine
- `secrets`: Keyring storage and terminal prompts

## Usage Example

```rust,no_run
use jrnl::config::{editor_from_env, SessionConfig};
use jrnl::editor::SystemEditor;
use jrnl::journal::JournalSession;
use jrnl::secrets::{KeyringStore, TerminalPrompt};
use jrnl::Config;

fn main() -> jrnl::AppResult<()> {
    let config = Config::load_or_create(&Config::default_path()?)?;
    let session_config = SessionConfig::from_config(&config, editor_from_env()?)?;
    let editor = SystemEditor::new(session_config.editor.clone());

    JournalSession::new(
        session_config,
        Box::new(KeyringStore::new()),
        Box::new(TerminalPrompt),
        Box::new(editor),
    )
    .run(&chrono::Local::now())?;
    Ok(())
}
```
*/

/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application constants
pub mod constants;
/// Authenticated encryption and plaintext hygiene
pub mod crypto;
/// External editor abstraction
pub mod editor;
/// Error types and utilities for error handling
pub mod errors;
/// Journal storage, formatting and editing sessions
pub mod journal;
/// Passphrase storage and prompting
pub mod secrets;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};

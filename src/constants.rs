//! Constants used throughout the application.
//!
//! This module contains all constants used in the jrnl application, organized
//! into logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "jrnl";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "An encrypted, append-style journal edited in your own editor";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "warn";
/// Log level used when `--verbose` is given.
pub const VERBOSE_LOG_LEVEL: &str = "debug";

// Configuration Keys & Environment Variables
/// Environment variable for specifying the preferred jrnl editor.
pub const ENV_VAR_JRNL_EDITOR: &str = "JRNL_EDITOR";
/// Standard environment variable for specifying the default editor.
pub const ENV_VAR_EDITOR: &str = "EDITOR";
/// Standard environment variable for the user's home directory.
pub const ENV_VAR_HOME: &str = "HOME";
/// XDG base directory for configuration files.
pub const ENV_VAR_XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";
/// Directory under the user config dir that holds jrnl's files.
pub const CONFIG_SUBDIR: &str = "jrnl";
/// Name of the JSON configuration file.
pub const CONFIG_FILE_NAME: &str = "config.json";
/// Storage path written into a freshly created configuration.
pub const DEFAULT_STORAGE_PATH: &str = "~/.config/jrnl";
/// The only encryption method currently implemented.
pub const ENCRYPTION_AES_256_GCM: &str = "aes-256-gcm";

// Validation
/// Characters forbidden in editor commands for security reasons.
pub const EDITOR_FORBIDDEN_CHARS: &[char] =
    &['|', '&', ';', '$', '(', ')', '`', '\\', '<', '>', '\'', '"'];
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Secret Store
/// Service name under which the passphrase lives in the platform credential store.
pub const KEYRING_SERVICE: &str = "jrnl";
/// Entry name for the passphrase inside the keyring service.
pub const KEYRING_PASSPHRASE_KEY: &str = "passphrase";

// Cryptography
/// AES-256 key length; the passphrase must be exactly this many bytes.
pub const KEY_LEN: usize = 32;
/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Salt length for the Argon2id key-stretching format.
pub const SALT_LEN: usize = 16;
/// Format byte: passphrase used directly as the AES-256-GCM key.
pub const FORMAT_VERSION_RAW_KEY: u8 = 0x01;
/// Format byte: key derived from the passphrase with Argon2id.
pub const FORMAT_VERSION_ARGON2ID: u8 = 0x02;

// File System Parameters
/// File name of the journal in the single-file layout.
pub const JOURNAL_FILE_NAME: &str = "jrnl";
/// File extension for journal files in the daily layout.
pub const JOURNAL_FILE_EXTENSION: &str = "jrnl";
/// Appended to the journal file name for an edit sealed without formatting.
pub const RECOVERY_SUFFIX: &str = ".unformatted";
/// Prefix for scratch copies.
pub const SCRATCH_PREFIX: &str = "jrnl-";
/// Suffix for scratch copies, so editors pick up Markdown highlighting.
pub const SCRATCH_SUFFIX: &str = ".md";
/// RAM-backed filesystems preferred for scratch copies.
pub const TMPFS_PATHS: &[&str] = &["/dev/shm", "/run/shm"];
/// Default POSIX permissions for newly created directories (owner read/write/execute).
#[cfg(unix)]
pub const DEFAULT_DIR_PERMISSIONS: u32 = 0o700;
/// Default POSIX permissions for newly created files (owner read/write).
#[cfg(unix)]
pub const DEFAULT_FILE_PERMISSIONS: u32 = 0o600;

// Date/Time Logic
/// Timestamp format of the session heading, e.g. `10-19-2026 09:30:00 Mon`.
pub const SESSION_HEADING_FORMAT: &str = "%m-%d-%Y %H:%M:%S %a";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "jrnl";

//! Configuration management for the jrnl application.
//!
//! Settings come from two places. The config file is a small JSON object
//! stored at `$XDG_CONFIG_HOME/jrnl/config.json` (or
//! `$HOME/.config/jrnl/config.json`); it is created with defaults the first
//! time jrnl runs. The editor comes from the environment.
//!
//! Both are folded into a [`SessionConfig`] once at startup, so nothing later in
//! the session reads the environment.
//!
//! # Environment Variables
//!
//! - `JRNL_EDITOR`: Editor to use for journal entries
//! - `EDITOR`: Fallback editor if JRNL_EDITOR is not set (no default)
//! - `XDG_CONFIG_HOME`, `HOME`: Used to locate the config file and to expand
//!   the journal path

use crate::constants::{
    CONFIG_FILE_NAME, CONFIG_SUBDIR, DEFAULT_STORAGE_PATH, EDITOR_FORBIDDEN_CHARS,
    ENCRYPTION_AES_256_GCM, ENV_VAR_EDITOR, ENV_VAR_HOME, ENV_VAR_JRNL_EDITOR,
    ENV_VAR_XDG_CONFIG_HOME, REDACTED_PLACEHOLDER,
};
use crate::crypto::KeyDerivation;
use crate::errors::{AppError, AppResult};
use crate::journal::JournalLayout;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The on-disk configuration file.
///
/// Only `path` is required; every other field has a default.
///
/// # Examples
///
/// ```
/// use jrnl::Config;
///
/// let config: Config = serde_json::from_str(r#"{"path": "/home/me/journal"}"#).unwrap();
/// assert_eq!(config.encryption, "aes-256-gcm");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Journal directory. `~` and `$VAR` are expanded.
    pub path: String,

    /// Cipher name. Only `aes-256-gcm` is supported.
    #[serde(default = "default_encryption")]
    pub encryption: String,

    /// How the 32-byte passphrase becomes the cipher key for new writes.
    #[serde(default)]
    pub key_derivation: KeyDerivation,

    /// One journal file, or one per day.
    #[serde(default)]
    pub layout: JournalLayout,

    /// Directory for the plaintext scratch copy. Defaults to tmpfs when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<String>,
}

fn default_encryption() -> String {
    ENCRYPTION_AES_256_GCM.to_string()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("path", &REDACTED_PLACEHOLDER)
            .field("encryption", &self.encryption)
            .field("key_derivation", &self.key_derivation)
            .field("layout", &self.layout)
            .field(
                "scratch_dir",
                &self.scratch_dir.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            path: DEFAULT_STORAGE_PATH.to_string(),
            encryption: default_encryption(),
            key_derivation: KeyDerivation::default(),
            layout: JournalLayout::default(),
            scratch_dir: None,
        }
    }
}

impl Config {
    /// The default config file location.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither `XDG_CONFIG_HOME` nor `HOME` is set.
    pub fn default_path() -> AppResult<PathBuf> {
        let base = match env::var_os(ENV_VAR_XDG_CONFIG_HOME).filter(|v| !v.is_empty()) {
            Some(xdg) => PathBuf::from(xdg),
            None => env::var_os(ENV_VAR_HOME)
                .filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "Cannot locate config file: neither {} nor {} is set",
                        ENV_VAR_XDG_CONFIG_HOME, ENV_VAR_HOME
                    ))
                })?,
        };
        Ok(base.join(CONFIG_SUBDIR).join(CONFIG_FILE_NAME))
    }

    /// Loads the config file at `path`, creating it with defaults if it does
    /// not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read, parsed, written
    /// or fails validation.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use jrnl::Config;
    ///
    /// let path = Config::default_path()?;
    /// let config = Config::load_or_create(&path)?;
    /// println!("journal lives in {}", config.path);
    /// # Ok::<(), jrnl::AppError>(())
    /// ```
    pub fn load_or_create(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(path, &contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let config = Config::default();
                config.save(path)?;
                info!("Created default config file at {:?}", path);
                Ok(config)
            }
            Err(e) => Err(AppError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn parse(path: &Path, contents: &str) -> AppResult<Self> {
        let config: Config = serde_json::from_str(contents).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse config file {}: {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    /// Writes the config as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let write = || -> io::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
            fs::write(path, json + "\n")
        };
        write().map_err(|e| {
            AppError::Config(format!(
                "Failed to write config file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the journal path is empty or the
    /// encryption scheme is not `aes-256-gcm`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jrnl::Config;
    ///
    /// let config = Config {
    ///     encryption: "rot13".to_string(),
    ///     ..Config::default()
    /// };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> AppResult<()> {
        if self.path.trim().is_empty() {
            return Err(AppError::Config(
                "Journal directory path is empty".to_string(),
            ));
        }

        if self.encryption != ENCRYPTION_AES_256_GCM {
            return Err(AppError::Config(format!(
                "Unsupported encryption '{}': only '{}' is available",
                self.encryption, ENCRYPTION_AES_256_GCM
            )));
        }

        Ok(())
    }

    /// The journal directory with `~` and environment variables expanded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if expansion fails or the result is not an
    /// absolute path.
    pub fn journal_dir(&self) -> AppResult<PathBuf> {
        expand_absolute(&self.path, "Journal directory")
    }
}

/// Everything a journal session needs, resolved once at startup.
#[derive(Clone, PartialEq)]
pub struct SessionConfig {
    pub journal_dir: PathBuf,
    pub layout: JournalLayout,
    pub key_derivation: KeyDerivation,
    pub scratch_dir: Option<PathBuf>,
    /// `None` when neither `JRNL_EDITOR` nor `EDITOR` is set.
    pub editor: Option<String>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("journal_dir", &REDACTED_PLACEHOLDER)
            .field("layout", &self.layout)
            .field("key_derivation", &self.key_derivation)
            .field(
                "scratch_dir",
                &self.scratch_dir.as_ref().map(|_| REDACTED_PLACEHOLDER),
            )
            .field("editor", &self.editor)
            .finish()
    }
}

impl SessionConfig {
    /// Combines a validated config file with the resolved editor command.
    ///
    /// # Examples
    ///
    /// ```
    /// use jrnl::config::{Config, SessionConfig};
    /// use std::path::PathBuf;
    ///
    /// let config = Config { path: "/srv/journal".to_string(), ..Config::default() };
    /// let session = SessionConfig::from_config(&config, None).unwrap();
    /// assert_eq!(session.journal_dir, PathBuf::from("/srv/journal"));
    /// assert!(session.editor.is_none());
    /// ```
    pub fn from_config(config: &Config, editor: Option<String>) -> AppResult<Self> {
        config.validate()?;
        let scratch_dir = config
            .scratch_dir
            .as_deref()
            .map(|dir| expand_absolute(dir, "Scratch directory"))
            .transpose()?;

        Ok(SessionConfig {
            journal_dir: config.journal_dir()?,
            layout: config.layout,
            key_derivation: config.key_derivation,
            scratch_dir,
            editor,
        })
    }
}

/// Reads the editor command from `JRNL_EDITOR`, then `EDITOR`.
///
/// # Errors
///
/// Returns `AppError::Config` if the chosen command fails validation.
pub fn editor_from_env() -> AppResult<Option<String>> {
    resolve_editor(
        env::var(ENV_VAR_JRNL_EDITOR).ok(),
        env::var(ENV_VAR_EDITOR).ok(),
    )
}

/// Picks the first non-empty candidate and validates it. An empty variable
/// counts as unset.
///
/// # Examples
///
/// ```
/// use jrnl::config::resolve_editor;
///
/// assert_eq!(resolve_editor(None, Some("nano".into())).unwrap(), Some("nano".to_string()));
/// assert_eq!(resolve_editor(Some("hx".into()), Some("nano".into())).unwrap(), Some("hx".to_string()));
/// assert_eq!(resolve_editor(Some(String::new()), None).unwrap(), None);
/// assert!(resolve_editor(Some("vim; rm -rf ~".into()), None).is_err());
/// ```
pub fn resolve_editor(
    jrnl_editor: Option<String>,
    editor: Option<String>,
) -> AppResult<Option<String>> {
    let chosen = jrnl_editor
        .filter(|e| !e.is_empty())
        .or_else(|| editor.filter(|e| !e.is_empty()));

    match chosen {
        Some(command) => {
            validate_editor_command(&command)?;
            Ok(Some(command))
        }
        None => Ok(None),
    }
}

/// Validates an editor command string for security.
///
/// The command is executed directly, never through a shell, so arguments
/// cannot be smuggled in: spaces and shell metacharacters are rejected.
fn validate_editor_command(editor_cmd: &str) -> AppResult<()> {
    if editor_cmd.contains(' ') {
        return Err(AppError::Config(
            "Editor command cannot contain spaces. Use a wrapper script or shell alias for editors requiring arguments".to_string(),
        ));
    }

    if let Some(ch) = editor_cmd.chars().find(|c| EDITOR_FORBIDDEN_CHARS.contains(c)) {
        return Err(AppError::Config(format!(
            "Editor command cannot contain shell metacharacters: '{}'. Use a wrapper script or shell alias instead",
            ch
        )));
    }

    Ok(())
}

fn expand_absolute(raw: &str, what: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    let path = PathBuf::from(expanded.into_owned());

    if !path.is_absolute() {
        return Err(AppError::Config(format!(
            "{} must be an absolute path: {}",
            what,
            path.display()
        )));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_debug_impl_redacts_sensitive_info() {
        let config = Config {
            path: "/home/username/private/journal".to_string(),
            scratch_dir: Some("/home/username/scratch".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);

        assert!(debug_output.contains(REDACTED_PLACEHOLDER));
        assert!(!debug_output.contains("/home/username/private/journal"));
        assert!(!debug_output.contains("/home/username/scratch"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.path, DEFAULT_STORAGE_PATH);
        assert_eq!(config.encryption, ENCRYPTION_AES_256_GCM);
        assert_eq!(config.key_derivation, KeyDerivation::None);
        assert_eq!(config.layout, JournalLayout::Single);
        assert!(config.scratch_dir.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "path": "/j",
            "encryption": "aes-256-gcm",
            "key_derivation": "argon2id",
            "layout": "daily",
            "scratch_dir": "/scratch"
        }"#;
        let config = Config::parse(Path::new("config.json"), json).unwrap();
        assert_eq!(config.key_derivation, KeyDerivation::Argon2id);
        assert_eq!(config.layout, JournalLayout::Daily);
        assert_eq!(config.scratch_dir.as_deref(), Some("/scratch"));
    }

    #[test]
    fn test_parse_rejects_missing_path_and_bad_json() {
        assert!(matches!(
            Config::parse(Path::new("c.json"), "{}"),
            Err(AppError::Config(_))
        ));
        match Config::parse(Path::new("c.json"), "{not json") {
            Err(AppError::Config(msg)) => assert!(msg.contains("c.json")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_encryption_rejected() {
        let json = r#"{"path": "/j", "encryption": "aes-128-cbc"}"#;
        match Config::parse(Path::new("c.json"), json) {
            Err(AppError::Config(msg)) => assert!(msg.contains("aes-128-cbc")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jrnl").join("config.json");

        let created = Config::load_or_create(&path).unwrap();
        assert_eq!(created, Config::default());
        assert!(path.is_file());

        let reloaded = Config::load_or_create(&path).unwrap();
        assert_eq!(reloaded, created);
    }

    #[test]
    fn test_save_then_load_custom_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            path: "/data/journal".to_string(),
            layout: JournalLayout::Daily,
            ..Config::default()
        };

        config.save(&path).unwrap();
        assert_eq!(Config::load_or_create(&path).unwrap(), config);
    }

    #[test]
    fn test_session_config_requires_absolute_paths() {
        let config = Config {
            path: "relative/journal".to_string(),
            ..Config::default()
        };
        match SessionConfig::from_config(&config, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("absolute")),
            other => panic!("Expected Config error, got {:?}", other),
        }

        let config = Config {
            path: "/j".to_string(),
            scratch_dir: Some("scratch".to_string()),
            ..Config::default()
        };
        assert!(SessionConfig::from_config(&config, None).is_err());
    }

    #[test]
    #[serial]
    fn test_journal_dir_expands_home() {
        let orig_home = env::var("HOME").ok();
        env::set_var("HOME", "/home/tester");

        let config = Config::default();
        let dir = config.journal_dir();

        match orig_home {
            Some(val) => env::set_var("HOME", val),
            None => env::remove_var("HOME"),
        }

        assert_eq!(dir.unwrap(), PathBuf::from("/home/tester/.config/jrnl"));
    }

    #[test]
    #[serial]
    fn test_default_path_prefers_xdg() {
        let orig_xdg = env::var("XDG_CONFIG_HOME").ok();
        let orig_home = env::var("HOME").ok();

        env::set_var("XDG_CONFIG_HOME", "/xdg");
        env::set_var("HOME", "/home/tester");
        let with_xdg = Config::default_path();

        env::remove_var("XDG_CONFIG_HOME");
        let without_xdg = Config::default_path();

        match orig_xdg {
            Some(val) => env::set_var("XDG_CONFIG_HOME", val),
            None => env::remove_var("XDG_CONFIG_HOME"),
        }
        match orig_home {
            Some(val) => env::set_var("HOME", val),
            None => env::remove_var("HOME"),
        }

        assert_eq!(with_xdg.unwrap(), PathBuf::from("/xdg/jrnl/config.json"));
        assert_eq!(
            without_xdg.unwrap(),
            PathBuf::from("/home/tester/.config/jrnl/config.json")
        );
    }

    #[test]
    fn test_resolve_editor_precedence() {
        assert_eq!(
            resolve_editor(Some("code".into()), Some("nano".into())).unwrap(),
            Some("code".to_string())
        );
        assert_eq!(
            resolve_editor(None, Some("nano".into())).unwrap(),
            Some("nano".to_string())
        );
        assert_eq!(
            resolve_editor(Some(String::new()), Some("nano".into())).unwrap(),
            Some("nano".to_string())
        );
        assert_eq!(resolve_editor(None, None).unwrap(), None);
    }

    #[test]
    fn test_editor_validation() {
        for bad in ["vim -n", "vim|cat", "vim;ls", "$(vim)", "`vim`", "vim>out", "'vim'"] {
            assert!(
                matches!(resolve_editor(Some(bad.into()), None), Err(AppError::Config(_))),
                "{bad} should be rejected"
            );
        }
        assert!(resolve_editor(Some("/usr/bin/nvim".into()), None).is_ok());
    }

    #[test]
    #[serial]
    fn test_editor_from_env() {
        let orig_jrnl = env::var("JRNL_EDITOR").ok();
        let orig_editor = env::var("EDITOR").ok();

        env::remove_var("JRNL_EDITOR");
        env::set_var("EDITOR", "nano");
        let from_editor = editor_from_env();

        env::set_var("JRNL_EDITOR", "hx");
        let from_jrnl = editor_from_env();

        env::remove_var("JRNL_EDITOR");
        env::remove_var("EDITOR");
        let unset = editor_from_env();

        if let Some(val) = orig_jrnl {
            env::set_var("JRNL_EDITOR", val);
        }
        if let Some(val) = orig_editor {
            env::set_var("EDITOR", val);
        }

        assert_eq!(from_editor.unwrap(), Some("nano".to_string()));
        assert_eq!(from_jrnl.unwrap(), Some("hx".to_string()));
        assert_eq!(unset.unwrap(), None);
    }
}

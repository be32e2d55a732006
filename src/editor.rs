//! Editor abstraction for editing the scratch copy.
//!
//! This module provides an abstraction for opening a file in an external editor,
//! allowing the session to work with different editors and to be testable
//! by mocking the editor functionality.

use crate::errors::{AppResult, EditorError};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

/// Trait defining the interface for an editor component.
///
/// # Examples
///
/// ```
/// use jrnl::editor::Editor;
/// use jrnl::errors::AppResult;
/// use std::path::Path;
///
/// struct DummyEditor;
///
/// impl Editor for DummyEditor {
///     fn edit(&self, path: &Path) -> AppResult<()> {
///         println!("Would open {:?}", path);
///         Ok(())
///     }
/// }
///
/// let editor = DummyEditor;
/// assert!(editor.ensure_available().is_ok());
/// editor.edit(Path::new("entry.md")).unwrap();
/// ```
pub trait Editor {
    /// Checks the preconditions for editing without touching any file.
    ///
    /// The session calls this before resolving secrets so a misconfigured
    /// editor fails before anything else happens.
    fn ensure_available(&self) -> AppResult<()> {
        Ok(())
    }

    /// Opens `path` and blocks until the user is done with it.
    ///
    /// # Errors
    ///
    /// Implementations return `AppError::Editor` when the editor cannot be
    /// launched or reports failure.
    fn edit(&self, path: &Path) -> AppResult<()>;
}

/// Command-line conventions an editor understands.
///
/// Selection is a pure function of the editor command's file name, so
/// `/usr/local/bin/nvim` and `nvim` get the same profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorProfile {
    /// Only the file path is passed.
    Generic,
    /// Accepts `+N` to open at line `N`; the cursor is placed on the last line.
    LineJump,
    /// vi-family: Markdown syntax is requested and the cursor jumps to the end.
    SyntaxHint,
}

impl EditorProfile {
    /// Picks the profile for an editor command.
    ///
    /// # Examples
    ///
    /// ```
    /// use jrnl::editor::EditorProfile;
    ///
    /// assert_eq!(EditorProfile::for_command("vim"), EditorProfile::SyntaxHint);
    /// assert_eq!(EditorProfile::for_command("/usr/bin/nano"), EditorProfile::LineJump);
    /// assert_eq!(EditorProfile::for_command("code"), EditorProfile::Generic);
    /// ```
    pub fn for_command(command: &str) -> Self {
        let name = Path::new(command)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(command);

        match name {
            "vi" | "vim" | "nvim" | "view" => EditorProfile::SyntaxHint,
            "nano" | "pico" | "micro" | "emacs" | "emacsclient" | "kak" | "joe" => {
                EditorProfile::LineJump
            }
            _ => EditorProfile::Generic,
        }
    }

    /// Builds the argument list for opening `path`, which has `line_count` lines.
    pub fn args(self, path: &Path, line_count: usize) -> Vec<OsString> {
        let mut args: Vec<OsString> = match self {
            EditorProfile::Generic => Vec::new(),
            EditorProfile::LineJump => vec![format!("+{}", line_count.max(1)).into()],
            EditorProfile::SyntaxHint => {
                vec!["-c".into(), "set syntax=markdown".into(), "+$".into()]
            }
        };
        args.push(path.as_os_str().to_owned());
        args
    }

    fn needs_line_count(self) -> bool {
        self == EditorProfile::LineJump
    }
}

/// An implementation of the Editor trait that launches an external program.
///
/// The command is resolved once at startup (see `SessionConfig`); a missing
/// command is only reported when editing is attempted. The child inherits the
/// terminal's standard streams and the call blocks until it exits.
///
/// # Examples
///
/// ```no_run
/// use jrnl::editor::{Editor, SystemEditor};
/// use std::path::Path;
///
/// let editor = SystemEditor::new(Some("vim".to_string()));
/// editor.edit(Path::new("/tmp/jrnl-scratch.md")).expect("editor failed");
/// ```
#[derive(Debug, Clone)]
pub struct SystemEditor {
    command: Option<String>,
}

impl SystemEditor {
    pub fn new(command: Option<String>) -> Self {
        SystemEditor { command }
    }

    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    fn require_command(&self) -> AppResult<&str> {
        self.command
            .as_deref()
            .ok_or_else(|| EditorError::NotConfigured.into())
    }
}

impl Editor for SystemEditor {
    fn ensure_available(&self) -> AppResult<()> {
        self.require_command().map(|_| ())
    }

    fn edit(&self, path: &Path) -> AppResult<()> {
        let command = self.require_command()?;
        let profile = EditorProfile::for_command(command);

        let line_count = if profile.needs_line_count() {
            count_lines(path)
        } else {
            0
        };
        let args = profile.args(path, line_count);
        let display_args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        info!(editor = %command, ?profile, "Launching editor");
        debug!("Editor arguments: {:?}", display_args);

        let status = Command::new(command).args(&args).status();

        match status {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EditorError::CommandNotFound {
                    command: command.to_string(),
                    args: display_args,
                    source: e,
                }
                .into())
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Err(EditorError::PermissionDenied {
                    command: command.to_string(),
                    args: display_args,
                    source: e,
                }
                .into())
            }
            Err(e) => Err(EditorError::ExecutionFailed {
                command: command.to_string(),
                args: display_args,
                source: e,
            }
            .into()),
            Ok(status) if !status.success() => Err(EditorError::NonZeroExit {
                command: command.to_string(),
                args: display_args,
                status_code: status.code().unwrap_or(-1),
            }
            .into()),
            Ok(_) => {
                debug!("Editor exited successfully");
                Ok(())
            }
        }
    }
}

/// Counts lines for the line-jump argument. An unreadable file counts as empty.
fn count_lines(path: &Path) -> usize {
    match fs::read(path) {
        Ok(contents) => {
            let newlines = contents.iter().filter(|&&b| b == b'\n').count();
            let unterminated = usize::from(contents.last().is_some_and(|&b| b != b'\n'));
            newlines + unterminated
        }
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    struct MockEditor {
        pub opened_files: Arc<Mutex<Vec<String>>>,
    }

    impl MockEditor {
        fn new() -> Self {
            MockEditor {
                opened_files: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl Editor for MockEditor {
        fn edit(&self, path: &Path) -> AppResult<()> {
            let mut opened = self.opened_files.lock().unwrap();
            opened.push(path.display().to_string());
            Ok(())
        }
    }

    #[test]
    fn test_mock_editor_records_path() {
        let editor = MockEditor::new();

        editor.edit(Path::new("entry.md")).unwrap();

        let opened = editor.opened_files.lock().unwrap();
        assert_eq!(opened.as_slice(), ["entry.md"]);
    }

    #[test]
    fn test_profile_selection() {
        assert_eq!(EditorProfile::for_command("vi"), EditorProfile::SyntaxHint);
        assert_eq!(
            EditorProfile::for_command("/opt/homebrew/bin/nvim"),
            EditorProfile::SyntaxHint
        );
        assert_eq!(EditorProfile::for_command("nano"), EditorProfile::LineJump);
        assert_eq!(EditorProfile::for_command("micro"), EditorProfile::LineJump);
        assert_eq!(EditorProfile::for_command("hx"), EditorProfile::Generic);
        assert_eq!(EditorProfile::for_command(""), EditorProfile::Generic);
    }

    #[test]
    fn test_profile_args() {
        let path = Path::new("/tmp/jrnl-x.md");

        assert_eq!(
            EditorProfile::Generic.args(path, 10),
            vec![OsString::from("/tmp/jrnl-x.md")]
        );
        assert_eq!(
            EditorProfile::LineJump.args(path, 10),
            vec![OsString::from("+10"), OsString::from("/tmp/jrnl-x.md")]
        );
        assert_eq!(
            EditorProfile::LineJump.args(path, 0),
            vec![OsString::from("+1"), OsString::from("/tmp/jrnl-x.md")]
        );
        assert_eq!(
            EditorProfile::SyntaxHint.args(path, 10),
            vec![
                OsString::from("-c"),
                OsString::from("set syntax=markdown"),
                OsString::from("+$"),
                OsString::from("/tmp/jrnl-x.md"),
            ]
        );
    }

    #[test]
    fn test_count_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.md");

        assert_eq!(count_lines(&path), 0);

        fs::write(&path, "\n### heading\n").unwrap();
        assert_eq!(count_lines(&path), 2);

        fs::write(&path, "\n### heading\ntext").unwrap();
        assert_eq!(count_lines(&path), 3);
    }

    #[test]
    fn test_unconfigured_editor() {
        let editor = SystemEditor::new(None);

        assert!(matches!(
            editor.ensure_available(),
            Err(AppError::Editor(EditorError::NotConfigured))
        ));
        assert!(matches!(
            editor.edit(Path::new("entry.md")),
            Err(AppError::Editor(EditorError::NotConfigured))
        ));
    }

    #[test]
    fn test_missing_editor_command() {
        let editor = SystemEditor::new(Some("jrnl_nonexistent_editor_cmd".to_string()));

        match editor.edit(Path::new("entry.md")) {
            Err(AppError::Editor(EditorError::CommandNotFound { command, args, .. })) => {
                assert_eq!(command, "jrnl_nonexistent_editor_cmd");
                assert_eq!(args, vec!["entry.md".to_string()]);
            }
            other => panic!("Expected CommandNotFound, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_editor_exit_status() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entry.md");
        fs::write(&path, "").unwrap();

        assert!(SystemEditor::new(Some("true".to_string())).edit(&path).is_ok());

        match SystemEditor::new(Some("false".to_string())).edit(&path) {
            Err(AppError::Editor(EditorError::NonZeroExit { status_code, .. })) => {
                assert_eq!(status_code, 1);
            }
            other => panic!("Expected NonZeroExit, got {:?}", other),
        }
    }
}

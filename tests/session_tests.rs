//! End-to-end editing sessions with a real child-process editor.
//!
//! The editor is a small shell script that appends text to the scratch copy, so
//! these tests run only on Unix.
#![cfg(unix)]


use chrono::{Local, TimeZone};
use jrnl::config::SessionConfig;
use jrnl::crypto::{decrypt, KeyDerivation};
use jrnl::editor::SystemEditor;
use jrnl::errors::{AppError, CryptoError, EditorError};
use jrnl::journal::{JournalLayout, JournalSession, SessionState, Stage};
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use test_helpers::{stub_editor, test_passphrase, FixedPrompt, MemoryStore};

fn session_config(journal_dir: &Path, scratch_dir: &Path, editor: &Path) -> SessionConfig {
    SessionConfig {
        journal_dir: journal_dir.to_path_buf(),
        layout: JournalLayout::Single,
        key_derivation: KeyDerivation::None,
        scratch_dir: Some(scratch_dir.to_path_buf()),
        editor: Some(editor.to_string_lossy().into_owned()),
    }
}

fn session(config: SessionConfig, store: &MemoryStore) -> JournalSession {
    let editor = SystemEditor::new(config.editor.clone());
    JournalSession::new(
        config,
        Box::new(store.clone()),
        Box::new(FixedPrompt(test_passphrase())),
        Box::new(editor),
    )
}

#[test]
fn test_hello_round_trip_through_real_editor() {
    let root = tempdir().unwrap();
    let journal_dir = root.path().join("journal");
    let scratch_dir = tempdir().unwrap();
    let editor = stub_editor(root.path(), "stub-editor", "hello\n");
    let now = Local.with_ymd_and_hms(2026, 10, 19, 7, 30, 45).unwrap();

    let store = MemoryStore::default();
    let mut session = session(
        session_config(&journal_dir, scratch_dir.path(), &editor),
        &store,
    );
    let report = session.run(&now).expect("session should succeed");

    assert_eq!(session.state(), SessionState::Done);
    assert!(report.created);
    assert_eq!(report.journal_path, journal_dir.join("jrnl"));

    let blob = fs::read(&report.journal_path).unwrap();
    let plaintext = decrypt(&blob, &test_passphrase()).unwrap();
    assert_eq!(
        String::from_utf8(plaintext.to_vec()).unwrap(),
        "\n### 10-19-2026 07:30:45 Mon\nhello\n"
    );
    assert_eq!(fs::read_dir(scratch_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_second_session_appends_with_stored_passphrase() {
    let root = tempdir().unwrap();
    let journal_dir = root.path().join("journal");
    let scratch_dir = tempdir().unwrap();
    let first = stub_editor(root.path(), "first-editor", "morning\n");
    let second = stub_editor(root.path(), "second-editor", "evening\n");
    let store = MemoryStore::holding(test_passphrase());

    let morning = Local.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap();
    session(session_config(&journal_dir, scratch_dir.path(), &first), &store)
        .run(&morning)
        .unwrap();

    let evening = Local.with_ymd_and_hms(2026, 10, 19, 20, 0, 0).unwrap();
    let report = session(session_config(&journal_dir, scratch_dir.path(), &second), &store)
        .run(&evening)
        .unwrap();
    assert!(!report.created);

    let blob = fs::read(&report.journal_path).unwrap();
    let plaintext = decrypt(&blob, &test_passphrase()).unwrap();
    assert_eq!(
        String::from_utf8(plaintext.to_vec()).unwrap(),
        "\n### 10-19-2026 08:00:00 Mon\nmorning\n\n### 10-19-2026 20:00:00 Mon\nevening\n"
    );
}

#[test]
fn test_failing_editor_leaves_no_trace() {
    let root = tempdir().unwrap();
    let journal_dir = root.path().join("journal");
    let scratch_dir = tempdir().unwrap();
    let now = Local::now();

    let config = SessionConfig {
        editor: Some("false".to_string()),
        ..session_config(&journal_dir, scratch_dir.path(), Path::new("unused"))
    };
    let mut session = session(config, &MemoryStore::default());
    let result = session.run(&now);

    assert!(matches!(
        result,
        Err(AppError::Editor(EditorError::NonZeroExit { status_code: 1, .. }))
    ));
    assert_eq!(
        session.state(),
        SessionState::Failed {
            during: Stage::Editing
        }
    );
    assert!(!journal_dir.join("jrnl").exists());
    assert_eq!(fs::read_dir(scratch_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_editor_touches_nothing() {
    let root = tempdir().unwrap();
    let journal_dir = root.path().join("journal");
    let scratch_dir = tempdir().unwrap();

    let config = SessionConfig {
        editor: None,
        ..session_config(&journal_dir, scratch_dir.path(), Path::new("unused"))
    };
    let result = session(config, &MemoryStore::default()).run(&Local::now());

    assert!(matches!(
        result,
        Err(AppError::Editor(EditorError::NotConfigured))
    ));
    assert!(!journal_dir.exists());
}

#[test]
fn test_tampered_journal_is_rejected() {
    let root = tempdir().unwrap();
    let journal_dir = root.path().join("journal");
    let scratch_dir = tempdir().unwrap();
    let editor = stub_editor(root.path(), "stub-editor", "text\n");
    let store = MemoryStore::holding(test_passphrase());

    let report = session(session_config(&journal_dir, scratch_dir.path(), &editor), &store)
        .run(&Local::now())
        .unwrap();

    let mut blob = fs::read(&report.journal_path).unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0x01;
    fs::write(&report.journal_path, &blob).unwrap();

    let result = session(session_config(&journal_dir, scratch_dir.path(), &editor), &store)
        .run(&Local::now());
    assert!(matches!(
        result,
        Err(AppError::Crypto(CryptoError::AuthenticationFailure))
    ));
    assert_eq!(fs::read(&report.journal_path).unwrap(), blob);
}

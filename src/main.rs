/*!
# jrnl - An Encrypted Journal

jrnl appends a timestamped entry to an encrypted Markdown journal and opens it in
your editor. When the editor exits, the journal is normalized, encrypted and
written back atomically.

This file contains the main application flow, coordinating the various components
to implement the journal functionality.

## Usage

```text
jrnl [OPTIONS]

Options:
      --config <FILE>          Use this config file instead of $XDG_CONFIG_HOME/jrnl/config.json
  -v, --verbose                Print verbose output
      --log-format <FORMAT>    Log output format [default: text] [possible values: text, json]
      --forget-passphrase      Remove the passphrase saved in the system keyring and exit
  -h, --help                   Print help
  -V, --version                Print version
```

## Configuration

- `JRNL_EDITOR` or `EDITOR`: The editor to open the journal with (required)
- `RUST_LOG`: Overrides the log filter
*/

use chrono::Local;
use jrnl::cli::CliArgs;
use jrnl::config::{editor_from_env, Config, SessionConfig};
use jrnl::constants::{DEFAULT_LOG_LEVEL, TRACING_SERVICE_NAME, VERBOSE_LOG_LEVEL};
use jrnl::editor::SystemEditor;
use jrnl::errors::AppResult;
use jrnl::journal::JournalSession;
use jrnl::secrets::{KeyringStore, SecretStore, TerminalPrompt};
use std::process::ExitCode;
use tracing::{debug, info, info_span};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_tracing(&args);

    let correlation_id = uuid::Uuid::new_v4();
    let span = info_span!(
        "app_invocation",
        service = TRACING_SERVICE_NAME,
        correlation_id = %correlation_id
    );
    let _guard = span.enter();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so they never mix with prompts. `RUST_LOG` wins over
/// `--verbose`.
fn init_tracing(args: &CliArgs) {
    let default_level = if args.verbose {
        VERBOSE_LOG_LEVEL
    } else {
        DEFAULT_LOG_LEVEL
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if args.json_logs() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// The application flow:
/// 1. Load (or create) the config file
/// 2. Resolve the editor once from the environment
/// 3. Either forget the stored passphrase, or run one editing session
fn run(args: &CliArgs) -> AppResult<()> {
    // Obtain current date/time once at the beginning
    let now = Local::now();
    debug!("CLI arguments: {:?}", args);

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let config = Config::load_or_create(&config_path)?;

    let secrets = KeyringStore::new();
    if args.forget_passphrase {
        secrets.forget()?;
        println!("Passphrase removed from the system keyring.");
        return Ok(());
    }

    let session_config = SessionConfig::from_config(&config, editor_from_env()?)?;
    debug!("Session config: {:?}", session_config);
    let editor = SystemEditor::new(session_config.editor.clone());

    let mut session = JournalSession::new(
        session_config,
        Box::new(secrets),
        Box::new(TerminalPrompt),
        Box::new(editor),
    );
    let report = session.run(&now)?;

    info!(
        path = ?report.journal_path,
        created = report.created,
        "Journal saved"
    );
    Ok(())
}

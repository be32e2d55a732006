use crate::constants::{APP_DESCRIPTION, APP_NAME, LOG_FORMAT_JSON, LOG_FORMAT_TEXT};
use clap::Parser;
use std::path::PathBuf;

/// An encrypted, append-style journal edited in your own editor
#[derive(Parser, Debug)]
#[clap(name = APP_NAME, about = APP_DESCRIPTION)]
#[clap(author, version, long_about = None)]
pub struct CliArgs {
    /// Use this config file instead of $XDG_CONFIG_HOME/jrnl/config.json
    #[clap(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print verbose output
    #[clap(short = 'v', long)]
    pub verbose: bool,

    /// Log output format
    #[clap(
        long,
        value_name = "FORMAT",
        default_value = LOG_FORMAT_TEXT,
        value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON]
    )]
    pub log_format: String,

    /// Remove the passphrase saved in the system keyring and exit
    #[clap(long)]
    pub forget_passphrase: bool,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <CliArgs as Parser>::parse()
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == LOG_FORMAT_JSON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = CliArgs::parse_from(vec!["jrnl"]);
        assert!(args.config.is_none());
        assert!(!args.verbose);
        assert_eq!(args.log_format, LOG_FORMAT_TEXT);
        assert!(!args.json_logs());
        assert!(!args.forget_passphrase);
    }

    #[test]
    fn test_verbose_flag() {
        let args = CliArgs::parse_from(vec!["jrnl", "--verbose"]);
        assert!(args.verbose);

        // Test short form
        let args = CliArgs::parse_from(vec!["jrnl", "-v"]);
        assert!(args.verbose);
    }

    #[test]
    fn test_config_option() {
        let args = CliArgs::parse_from(vec!["jrnl", "--config", "/tmp/jrnl.json"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/jrnl.json")));
    }

    #[test]
    fn test_log_format_option() {
        let args = CliArgs::parse_from(vec!["jrnl", "--log-format", "json"]);
        assert!(args.json_logs());

        let result = CliArgs::try_parse_from(vec!["jrnl", "--log-format", "xml"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_forget_passphrase_flag() {
        let args = CliArgs::parse_from(vec!["jrnl", "--forget-passphrase", "-v"]);
        assert!(args.forget_passphrase);
        assert!(args.verbose);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(CliArgs::try_parse_from(vec!["jrnl", "--retro"]).is_err());
    }
}

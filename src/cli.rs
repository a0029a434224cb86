//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// Tripwise - agentic trip planning service
#[derive(Debug, Parser)]
#[command(name = "tripwise", version, about = "Serves the trip planning API")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tripwise"]);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["tripwise", "-c", "/etc/tripwise.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/tripwise.toml")));

        let cli = Cli::parse_from(["tripwise", "--config=local.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("local.toml")));
    }

    #[test]
    fn test_cli_rejects_missing_value_and_unknown_flags() {
        assert!(Cli::try_parse_from(["tripwise", "--config"]).is_err());

        let err = Cli::try_parse_from(["tripwise", "--confg", "x.toml"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_version_flag() {
        let err = Cli::try_parse_from(["tripwise", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayVersion);
    }
}

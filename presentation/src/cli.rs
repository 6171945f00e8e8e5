//! Command-line interface definition

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "consilium",
    about = "Multi-party AI medical consultation with round-based elimination",
    version
)]
pub struct Cli {
    /// Patient case file (TOML)
    #[arg(short, long)]
    pub case: Option<PathBuf>,

    /// Patient name (alternative to --case)
    #[arg(long)]
    pub patient: Option<String>,

    /// Chief complaint (alternative to --case)
    #[arg(long)]
    pub problem: Option<String>,

    /// Explicit configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ignore configuration files and use built-in defaults
    #[arg(long)]
    pub no_config: bool,

    /// Save the finished consultation under this session name
    #[arg(long, value_name = "NAME")]
    pub save_as: Option<String>,

    /// Write a markdown report to this path when finished
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// List models for a provider (openai | anthropic | gemini) and exit
    #[arg(long, value_name = "PROVIDER")]
    pub list_models: Option<String>,

    /// API key used with --list-models
    #[arg(long, default_value = "")]
    pub api_key: String,

    /// Base URL override used with --list-models
    #[arg(long, default_value = "")]
    pub base_url: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_case_run() {
        let cli = Cli::parse_from(["consilium", "--case", "alice.toml", "-vv"]);
        assert_eq!(cli.case.unwrap().to_string_lossy(), "alice.toml");
        assert_eq!(cli.verbose, 2);
        assert!(cli.list_models.is_none());
    }

    #[test]
    fn test_parses_inline_case() {
        let cli = Cli::parse_from([
            "consilium",
            "--patient",
            "Alice",
            "--problem",
            "persistent cough",
        ]);
        assert_eq!(cli.patient.as_deref(), Some("Alice"));
        assert_eq!(cli.problem.as_deref(), Some("persistent cough"));
    }

    #[test]
    fn test_parses_model_listing() {
        let cli = Cli::parse_from(["consilium", "--list-models", "openai", "--api-key", "k"]);
        assert_eq!(cli.list_models.as_deref(), Some("openai"));
        assert_eq!(cli.api_key, "k");
    }
}

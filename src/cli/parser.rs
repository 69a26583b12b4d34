use crate::config::DEFAULT_CONFIG_FILENAME;
use std::path::PathBuf;

/// Enum representing CLI commands
#[derive(Debug, PartialEq)]
pub enum Command {
    Generate(GenerateOptions),
    Help,
    Unknown(String),
}

/// Options for generating the notes
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub config_path: PathBuf,
    /// Open the written file with the default application
    pub open: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILENAME),
            open: true,
        }
    }
}

pub const USAGE: &str = "\
Usage: release-notes [--config <path>] [--no-open]

Generates temp/release_notes.md from the GitHub issues of a milestone,
grouped by the labels listed in the [config] section of the config file.

Options:
  -c, --config <path>  Config file (default: local_release_notes.cfg)
      --no-open        Do not open the generated file
  -h, --help           Show this message";

/// Parse command line arguments and return a Command
///
/// # Arguments
/// * `args` - Command line arguments (including program name)
///
/// # Returns
/// * `Command` - The parsed command
pub fn parse_args(args: &[String]) -> Command {
    let mut options = GenerateOptions::default();
    let mut rest = args.iter().skip(1);

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "help" | "--help" | "-h" => return Command::Help,
            "--no-open" => options.open = false,
            "--config" | "-c" => match rest.next() {
                Some(path) if !path.starts_with('-') => options.config_path = PathBuf::from(path),
                _ => {
                    return Command::Unknown(
                        "Missing config path. Usage: release-notes --config <path>".to_string(),
                    );
                }
            },
            other => match other.strip_prefix("--config=") {
                Some(path) if !path.is_empty() => options.config_path = PathBuf::from(path),
                _ => return Command::Unknown(other.to_string()),
            },
        }
    }

    Command::Generate(options)
}

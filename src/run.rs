use crate::cli::parser::{self, Command, GenerateOptions};
use crate::config::ReleaseConfig;
use crate::github::search::HttpIssueSource;
use crate::notes;
use crate::opener::Launcher;
use crate::output;
use std::process::ExitCode;
use tracing::debug;

/// Printed when fetching issues or writing the notes fails, whatever the cause.
pub const FETCH_ERROR_MESSAGE: &str =
    "Error: Could not get list. Check connectivity, config, etc...";

/// Run the CLI with `args` (including program name).
///
/// Every line meant for the user is also written to `stdout_additional` when
/// given. Configuration errors are returned as `Err`; fetch and write errors
/// are reported with [`FETCH_ERROR_MESSAGE`] and a failure exit code.
pub async fn run(
    args: Vec<String>,
    mut stdout_additional: Option<&mut dyn std::io::Write>,
) -> anyhow::Result<ExitCode> {
    match parser::parse_args(&args) {
        Command::Generate(options) => generate(&options, &mut stdout_additional).await,
        Command::Help => {
            output::println(parser::USAGE, &mut stdout_additional)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Unknown(reason) => {
            output::println(
                &format!("Invalid argument: {reason}. Use --help for usage."),
                &mut stdout_additional,
            )?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn generate(
    options: &GenerateOptions,
    stdout_additional: &mut Option<&mut dyn std::io::Write>,
) -> anyhow::Result<ExitCode> {
    let config = ReleaseConfig::load(&options.config_path)?;
    let launcher = options.open.then(Launcher::detect);
    let source = HttpIssueSource::from_env()?;
    let path = notes::output_path();

    let date = notes::today();
    let result = notes::generate(&path, &config, &source, source.endpoint(), &date).await;
    if let Err(e) = result {
        debug!("{e:#}");
        output::println(FETCH_ERROR_MESSAGE, stdout_additional)?;
        return Ok(ExitCode::FAILURE);
    }

    if let Some(launcher) = launcher {
        match std::path::absolute(&path) {
            Ok(absolute) => launcher.open(&absolute),
            Err(e) => tracing::warn!(error = %e, "could not resolve output path"),
        }
    }

    Ok(ExitCode::SUCCESS)
}

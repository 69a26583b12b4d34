use crate::config::ReleaseConfig;
use crate::github::issues::GitHubIssue;
use crate::github::search::{self, IssueSource};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory receiving the generated notes, relative to the working directory.
pub const OUTPUT_DIR: &str = "temp";
/// Filename of the generated notes.
pub const OUTPUT_FILENAME: &str = "release_notes.md";

/// Path of the generated notes relative to the working directory
pub fn output_path() -> PathBuf {
    Path::new(OUTPUT_DIR).join(OUTPUT_FILENAME)
}

/// Today's local date as written in the header, e.g. `05 March 2024`
pub fn today() -> String {
    chrono::Local::now().format("%d %B %Y").to_string()
}

pub fn format_issue_line(issue: &GitHubIssue) -> String {
    format!("* **{}** - [#{}]({})", issue.title, issue.number, issue.url)
}

/// Writes the whole document to `writer`, fetching one search page per label.
///
/// Each label heading is written before its query runs, so a failed fetch
/// leaves the document ending at that heading. Returns the number of issue
/// lines written.
pub async fn write_release_notes<W, S>(
    writer: &mut W,
    config: &ReleaseConfig,
    source: &S,
    endpoint: &str,
    date: &str,
) -> Result<usize>
where
    W: Write,
    S: IssueSource,
{
    writeln!(writer, "# ver {}", config.milestone)?;
    writeln!(writer, "Date: {date}")?;

    let mut written = 0;
    for label in &config.labels {
        writeln!(writer)?;
        writeln!(writer, "# {label}")?;

        let url = search::build_query_url(endpoint, &config.milestone, &config.repository, label);
        let issues = source
            .search(&url)
            .await
            .with_context(|| format!("Failed to load issues for label \"{label}\""))?;
        info!(label = label.as_str(), count = issues.len(), "fetched issues");

        for issue in &issues {
            writeln!(writer, "{}", format_issue_line(issue))?;
        }
        written += issues.len();
    }

    Ok(written)
}

/// Creates `path` (and its parent directory) fresh and writes the notes into it.
///
/// An existing file is truncated. The file is flushed and closed before returning.
pub async fn generate<S: IssueSource>(
    path: &Path,
    config: &ReleaseConfig,
    source: &S,
    endpoint: &str,
    date: &str,
) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    let file = File::create(path).context("Failed to open notes file for writing")?;
    let mut writer = BufWriter::new(file);

    let written = write_release_notes(&mut writer, config, source, endpoint, date).await?;
    writer.flush().context("Failed to write notes file")?;

    info!(path = %path.display(), issues = written, "release notes written");
    Ok(written)
}

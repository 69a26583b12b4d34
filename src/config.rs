use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Configuration keys enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    Repo,
    Milestone,
    Labels,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Repo => "repo",
            ConfigKey::Milestone => "milestone",
            ConfigKey::Labels => "labels",
        }
    }

    /// Get all config keys
    pub fn all() -> &'static [ConfigKey] {
        &[ConfigKey::Repo, ConfigKey::Milestone, ConfigKey::Labels]
    }
}

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "local_release_notes.cfg";
/// Section holding the release settings.
pub const CONFIG_SECTION: &str = "config";
/// Section whose keys every other section falls back to.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// Settings that parameterize one release-notes run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    /// Repository in `<owner>/<repo>` form.
    pub repository: String,
    pub milestone: String,
    /// Labels in the order their sections appear in the document.
    pub labels: Vec<String>,
}

type Sections = HashMap<String, HashMap<String, String>>;

/// Parses INI-style content into a map of sections to key/value pairs.
///
/// - Section names are kept as written, keys are lower-cased.
/// - Keys and values are trimmed; `=` and `:` both separate a key from its value.
/// - A `;` preceded by whitespace starts an inline comment in a value.
/// - Lines starting with `#` or `;` are comments and blank lines are skipped.
/// - An indented line following a key continues its value on a new line,
///   even across blank lines.
/// - Returns an `Err` for a pair outside any section or a line that is not a
///   header, comment, or pair.
pub fn parse_ini(content: &str) -> Result<Sections> {
    let mut sections: Sections = HashMap::new();
    let mut current: Option<String> = None;
    let mut last_key: Option<String> = None;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || raw.starts_with(['#', ';']) {
            continue;
        }

        if raw.starts_with([' ', '\t']) {
            if let (Some(section), Some(key)) = (&current, &last_key) {
                if let Some(value) = sections
                    .get_mut(section)
                    .and_then(|entries| entries.get_mut(key))
                {
                    value.push('\n');
                    value.push_str(trimmed);
                    continue;
                }
            }
            if trimmed.starts_with(['#', ';']) {
                continue;
            }
        }

        if let Some(name) = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            last_key = None;
            continue;
        }

        let Some(pos) = trimmed.find(['=', ':']) else {
            return Err(anyhow::anyhow!(
                "Line {line_no}: expected `[section]` or `key = value`, found `{trimmed}`"
            ));
        };
        let Some(section) = &current else {
            return Err(anyhow::anyhow!(
                "Line {line_no}: key/value pair appears before any section header"
            ));
        };

        let key = trimmed[..pos].trim().to_lowercase();
        let value = strip_inline_comment(trimmed[pos + 1..].trim()).to_string();
        sections
            .entry(section.clone())
            .or_default()
            .insert(key.clone(), value);
        last_key = Some(key);
    }

    Ok(sections)
}

/// Cuts a value at its first `;` when whitespace precedes it.
fn strip_inline_comment(value: &str) -> &str {
    match value.find(';') {
        Some(pos) if value[..pos].ends_with(char::is_whitespace) => value[..pos].trim_end(),
        _ => value,
    }
}

/// Splits the comma-separated label list, trimming each entry and dropping empties.
pub fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds a `ReleaseConfig` from the `[config]` section of INI content.
///
/// Every key in [`ConfigKey::all`] is required, either in `[config]` itself
/// or inherited from `[DEFAULT]`.
pub fn parse_config(content: &str) -> Result<ReleaseConfig> {
    let sections = parse_ini(content).context("Failed to parse config file")?;
    let section = sections
        .get(CONFIG_SECTION)
        .ok_or_else(|| anyhow::anyhow!("Missing [{CONFIG_SECTION}] section"))?;
    let defaults = sections.get(DEFAULT_SECTION);

    let mut values = HashMap::new();
    for key in ConfigKey::all() {
        let value = section
            .get(key.as_str())
            .or_else(|| defaults.and_then(|entries| entries.get(key.as_str())));
        let value = value.ok_or_else(|| {
            anyhow::anyhow!(
                "Missing key `{}` in [{CONFIG_SECTION}] section",
                key.as_str()
            )
        })?;
        values.insert(*key, value.as_str());
    }

    Ok(ReleaseConfig {
        repository: values[&ConfigKey::Repo].to_string(),
        milestone: values[&ConfigKey::Milestone].to_string(),
        labels: split_labels(values[&ConfigKey::Labels]),
    })
}

impl ReleaseConfig {
    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        parse_config(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

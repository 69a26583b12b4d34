use crate::github::issues::{self, GitHubIssue};
use anyhow::Result;
use tracing::debug;

/// GitHub issue search endpoint
pub const SEARCH_ISSUES: &str = "https://api.github.com/search/issues";
/// Environment variable overriding [`SEARCH_ISSUES`]
pub const API_URL_ENV: &str = "RELEASE_NOTES_API_URL";

const USER_AGENT: &str = "release-notes";

/// Builds the search URL matching issues of one milestone and label.
///
/// Spaces in the label become literal `+` and the label is quoted so the
/// search matches it as an exact phrase. Nothing else is encoded here.
pub fn build_query_url(endpoint: &str, milestone: &str, repo: &str, label: &str) -> String {
    format!(
        "{endpoint}?q=milestone:{milestone}+repo:{repo}+label:\"{}\"",
        label.replace(' ', "+")
    )
}

/// Source of search results for a fully formed query URL
#[allow(async_fn_in_trait)]
pub trait IssueSource {
    /// Return the first page of `items` for the query
    async fn search(&self, url: &str) -> Result<Vec<GitHubIssue>>;
}

/// Anonymous HTTP access to the search API
pub struct HttpIssueSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIssueSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = anyhow::Context::context(
            reqwest::Client::builder().user_agent(USER_AGENT).build(),
            "Failed to create HTTP client",
        )?;
        Ok(HttpIssueSource {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Uses `RELEASE_NOTES_API_URL` when set, the public GitHub API otherwise.
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var(API_URL_ENV).unwrap_or_else(|_| SEARCH_ISSUES.to_string());
        Self::new(endpoint)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl IssueSource for HttpIssueSource {
    async fn search(&self, url: &str) -> Result<Vec<GitHubIssue>> {
        debug!(url, "searching issues");
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("API request error: {}", response.status()));
        }

        let text = response.text().await?;
        issues::parse_search_response(&text)
    }
}

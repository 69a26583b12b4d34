use serde::Deserialize;

/// An issue returned by the search endpoint, trimmed to the fields the notes use.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct GitHubIssue {
    pub title: String,
    pub number: u64,
    #[serde(rename = "html_url")]
    pub url: String,
}

/// Struct representing the GitHub `/search/issues` API response.
#[derive(Deserialize, Debug)]
pub struct SearchResponse {
    /// First page of matching issues, in the order the API ranked them.
    pub items: Vec<GitHubIssue>,
}

/// Extracts the `items` array from a GitHub `/search/issues` JSON response string.
///
/// # Returns
///
/// * `Ok(issues)` in response order.
/// * `Err` if the body is not JSON, has no `items`, or an item lacks
///   `title`, `number`, or `html_url`.
pub fn parse_search_response(json: &str) -> anyhow::Result<Vec<GitHubIssue>> {
    let response: SearchResponse = anyhow::Context::context(
        serde_json::from_str(json),
        "Failed to parse search response",
    )?;
    Ok(response.items)
}

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{DiffSource, SourceError};

/// Represents the parsed components of a GitHub PR URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrUrl {
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
}

impl PrUrl {
    fn api_url(&self) -> String {
        format!(
            "https://api.github.com/repos/{}/{}/pulls/{}",
            self.owner, self.repo, self.pr_number
        )
    }
}

/// Parse a GitHub PR URL into its component parts.
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}
pub fn parse_pr_url(url: &str) -> Result<PrUrl, SourceError> {
    let invalid = || SourceError::InvalidUrl(url.to_string());
    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;

    if parsed.host_str() != Some("github.com") {
        return Err(invalid());
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.len() != 4 || segments[2] != "pull" {
        return Err(invalid());
    }

    let pr_number = segments[3].parse::<u64>().map_err(|_| invalid())?;

    Ok(PrUrl {
        owner: segments[0].to_string(),
        repo: segments[1].to_string(),
        pr_number,
    })
}

/// The diff of a GitHub pull request.
#[derive(Debug, Clone)]
pub struct GitHubPrSource {
    pr_url: PrUrl,
    token: Option<String>,
}

impl GitHubPrSource {
    pub fn new(pr_url: PrUrl, token: Option<String>) -> Self {
        Self { pr_url, token }
    }
}

#[async_trait]
impl DiffSource for GitHubPrSource {
    fn describe(&self) -> String {
        format!(
            "{}/{}#{}",
            self.pr_url.owner, self.pr_url.repo, self.pr_url.pr_number
        )
    }

    #[instrument(skip(self), fields(owner = %self.pr_url.owner, repo = %self.pr_url.repo, pr = self.pr_url.pr_number))]
    async fn fetch(&self) -> Result<String, SourceError> {
        let token = self.token.as_deref().ok_or(SourceError::MissingToken)?;
        let client = reqwest::Client::new();

        debug!("fetching PR diff from GitHub API");
        let diff_text = client
            .get(self.pr_url.api_url())
            .header("User-Agent", "hunk-lint")
            .header("Accept", "application/vnd.github.diff")
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(diff_bytes = diff_text.len(), "received PR diff");

        Ok(diff_text)
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// GitHub repository coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub owner: String,
    pub name: String,
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses `owner/repo` shorthand or an `https://github.com/owner/repo`
    /// URL.
    pub fn parse(input: &str) -> Result<Self> {
        if input.starts_with("https://") || input.starts_with("http://") {
            return Self::parse_url(input);
        }

        let parts: Vec<&str> = input.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            anyhow::bail!("Repository must be in format 'owner/repo', got: '{}'", input);
        }

        Ok(Self::new(parts[0], parts[1].trim_end_matches(".git")))
    }

    fn parse_url(input: &str) -> Result<Self> {
        let url = url::Url::parse(input)
            .with_context(|| format!("Failed to parse URL: '{}'", input))?;

        if url.host_str() != Some("github.com") {
            anyhow::bail!("URL must be a GitHub repository URL, got: '{}'", input);
        }

        let segments: Vec<&str> = url
            .path_segments()
            .context("Cannot parse URL path")?
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.len() < 2 {
            anyhow::bail!(
                "URL must be in format https://github.com/owner/repo, got: '{}'",
                input
            );
        }

        Ok(Self::new(segments[0], segments[1].trim_end_matches(".git")))
    }
}

impl std::fmt::Display for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Open pull request as returned by the forge.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl PullRequest {
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|label| label == name)
    }
}

/// Label delta to apply to one pull request.
///
/// `current == next` (including both absent) means no change; the planner
/// filters those out before emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelChange {
    pub number: u64,
    pub current: Option<String>,
    pub next: Option<String>,
}

/// Run configuration, built once from CLI arguments and environment and
/// threaded through the pipeline.
#[derive(Debug, Clone)]
pub struct SyncSpec {
    pub repo: Repo,
    /// Only PRs due within this many days get their label touched.
    pub window: i64,
    /// Maximum number of open PRs to scan.
    pub limit: usize,
    /// Plan only; skip the label mutations.
    pub dry_run: bool,
}

/// Result of one synchronization pass.
#[derive(Debug)]
pub struct SyncReport {
    /// Open PRs that were scanned.
    pub prs: Vec<PullRequest>,
    /// Label deltas the planner emitted.
    pub changes: Vec<LabelChange>,
    /// Number of PRs actually mutated (always 0 on a dry run).
    pub updated: usize,
}

/// How results are presented to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayMode {
    Normal,
    Quiet,
}

/// Remote forge operations the pipeline depends on.
///
/// Implemented by [`crate::GitHub`] for production use and by recording
/// mocks in the integration tests.
#[async_trait]
pub trait Forge {
    async fn fetch_open_pull_requests(&self, spec: &SyncSpec) -> Result<Vec<PullRequest>>;

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()>;

    async fn remove_label(&self, number: u64, label: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_shorthand() {
        let repo = Repo::parse("naver/d-day-labeler").unwrap();
        assert_eq!(repo.owner, "naver");
        assert_eq!(repo.name, "d-day-labeler");
    }

    #[test]
    fn parse_https_url() {
        let repo = Repo::parse("https://github.com/owner/repo").unwrap();
        assert_eq!(repo, Repo::new("owner", "repo"));
    }

    #[test]
    fn parse_url_with_git_suffix() {
        let repo = Repo::parse("https://github.com/owner/repo.git").unwrap();
        assert_eq!(repo, Repo::new("owner", "repo"));
    }

    #[test]
    fn parse_rejects_missing_owner() {
        assert!(Repo::parse("/repo").is_err());
        assert!(Repo::parse("just-a-name").is_err());
        assert!(Repo::parse("a/b/c").is_err());
    }

    #[test]
    fn parse_rejects_non_github_host() {
        assert!(Repo::parse("https://gitlab.com/owner/repo").is_err());
    }

    #[test]
    fn display_round_trips() {
        let repo = Repo::parse("owner/repo").unwrap();
        assert_eq!(repo.to_string(), "owner/repo");
    }
}

use std::process::Command;

use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;

use crate::{
    graphql::fetch_open_prs_streaming,
    types::{Forge, PullRequest, Repo, SyncSpec},
};

pub fn get_github_token() -> Result<String> {
    // Prefer environment variables over gh CLI to avoid subprocess overhead.
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        return Ok(token);
    }

    if let Ok(token) = std::env::var("GH_TOKEN") {
        return Ok(token);
    }

    let output = Command::new("gh").args(["auth", "token"]).output()?;

    if !output.status.success() {
        anyhow::bail!("Failed to get GitHub token from gh CLI. Please run 'gh auth login' first");
    }

    let token = String::from_utf8(output.stdout)?.trim().to_string();

    if token.is_empty() {
        anyhow::bail!("Empty token returned from gh CLI");
    }

    Ok(token)
}

/// Creates an authenticated GitHub client using available credentials.
pub async fn setup_github_client() -> Result<Octocrab> {
    let token = get_github_token().context("Failed to obtain GitHub authentication token")?;
    Octocrab::builder()
        .personal_token(token)
        .build()
        .context("Failed to create GitHub client")
}

/// GitHub-backed [`Forge`] implementation, bound to one repository.
pub struct GitHub {
    octocrab: Octocrab,
    repo: Repo,
}

impl GitHub {
    pub fn new(octocrab: Octocrab, repo: Repo) -> Self {
        Self { octocrab, repo }
    }

    /// Builds an authenticated client bound to `repo`.
    pub async fn connect(repo: Repo) -> Result<Self> {
        Ok(Self::new(setup_github_client().await?, repo))
    }
}

#[async_trait]
impl Forge for GitHub {
    async fn fetch_open_pull_requests(&self, spec: &SyncSpec) -> Result<Vec<PullRequest>> {
        fetch_open_prs_streaming(&self.octocrab, &self.repo, spec.limit)
            .await
            .with_context(|| format!("Failed to list open pull requests for {}", self.repo))
    }

    async fn add_labels(&self, number: u64, labels: &[String]) -> Result<()> {
        self.octocrab
            .issues(self.repo.owner.as_str(), self.repo.name.as_str())
            .add_labels(number, labels)
            .await
            .with_context(|| format!("Failed to add labels to PR #{number}"))?;
        Ok(())
    }

    async fn remove_label(&self, number: u64, label: &str) -> Result<()> {
        self.octocrab
            .issues(self.repo.owner.as_str(), self.repo.name.as_str())
            .remove_label(number, label)
            .await
            .with_context(|| format!("Failed to remove label '{label}' from PR #{number}"))?;
        Ok(())
    }
}

impl std::fmt::Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

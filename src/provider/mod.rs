pub mod gitea;
pub mod github;
pub mod local;
pub mod types;
mod wire;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub use gitea::GiteaProvider;
pub use github::GithubProvider;
pub use local::GitProvider;
pub use types::{CommitInfo, Platform, PullRequestInfo, PullRequestStatus, TagInfo};

/// Source of tags, pull requests and commits for one hosting platform.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Tags ordered newest first, at most `max_count` of them.
    async fn get_tags(&self, owner: &str, repo: &str, max_count: usize) -> Result<Vec<TagInfo>>;

    /// Fill in the creation date (and annotation where the host exposes it).
    async fn fill_tag_information(
        &self,
        repository_path: &Path,
        owner: &str,
        repo: &str,
        tag: TagInfo,
    ) -> Result<TagInfo>;

    async fn get_tag_annotation(&self, tag_name: &str) -> Result<Option<String>>;

    async fn get_for_commit_hash(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        max_count: usize,
    ) -> Result<Vec<PullRequestInfo>>;

    /// Merged pull requests whose merge date lies strictly between the bounds.
    async fn get_between_dates(
        &self,
        owner: &str,
        repo: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_count: usize,
    ) -> Result<Vec<PullRequestInfo>>;

    async fn get_open(&self, owner: &str, repo: &str, max_count: usize)
        -> Result<Vec<PullRequestInfo>>;

    /// Commits after `base` (exclusive) up to `head` (inclusive).
    async fn get_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommitInfo>>;
}

pub fn create_provider(
    platform: Platform,
    token: Option<String>,
    base_url: Option<String>,
    repository_path: PathBuf,
) -> Result<Box<dyn Provider>> {
    let provider: Box<dyn Provider> = match platform {
        Platform::Github => Box::new(GithubProvider::new(
            token.unwrap_or_default(),
            base_url,
            repository_path,
        )?),
        Platform::Gitea => Box::new(GiteaProvider::new(
            token.unwrap_or_default(),
            base_url,
            repository_path,
        )?),
        Platform::Local | Platform::Git => Box::new(GitProvider::new(repository_path)),
    };

    Ok(provider)
}

/// Shared by the hosted providers: the git checkout knows when a tag was created
/// even when the host has no release for it.
pub(crate) async fn fill_date_from_git(
    repository: &crate::git::GitRepository,
    mut tag: TagInfo,
) -> TagInfo {
    match repository.tag_creation_time(&tag.name).await {
        Ok(Some(date)) => {
            tracing::info!("ℹ️ Resolved tag creation time from git: {}", date.to_rfc3339());
            tag.date = Some(date);
        }
        Ok(None) => {
            tracing::warn!("⚠️ Tag {} not found in local checkout", tag.name);
        }
        Err(e) => {
            tracing::warn!("⚠️ Could not retrieve tag creation time via git: {}", e);
        }
    }
    tag
}

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use super::types::{CommitInfo, PullRequestInfo, TagInfo};
use super::{fill_date_from_git, Provider};
use crate::git::GitRepository;

const NO_PULL_REQUESTS: &str =
    "PR mode is not supported for local git repositories. Use COMMIT mode instead.";

/// Reads everything from a local checkout; there is no pull request concept here.
pub struct GitProvider {
    repository: GitRepository,
}

impl GitProvider {
    pub fn new(repository_path: PathBuf) -> Self {
        Self {
            repository: GitRepository::new(repository_path),
        }
    }
}

#[async_trait]
impl Provider for GitProvider {
    async fn get_tags(&self, _owner: &str, _repo: &str, max_count: usize) -> Result<Vec<TagInfo>> {
        self.repository.list_tags(max_count).await
    }

    async fn fill_tag_information(
        &self,
        repository_path: &Path,
        _owner: &str,
        _repo: &str,
        tag: TagInfo,
    ) -> Result<TagInfo> {
        let repository = GitRepository::new(repository_path);
        Ok(fill_date_from_git(&repository, tag).await)
    }

    async fn get_tag_annotation(&self, tag_name: &str) -> Result<Option<String>> {
        self.repository.tag_annotation(tag_name).await
    }

    async fn get_for_commit_hash(
        &self,
        _owner: &str,
        _repo: &str,
        _commit_sha: &str,
        _max_count: usize,
    ) -> Result<Vec<PullRequestInfo>> {
        bail!(NO_PULL_REQUESTS)
    }

    async fn get_between_dates(
        &self,
        _owner: &str,
        _repo: &str,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        _max_count: usize,
    ) -> Result<Vec<PullRequestInfo>> {
        bail!(NO_PULL_REQUESTS)
    }

    async fn get_open(&self, _owner: &str, _repo: &str, _max_count: usize) -> Result<Vec<PullRequestInfo>> {
        bail!(NO_PULL_REQUESTS)
    }

    async fn get_commits(
        &self,
        _owner: &str,
        _repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommitInfo>> {
        self.repository.log(base, head).await
    }
}

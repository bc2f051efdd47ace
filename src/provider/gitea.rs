use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::{CommitInfo, PullRequestInfo, PullRequestStatus, TagInfo};
use super::wire::ApiPullRequest;
use super::{fill_date_from_git, Provider};
use crate::git::GitRepository;

pub const DEFAULT_GITEA_URL: &str = "https://gitea.com";
const PAGE_LIMIT: usize = 50;
const USER_AGENT: &str = concat!("release-changelog-builder/", env!("CARGO_PKG_VERSION"));

pub struct GiteaProvider {
    client: Client,
    token: String,
    home_url: String,
    repository: GitRepository,
}

#[derive(Debug, Deserialize)]
struct ApiTag {
    #[serde(default)]
    name: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    commit: Option<ApiTagCommit>,
}

#[derive(Debug, Deserialize)]
struct ApiTagCommit {
    #[serde(default)]
    sha: String,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
}

impl GiteaProvider {
    pub fn new(token: String, base_url: Option<String>, repository_path: PathBuf) -> Result<Self> {
        let base = base_url.unwrap_or_else(|| DEFAULT_GITEA_URL.to_string());
        let home_url = base
            .trim_end_matches('/')
            .trim_end_matches("/api/v1")
            .to_string();

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token,
            home_url,
            repository: GitRepository::new(repository_path),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.home_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Option<T>> {
        let mut request = self.client.get(self.api_url(path)).query(query);
        if !self.token.is_empty() {
            request = request.header("Authorization", format!("token {}", self.token));
        }

        let resp = request
            .send()
            .await
            .with_context(|| format!("Gitea API request failed: {}", path))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gitea API error {} for {}: {}", status, path, body);
        }

        let data = resp
            .json()
            .await
            .with_context(|| format!("failed to parse Gitea response for {}", path))?;
        Ok(Some(data))
    }

    async fn list_pulls(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        max_count: usize,
        mut keep: impl FnMut(ApiPullRequest) -> Option<PullRequestInfo> + Send,
    ) -> Result<Vec<PullRequestInfo>> {
        let path = format!("/repos/{}/{}/pulls", owner, repo);
        let mut prs = Vec::new();
        let mut page = 1usize;

        while prs.len() < max_count {
            let query = [
                ("state", state.to_string()),
                ("page", page.to_string()),
                ("limit", PAGE_LIMIT.to_string()),
            ];
            let items: Vec<ApiPullRequest> = self.get_json(&path, &query).await?.unwrap_or_default();

            let fetched = items.len();
            if fetched == 0 {
                break;
            }

            prs.extend(items.into_iter().filter_map(&mut keep));

            if fetched < PAGE_LIMIT {
                break;
            }
            page += 1;
        }

        prs.truncate(max_count);
        Ok(prs)
    }
}

#[async_trait]
impl Provider for GiteaProvider {
    async fn get_tags(&self, owner: &str, repo: &str, max_count: usize) -> Result<Vec<TagInfo>> {
        let path = format!("/repos/{}/{}/tags", owner, repo);
        let mut tags = Vec::new();
        let mut page = 1usize;

        while tags.len() < max_count {
            let query = [("page", page.to_string()), ("limit", PAGE_LIMIT.to_string())];
            let items: Vec<ApiTag> = self.get_json(&path, &query).await?.unwrap_or_default();

            let fetched = items.len();
            if fetched == 0 {
                break;
            }

            tags.extend(items.into_iter().map(|tag| {
                let sha = tag.commit.map(|c| c.sha).unwrap_or_default();
                TagInfo::new(tag.name, sha)
            }));

            if fetched < PAGE_LIMIT {
                break;
            }
            page += 1;
        }

        // Pages are offset by a fixed limit, so the last one may overshoot.
        tags.truncate(max_count);
        debug!("Fetched {} tags from Gitea", tags.len());
        Ok(tags)
    }

    async fn fill_tag_information(
        &self,
        repository_path: &Path,
        owner: &str,
        repo: &str,
        mut tag: TagInfo,
    ) -> Result<TagInfo> {
        let path = format!("/repos/{}/{}/tags/{}", owner, repo, tag.name);
        let detail = match self.get_json::<ApiTag>(&path, &[]).await {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Failed to fetch tag {} from Gitea: {}", tag.name, e);
                None
            }
        };

        if let Some(detail) = detail {
            let message = detail.message.map(|m| m.trim().to_string());
            if let Some(message) = message.filter(|m| !m.is_empty()) {
                tag.annotation = Some(message);
            }
            if let Some(created) = detail.commit.and_then(|c| c.created) {
                tag.date = Some(created);
                info!("ℹ️ Retrieved tag information for {} from Gitea API", tag.name);
                return Ok(tag);
            }
        }

        let repository = GitRepository::new(repository_path);
        Ok(fill_date_from_git(&repository, tag).await)
    }

    async fn get_tag_annotation(&self, tag_name: &str) -> Result<Option<String>> {
        self.repository.tag_annotation(tag_name).await
    }

    async fn get_for_commit_hash(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        max_count: usize,
    ) -> Result<Vec<PullRequestInfo>> {
        // No commit-to-PR endpoint; scan every PR for a matching merge or head sha.
        let result = self
            .list_pulls(owner, repo, "all", usize::MAX, |pr| {
                let matches = pr.merge_commit_sha.as_deref() == Some(commit_sha)
                    || pr.head_sha() == Some(commit_sha);
                if !matches {
                    return None;
                }
                let status = if pr.merged_at.is_some() {
                    PullRequestStatus::Merged
                } else {
                    PullRequestStatus::Open
                };
                Some(pr.into_pull_request(status))
            })
            .await;

        match result {
            Ok(mut prs) => {
                prs.truncate(max_count);
                Ok(prs)
            }
            Err(e) => {
                warn!("Failed to get PRs for commit {}: {}", commit_sha, e);
                Ok(Vec::new())
            }
        }
    }

    async fn get_between_dates(
        &self,
        owner: &str,
        repo: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_count: usize,
    ) -> Result<Vec<PullRequestInfo>> {
        self.list_pulls(owner, repo, "closed", max_count, |pr| {
            if pr.merged_within(from, to) {
                Some(pr.into_pull_request(PullRequestStatus::Merged))
            } else {
                None
            }
        })
        .await
    }

    async fn get_open(&self, owner: &str, repo: &str, max_count: usize) -> Result<Vec<PullRequestInfo>> {
        self.list_pulls(owner, repo, "open", max_count, |pr| {
            Some(pr.into_pull_request(PullRequestStatus::Open))
        })
        .await
    }

    async fn get_commits(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommitInfo>> {
        // Gitea's compare API is not available on every version; the checkout is.
        let mut commits = self.repository.log(base, head).await?;
        for commit in &mut commits {
            commit.html_url = format!("{}/{}/{}/commit/{}", self.home_url, owner, repo, commit.sha);
        }
        Ok(commits)
    }
}

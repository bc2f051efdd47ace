use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::types::{CommitInfo, PullRequestInfo, PullRequestStatus, TagInfo};
use super::wire::ApiPullRequest;
use super::{fill_date_from_git, Provider};
use crate::git::GitRepository;

const PER_PAGE: usize = 100;

pub struct GithubProvider {
    client: Octocrab,
    repository: GitRepository,
}

#[derive(Debug, Deserialize)]
struct ApiComparison {
    #[serde(default)]
    commits: Vec<ApiCommit>,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    author: Option<ApiCommitUser>,
    commit: ApiCommitData,
}

#[derive(Debug, Deserialize)]
struct ApiCommitUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiCommitData {
    #[serde(default)]
    message: String,
    #[serde(default)]
    author: Option<ApiGitAuthor>,
}

#[derive(Debug, Deserialize)]
struct ApiGitAuthor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl GithubProvider {
    pub fn new(token: String, base_url: Option<String>, repository_path: PathBuf) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(url) = base_url.as_deref() {
            builder = builder
                .base_uri(url)
                .with_context(|| format!("invalid GitHub API URL: {}", url))?;
        }
        let client = builder.personal_token(token).build()?;

        Ok(Self {
            client,
            repository: GitRepository::new(repository_path),
        })
    }

    async fn list_pulls(
        &self,
        owner: &str,
        repo: &str,
        state: &str,
        max_count: usize,
        mut keep: impl FnMut(ApiPullRequest) -> Option<PullRequestInfo> + Send,
    ) -> Result<Vec<PullRequestInfo>> {
        let route = format!("/repos/{}/{}/pulls", owner, repo);
        let mut prs = Vec::new();
        let mut page = 1u32;

        while prs.len() < max_count {
            let params = [
                ("state", state.to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let items: Vec<ApiPullRequest> = self
                .client
                .get(&route, Some(&params))
                .await
                .with_context(|| format!("failed to list {} pull requests for {}/{}", state, owner, repo))?;

            let fetched = items.len();
            if fetched == 0 {
                break;
            }

            prs.extend(items.into_iter().filter_map(&mut keep));

            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        prs.truncate(max_count);
        Ok(prs)
    }
}

#[async_trait]
impl Provider for GithubProvider {
    async fn get_tags(&self, owner: &str, repo: &str, max_count: usize) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();
        let mut page = 1u32;

        while tags.len() < max_count {
            let response = self
                .client
                .repos(owner, repo)
                .list_tags()
                .per_page(PER_PAGE as u8)
                .page(page)
                .send()
                .await
                .with_context(|| format!("failed to list tags for {}/{}", owner, repo))?;

            let fetched = response.items.len();
            if fetched == 0 {
                break;
            }

            tags.extend(
                response
                    .items
                    .into_iter()
                    .map(|tag| TagInfo::new(tag.name, tag.commit.sha)),
            );

            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        // Pages are offset by a fixed size, so the last one may overshoot.
        tags.truncate(max_count);
        debug!("Fetched {} tags from GitHub", tags.len());
        Ok(tags)
    }

    async fn fill_tag_information(
        &self,
        repository_path: &Path,
        owner: &str,
        repo: &str,
        mut tag: TagInfo,
    ) -> Result<TagInfo> {
        let result = self
            .client
            .repos(owner, repo)
            .releases()
            .get_by_tag(&tag.name)
            .await;

        match result {
            Ok(release) if release.created_at.is_some() => {
                tag.date = release.created_at;
                info!("ℹ️ Retrieved release information for {} from GitHub API", tag.name);
                Ok(tag)
            }
            Ok(_) | Err(_) => {
                info!("⚠️ No release found for {}, trying git fallback", tag.name);
                let repository = GitRepository::new(repository_path);
                Ok(fill_date_from_git(&repository, tag).await)
            }
        }
    }

    async fn get_tag_annotation(&self, tag_name: &str) -> Result<Option<String>> {
        // The REST API only exposes annotations through the git data endpoints,
        // which need the tag object sha; the checkout already has it.
        self.repository.tag_annotation(tag_name).await
    }

    async fn get_for_commit_hash(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        max_count: usize,
    ) -> Result<Vec<PullRequestInfo>> {
        let route = format!("/repos/{}/{}/commits/{}/pulls", owner, repo, commit_sha);
        let params = [("per_page", PER_PAGE.min(max_count).to_string())];

        let items: Vec<ApiPullRequest> = match self.client.get(&route, Some(&params)).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to get PRs for commit {}: {}", commit_sha, e);
                return Ok(Vec::new());
            }
        };

        Ok(items
            .into_iter()
            .take(max_count)
            .map(|pr| {
                let status = if pr.merged_at.is_some() {
                    PullRequestStatus::Merged
                } else {
                    PullRequestStatus::Open
                };
                pr.into_pull_request(status)
            })
            .collect())
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
        let route = format!("/repos/{}/{}/compare/{}...{}", owner, repo, base, head);
        let mut commits = Vec::new();
        let mut page = 1u32;

        loop {
            let params = [
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let comparison: ApiComparison = self
                .client
                .get(&route, Some(&params))
                .await
                .with_context(|| format!("failed to compare {}...{}", base, head))?;

            let fetched = comparison.commits.len();
            commits.extend(comparison.commits.into_iter().map(|commit| {
                let author = commit.commit.author;
                let author_name = author.as_ref().map(|a| a.name.clone()).unwrap_or_default();
                CommitInfo {
                    sha: commit.sha,
                    message: commit.commit.message,
                    author: commit
                        .author
                        .map(|a| a.login)
                        .unwrap_or_else(|| author_name.clone()),
                    author_name,
                    date: author.and_then(|a| a.date).unwrap_or_else(Utc::now),
                    html_url: commit.html_url,
                }
            }));

            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        debug!("Fetched {} commits between {} and {}", commits.len(), base, head);
        Ok(commits)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ChangelogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Github,
    Gitea,
    Local,
    Git,
}

impl Platform {
    /// `local` and `git` both mean a checkout driven through the git binary.
    pub fn is_local(self) -> bool {
        matches!(self, Platform::Local | Platform::Git)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Github => write!(f, "github"),
            Platform::Gitea => write!(f, "gitea"),
            Platform::Local => write!(f, "local"),
            Platform::Git => write!(f, "git"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "github" => Ok(Platform::Github),
            "gitea" => Ok(Platform::Gitea),
            "local" => Ok(Platform::Local),
            "git" => Ok(Platform::Git),
            other => Err(ChangelogError::UnsupportedPlatform(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub name: String,
    pub sha: String,
    pub date: Option<DateTime<Utc>>,
    pub annotation: Option<String>,
}

impl TagInfo {
    pub fn new(name: impl Into<String>, sha: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha: sha.into(),
            date: None,
            annotation: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestStatus {
    Open,
    Merged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    pub base_branch: String,
    pub branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub merge_commit_sha: String,
    pub author: String,
    pub author_name: String,
    pub repo_name: String,
    /// Always lowercase; see [`PullRequestInfo::set_labels`].
    pub labels: Vec<String>,
    pub milestone: String,
    pub body: String,
    pub assignees: Vec<String>,
    pub requested_reviewers: Vec<String>,
    pub approved_reviewers: Vec<String>,
    pub status: PullRequestStatus,
}

impl PullRequestInfo {
    pub fn set_labels<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.labels = labels
            .into_iter()
            .map(|label| label.as_ref().to_lowercase())
            .collect();
    }

    pub fn from_commit(commit: CommitInfo, owner: &str, repo: &str) -> Self {
        let title = commit.message.lines().next().unwrap_or("").to_string();

        Self {
            number: 0,
            title,
            html_url: commit.html_url,
            base_branch: String::new(),
            branch: None,
            created_at: commit.date,
            merged_at: Some(commit.date),
            merge_commit_sha: commit.sha,
            author: commit.author,
            author_name: commit.author_name,
            repo_name: format!("{}/{}", owner, repo),
            labels: Vec::new(),
            milestone: String::new(),
            body: commit.message,
            assignees: Vec::new(),
            requested_reviewers: Vec::new(),
            approved_reviewers: Vec::new(),
            status: PullRequestStatus::Merged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    /// Login where the host knows it, otherwise the author email.
    pub author: String,
    pub author_name: String,
    pub date: DateTime<Utc>,
    pub html_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn commit_maps_to_merged_entry_without_number() {
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let commit = CommitInfo {
            sha: "abc123".to_string(),
            message: "Fix parser\n\nLonger explanation".to_string(),
            author: "dev@example.com".to_string(),
            author_name: "Dev".to_string(),
            date,
            html_url: "https://example.com/commit/abc123".to_string(),
        };

        let pr = PullRequestInfo::from_commit(commit, "octo", "tool");

        assert_eq!(pr.number, 0);
        assert_eq!(pr.title, "Fix parser");
        assert_eq!(pr.body, "Fix parser\n\nLonger explanation");
        assert_eq!(pr.merge_commit_sha, "abc123");
        assert_eq!(pr.merged_at, Some(date));
        assert_eq!(pr.repo_name, "octo/tool");
        assert_eq!(pr.status, PullRequestStatus::Merged);
        assert!(pr.branch.is_none());
        assert!(pr.labels.is_empty());
    }

    #[test]
    fn platform_parses_known_names() {
        assert_eq!("gitea".parse::<Platform>().unwrap(), Platform::Gitea);
        assert!("git".parse::<Platform>().unwrap().is_local());
        assert!(matches!(
            "bitbucket".parse::<Platform>(),
            Err(ChangelogError::UnsupportedPlatform(_))
        ));
    }
}

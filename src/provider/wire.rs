//! JSON shapes shared by the GitHub and Gitea REST APIs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{PullRequestInfo, PullRequestStatus};

#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiLabel {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiMilestone {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiRepository {
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiBranch {
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub repo: Option<ApiRepository>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub base: Option<ApiBranch>,
    #[serde(default)]
    pub head: Option<ApiBranch>,
    pub created_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    #[serde(default)]
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub labels: Option<Vec<ApiLabel>>,
    #[serde(default)]
    pub milestone: Option<ApiMilestone>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assignees: Option<Vec<ApiUser>>,
    #[serde(default)]
    pub requested_reviewers: Option<Vec<ApiUser>>,
}

impl ApiPullRequest {
    pub fn into_pull_request(self, status: PullRequestStatus) -> PullRequestInfo {
        let (base_branch, repo_name) = match self.base {
            Some(base) => (base.ref_name, base.repo.map(|r| r.full_name).unwrap_or_default()),
            None => (String::new(), String::new()),
        };
        let (author, author_name) = match self.user {
            Some(user) => {
                let name = user
                    .full_name
                    .or(user.name)
                    .filter(|n| !n.is_empty())
                    .unwrap_or_else(|| user.login.clone());
                (user.login, name)
            }
            None => (String::new(), String::new()),
        };

        let mut pr = PullRequestInfo {
            number: self.number,
            title: self.title,
            html_url: self.html_url,
            base_branch,
            branch: self.head.map(|h| h.ref_name).filter(|b| !b.is_empty()),
            created_at: self.created_at.unwrap_or_else(Utc::now),
            merged_at: self.merged_at,
            merge_commit_sha: self.merge_commit_sha.unwrap_or_default(),
            author,
            author_name,
            repo_name,
            labels: Vec::new(),
            milestone: self.milestone.map(|m| m.title).unwrap_or_default(),
            body: self.body.unwrap_or_default(),
            assignees: logins(self.assignees),
            requested_reviewers: logins(self.requested_reviewers),
            approved_reviewers: Vec::new(),
            status,
        };
        pr.set_labels(self.labels.unwrap_or_default().iter().map(|l| l.name.as_str()));
        pr
    }

    pub fn merged_within(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        matches!(self.merged_at, Some(merged) if merged > from && merged < to)
    }

    pub fn head_sha(&self) -> Option<&str> {
        self.head.as_ref().and_then(|h| h.sha.as_deref())
    }
}

fn logins(users: Option<Vec<ApiUser>>) -> Vec<String> {
    users
        .unwrap_or_default()
        .into_iter()
        .map(|u| u.login)
        .filter(|login| !login.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_pull_request_payload() {
        let payload = serde_json::json!({
            "number": 42,
            "title": "Add parser",
            "html_url": "https://github.com/o/r/pull/42",
            "base": { "ref": "main", "repo": { "full_name": "o/r" } },
            "head": { "ref": "feature/parser", "sha": "deadbeef" },
            "created_at": "2026-01-01T00:00:00Z",
            "merged_at": "2026-01-03T00:00:00Z",
            "merge_commit_sha": "cafe",
            "user": { "login": "alice", "full_name": "Alice A" },
            "labels": [{ "name": "Feature" }, { "name": "BUG" }],
            "milestone": { "title": "1.0" },
            "body": null,
            "assignees": [{ "login": "bob" }]
        });

        let api: ApiPullRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(api.head_sha(), Some("deadbeef"));
        let pr = api.into_pull_request(PullRequestStatus::Merged);

        assert_eq!(pr.number, 42);
        assert_eq!(pr.base_branch, "main");
        assert_eq!(pr.branch.as_deref(), Some("feature/parser"));
        assert_eq!(pr.repo_name, "o/r");
        assert_eq!(pr.author, "alice");
        assert_eq!(pr.author_name, "Alice A");
        assert_eq!(pr.labels, vec!["feature", "bug"]);
        assert_eq!(pr.milestone, "1.0");
        assert_eq!(pr.body, "");
        assert_eq!(pr.assignees, vec!["bob"]);
        assert!(pr.requested_reviewers.is_empty());
    }
}

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use release_changelog_builder::provider::{
    CommitInfo, Provider, PullRequestInfo, PullRequestStatus, TagInfo,
};

pub fn date(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, day, 12, 0, 0).unwrap()
}

/// Tags named newest first; each is an hour older than the one before.
pub fn tags(names: &[&str]) -> Vec<TagInfo> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            TagInfo::new(*name, format!("sha-{name}")).with_date(date(28) - Duration::hours(i as i64))
        })
        .collect()
}

pub fn pull_request(number: u64, title: &str, author: &str, labels: &[&str]) -> PullRequestInfo {
    let commit = CommitInfo {
        sha: format!("merge-{number}"),
        message: title.to_string(),
        author: author.to_string(),
        author_name: author.to_string(),
        date: date(10),
        html_url: format!("https://github.com/octo/widgets/pull/{number}"),
    };
    let mut pr = PullRequestInfo::from_commit(commit, "octo", "widgets");
    pr.number = number;
    pr.base_branch = "main".to_string();
    pr.branch = Some(format!("feature/{number}"));
    pr.set_labels(labels);
    pr
}

pub fn commit(sha: &str, message: &str, author: &str) -> CommitInfo {
    CommitInfo {
        sha: sha.to_string(),
        message: message.to_string(),
        author: author.to_string(),
        author_name: author.to_string(),
        date: date(12),
        html_url: format!("https://github.com/octo/widgets/commit/{sha}"),
    }
}

/// In-memory provider returning scripted data and counting calls.
#[derive(Default)]
pub struct MockProvider {
    pub tags: Vec<TagInfo>,
    pub merged: Vec<PullRequestInfo>,
    pub open: Vec<PullRequestInfo>,
    pub commits: Vec<CommitInfo>,
    pub annotation: Option<String>,
    pub tag_calls: AtomicUsize,
    pub pull_request_calls: AtomicUsize,
    pub commit_calls: AtomicUsize,
    pub date_windows: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
}

impl MockProvider {
    pub fn with_tags(names: &[&str]) -> Self {
        Self {
            tags: tags(names),
            ..Default::default()
        }
    }

    pub fn tag_calls(&self) -> usize {
        self.tag_calls.load(Ordering::SeqCst)
    }

    pub fn pull_request_calls(&self) -> usize {
        self.pull_request_calls.load(Ordering::SeqCst)
    }

    pub fn commit_calls(&self) -> usize {
        self.commit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn get_tags(&self, _owner: &str, _repo: &str, max_count: usize) -> Result<Vec<TagInfo>> {
        self.tag_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tags.iter().take(max_count).cloned().collect())
    }

    async fn fill_tag_information(
        &self,
        _repository_path: &Path,
        _owner: &str,
        _repo: &str,
        tag: TagInfo,
    ) -> Result<TagInfo> {
        Ok(tag)
    }

    async fn get_tag_annotation(&self, _tag_name: &str) -> Result<Option<String>> {
        Ok(self.annotation.clone())
    }

    async fn get_for_commit_hash(
        &self,
        _owner: &str,
        _repo: &str,
        commit_sha: &str,
        _max_count: usize,
    ) -> Result<Vec<PullRequestInfo>> {
        self.pull_request_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .merged
            .iter()
            .filter(|pr| pr.merge_commit_sha == commit_sha)
            .cloned()
            .collect())
    }

    async fn get_between_dates(
        &self,
        _owner: &str,
        _repo: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        max_count: usize,
    ) -> Result<Vec<PullRequestInfo>> {
        self.pull_request_calls.fetch_add(1, Ordering::SeqCst);
        self.date_windows.lock().unwrap().push((from, to));
        Ok(self.merged.iter().take(max_count).cloned().collect())
    }

    async fn get_open(&self, _owner: &str, _repo: &str, max_count: usize) -> Result<Vec<PullRequestInfo>> {
        self.pull_request_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .open
            .iter()
            .take(max_count)
            .cloned()
            .map(|mut pr| {
                pr.status = PullRequestStatus::Open;
                pr.merged_at = None;
                pr
            })
            .collect())
    }

    async fn get_commits(
        &self,
        _owner: &str,
        _repo: &str,
        _base: &str,
        _head: &str,
    ) -> Result<Vec<CommitInfo>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.commits.clone())
    }
}

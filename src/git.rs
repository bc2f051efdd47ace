//! Thin async wrapper over the `git` binary for a checked-out repository.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

use crate::provider::types::{CommitInfo, TagInfo};

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';

#[derive(Debug, Clone)]
pub struct GitRepository {
    path: PathBuf,
}

impl GitRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .await
            .with_context(|| format!("failed to run git {}", args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("git {} failed: {}", args.join(" "), stderr.trim());
            bail!("git {} exited with {}: {}", args.join(" "), output.status, stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Tags sorted by creator date, newest first.
    pub async fn list_tags(&self, max_count: usize) -> Result<Vec<TagInfo>> {
        let count = format!("--count={}", max_count);
        let output = self
            .run(&[
                "for-each-ref",
                "--sort=-creatordate",
                &count,
                "--format=%(refname:strip=2)%1f%(objectname)%1f%(*objectname)",
                "refs/tags",
            ])
            .await?;

        Ok(parse_tag_list(&output))
    }

    /// `git tag --list` matches the name exactly; `for-each-ref` would also
    /// match tags nested below it, such as `release/1.0` for `release`.
    pub async fn tag_creation_time(&self, tag: &str) -> Result<Option<DateTime<Utc>>> {
        let output = self
            .run(&["tag", "--list", "--format=%(creatordate:iso-strict)", "--", tag])
            .await?;

        let raw = output.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        let date = DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("unexpected creator date for {}: {}", tag, raw))?;
        Ok(Some(date.with_timezone(&Utc)))
    }

    /// Message of an annotated tag; lightweight tags have none.
    pub async fn tag_annotation(&self, tag: &str) -> Result<Option<String>> {
        let output = self
            .run(&["tag", "--list", "--format=%(objecttype)%1f%(contents)", "--", tag])
            .await?;

        Ok(parse_tag_annotation(&output))
    }

    /// Commits reachable from `head` but not from `base`.
    pub async fn log(&self, base: &str, head: &str) -> Result<Vec<CommitInfo>> {
        let range = format!("{}..{}", base, head);
        let output = self
            .run(&[
                "log",
                "--format=%H%x1f%an%x1f%ae%x1f%aI%x1f%B%x1e",
                &range,
            ])
            .await?;

        parse_log(&output)
    }

    pub async fn remote_origin_url(&self) -> Option<String> {
        match self.run(&["config", "--get", "remote.origin.url"]).await {
            Ok(url) if !url.trim().is_empty() => Some(url.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                debug!("No remote origin configured: {}", e);
                None
            }
        }
    }
}

fn parse_tag_list(output: &str) -> Vec<TagInfo> {
    output
        .lines()
        .filter_map(|line| {
            let mut fields = line.split(FIELD_SEPARATOR);
            let name = fields.next()?.trim();
            let object = fields.next().unwrap_or("").trim();
            let peeled = fields.next().unwrap_or("").trim();
            if name.is_empty() {
                return None;
            }
            // Annotated tags point at a tag object; the peeled sha is the commit.
            let sha = if peeled.is_empty() { object } else { peeled };
            Some(TagInfo::new(name, sha))
        })
        .collect()
}

fn parse_tag_annotation(output: &str) -> Option<String> {
    let (object_type, contents) = output.split_once(FIELD_SEPARATOR)?;
    if object_type.trim() != "tag" {
        return None;
    }

    let message = contents.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

fn parse_log(output: &str) -> Result<Vec<CommitInfo>> {
    let mut commits = Vec::new();

    for record in output.split(RECORD_SEPARATOR) {
        let record = record.trim_start_matches('\n');
        if record.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = record.splitn(5, FIELD_SEPARATOR).collect();
        if fields.len() < 5 {
            debug!("Skipping malformed log record: {:?}", record);
            continue;
        }

        let date = DateTime::parse_from_rfc3339(fields[3].trim())
            .with_context(|| format!("unexpected author date in commit {}", fields[0]))?
            .with_timezone(&Utc);

        commits.push(CommitInfo {
            sha: fields[0].trim().to_string(),
            message: fields[4].trim_end().to_string(),
            author: fields[2].trim().to_string(),
            author_name: fields[1].trim().to_string(),
            date,
            html_url: String::new(),
        });
    }

    Ok(commits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn git(dir: &Path, args: &[&str]) {
        let status = std::process::Command::new("git")
            .args(["-c", "user.name=Dev", "-c", "user.email=dev@example.com"])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success(), "git {:?} failed", args);
    }

    #[tokio::test]
    async fn tag_lookups_ignore_nested_tags() {
        let dir = tempfile::tempdir().unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["commit", "-q", "--allow-empty", "-m", "initial"]);
        git(dir.path(), &["tag", "-a", "release/1.0", "-m", "First"]);
        git(dir.path(), &["tag", "-a", "release/2.0", "-m", "Second"]);
        git(dir.path(), &["tag", "-a", "v1.0", "-m", "Version one"]);

        let repository = GitRepository::new(dir.path());

        assert_eq!(repository.tag_annotation("release").await.unwrap(), None);
        assert_eq!(repository.tag_creation_time("release").await.unwrap(), None);
        assert_eq!(
            repository.tag_annotation("release/2.0").await.unwrap().as_deref(),
            Some("Second")
        );
        assert_eq!(
            repository.tag_annotation("v1.0").await.unwrap().as_deref(),
            Some("Version one")
        );
        assert!(repository.tag_creation_time("v1.0").await.unwrap().is_some());
    }

    #[test]
    fn tag_list_prefers_peeled_commit() {
        let output = "v2.0.0\u{1f}tagobj\u{1f}commit2\nv1.0.0\u{1f}commit1\u{1f}\n";
        let tags = parse_tag_list(output);

        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "v2.0.0");
        assert_eq!(tags[0].sha, "commit2");
        assert_eq!(tags[1].sha, "commit1");
        assert!(tags.iter().all(|t| t.date.is_none()));
    }

    #[test]
    fn lightweight_tag_has_no_annotation() {
        assert_eq!(parse_tag_annotation("commit\u{1f}Fix parser\n"), None);
        assert_eq!(
            parse_tag_annotation("tag\u{1f}Release 1.0\n\nHighlights\n"),
            Some("Release 1.0\n\nHighlights".to_string())
        );
        assert_eq!(parse_tag_annotation(""), None);
    }

    #[test]
    fn log_records_keep_full_message() {
        let output = "aaa\u{1f}Alice\u{1f}alice@example.com\u{1f}2026-01-02T10:00:00+01:00\u{1f}Add X\n\nDetails\n\u{1e}\n\
                      bbb\u{1f}Bob\u{1f}bob@example.com\u{1f}2026-01-01T09:00:00Z\u{1f}Fix Y\n\u{1e}\n";
        let commits = parse_log(output).unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].sha, "aaa");
        assert_eq!(commits[0].message, "Add X\n\nDetails");
        assert_eq!(commits[0].author, "alice@example.com");
        assert_eq!(commits[0].author_name, "Alice");
        assert_eq!(
            commits[0].date,
            Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap()
        );
        assert_eq!(commits[1].message, "Fix Y");
    }
}

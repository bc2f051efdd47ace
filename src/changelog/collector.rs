use chrono::{Duration, Utc};
use tracing::{debug, info};

use super::Mode;
use crate::error::{ChangelogError, Result};
use crate::provider::types::{CommitInfo, Platform, PullRequestInfo, TagInfo};
use crate::provider::Provider;

pub const DEFAULT_MAX_PULL_REQUESTS: usize = 200;

/// Window used for a tag whose creation date could not be resolved.
const UNDATED_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct CollectRequest<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub from_tag: &'a TagInfo,
    pub to_tag: &'a TagInfo,
    pub mode: Mode,
    pub include_open: bool,
    pub platform: Platform,
    pub max_pull_requests: usize,
}

/// Local checkouts have no pull requests, so only COMMIT mode works there.
pub fn validate_mode(mode: Mode, platform: Platform) -> Result<()> {
    if platform.is_local() && mode.includes_pull_requests() {
        return Err(ChangelogError::UnsupportedModeForPlatform { mode, platform });
    }
    Ok(())
}

pub fn convert_commits_to_pull_requests(
    commits: Vec<CommitInfo>,
    owner: &str,
    repo: &str,
) -> Vec<PullRequestInfo> {
    commits
        .into_iter()
        .map(|commit| PullRequestInfo::from_commit(commit, owner, repo))
        .collect()
}

/// Gathers the entries for the changelog. In HYBRID mode pull requests come
/// first, then commits; a merged pull request and its merge commit both appear.
pub async fn collect_pull_requests(
    provider: &dyn Provider,
    request: &CollectRequest<'_>,
) -> Result<Vec<PullRequestInfo>> {
    validate_mode(request.mode, request.platform)?;

    let mut pull_requests = Vec::new();

    if request.mode.includes_pull_requests() {
        let now = Utc::now();
        let from_date = request
            .from_tag
            .date
            .unwrap_or_else(|| now - Duration::days(UNDATED_LOOKBACK_DAYS));
        let to_date = request.to_tag.date.unwrap_or(now);
        debug!(
            "Fetching pull requests merged between {} and {}",
            from_date.to_rfc3339(),
            to_date.to_rfc3339()
        );

        let merged = provider
            .get_between_dates(
                request.owner,
                request.repo,
                from_date,
                to_date,
                request.max_pull_requests,
            )
            .await?;
        info!("ℹ️ Found {} merged pull requests", merged.len());
        pull_requests.extend(merged);

        if request.include_open {
            let open = provider
                .get_open(request.owner, request.repo, request.max_pull_requests)
                .await?;
            info!("ℹ️ Found {} open pull requests", open.len());
            pull_requests.extend(open);
        }
    }

    if request.mode.includes_commits() {
        let commits = provider
            .get_commits(
                request.owner,
                request.repo,
                &request.from_tag.name,
                &request.to_tag.name,
            )
            .await?;
        info!("ℹ️ Found {} commits", commits.len());
        pull_requests.extend(convert_commits_to_pull_requests(
            commits,
            request.owner,
            request.repo,
        ));
    }

    Ok(pull_requests)
}

//! `#{{NAME}}` placeholder substitution.
//!
//! Substitution is a single left-to-right pass: text produced by a placeholder is
//! never scanned again, and unknown placeholders stay in the output untouched.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::provider::types::PullRequestInfo;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\{\{([A-Z_]+)\}\}").expect("placeholder pattern is valid"));

pub fn substitute<F>(template: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Renders one entry through `pr_template`.
pub fn render_pull_request(pr: &PullRequestInfo, template: &str, trim_values: bool) -> String {
    let text = |value: &str| {
        if trim_values {
            value.trim().to_string()
        } else {
            value.to_string()
        }
    };

    substitute(template, |name| match name {
        "NUMBER" => Some(pr.number.to_string()),
        "TITLE" => Some(text(&pr.title)),
        "AUTHOR" => Some(text(&pr.author)),
        "URL" => Some(text(&pr.html_url)),
        "BRANCH" => Some(text(pr.branch.as_deref().unwrap_or(""))),
        "BASE_BRANCH" => Some(text(&pr.base_branch)),
        "MILESTONE" => Some(text(&pr.milestone)),
        "BODY" => Some(text(&pr.body)),
        "LABELS" => Some(pr.labels.join(", ")),
        "MERGE_COMMIT_SHA" => Some(text(&pr.merge_commit_sha)),
        "MERGED_AT" => pr
            .merged_at
            .map(|merged| merged.format("%Y-%m-%d").to_string()),
        _ => None,
    })
}

/// Fills the main template. List placeholders cover every pull request passed in,
/// including ones the body left out because of ignored labels.
pub fn apply_main_template(template: &str, changelog: &str, prs: &[PullRequestInfo]) -> String {
    substitute(template, |name| match name {
        "CHANGELOG" => Some(changelog.to_string()),
        "PR_LIST" => Some(pr_list(prs)),
        "CONTRIBUTORS" => Some(contributors(prs).join(", ")),
        "PULL_REQUESTS" => Some(
            prs.iter()
                .map(|pr| pr.number.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        _ => None,
    })
}

pub fn pr_list(prs: &[PullRequestInfo]) -> String {
    prs.iter()
        .map(|pr| format!("- #{}: {}", pr.number, pr.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Unique authors in order of first appearance.
pub fn contributors(prs: &[PullRequestInfo]) -> Vec<String> {
    let mut seen = HashSet::new();
    prs.iter()
        .filter(|pr| seen.insert(pr.author.as_str()))
        .map(|pr| pr.author.clone())
        .collect()
}

use tracing::debug;

use super::categories::categorize;
use super::template::{apply_main_template, render_pull_request};
use crate::config::Configuration;
use crate::error::ChangelogError;
use crate::provider::types::PullRequestInfo;

/// Renders the changelog text for `prs`.
///
/// The body lists each non-empty category in configured order, then whatever no
/// category claimed under `default_category`. When nothing survives the ignore
/// filter the body is `empty_template`. Prefix and tag annotation go above the
/// body, the main template wraps the result, and the postfix is appended last.
pub fn generate_changelog(
    prs: &[PullRequestInfo],
    config: &Configuration,
    tag_annotation: Option<&str>,
    prefix_message: Option<&str>,
    postfix_message: Option<&str>,
) -> String {
    let categorized = categorize(prs, &config.categories, &config.ignore_labels);
    let render = |pr: &PullRequestInfo| render_pull_request(pr, &config.pr_template, config.trim_values);

    let mut sections: Vec<String> = Vec::new();

    if let Some(prefix) = present(prefix_message) {
        sections.push(prefix.to_string());
        sections.push(String::new());
    }

    if let Some(annotation) = present(tag_annotation) {
        sections.push(annotation.to_string());
        sections.push(String::new());
    }

    for (category, members) in &categorized.categories {
        if members.is_empty() {
            continue;
        }
        sections.push(category.title.clone());
        sections.push(String::new());
        sections.extend(members.iter().map(|&pr| render(pr)));
        sections.push(String::new());
    }

    if !categorized.uncategorized.is_empty() {
        sections.push(config.default_category.clone());
        sections.push(String::new());
        sections.extend(categorized.uncategorized.iter().map(|&pr| render(pr)));
        sections.push(String::new());
    }

    if categorized.is_empty() {
        debug!("No entries to render, using empty template");
        sections.push(config.empty_template.clone());
    }

    let mut changelog = sections.join("\n").trim().to_string();

    if !config.template.is_empty() {
        changelog = apply_main_template(&config.template, &changelog, prs);
    }

    if let Some(postfix) = present(postfix_message) {
        changelog.push_str("\n\n");
        changelog.push_str(postfix);
    }

    changelog
}

/// Changelog emitted when a run fails, so consumers never receive empty text.
pub fn fallback_changelog(
    config: &Configuration,
    error: &ChangelogError,
    prefix_message: Option<&str>,
    postfix_message: Option<&str>,
) -> String {
    let message = match error {
        ChangelogError::NoTagsFound => format!("⚠️ {}\n\n{}", error, config.empty_template),
        _ => format!("⚠️ Changelog generation failed: {}", error),
    };

    let fallback_config = Configuration {
        empty_template: message,
        ..config.clone()
    };

    generate_changelog(&[], &fallback_config, None, prefix_message, postfix_message)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

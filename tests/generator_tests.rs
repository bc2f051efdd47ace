mod common;

use pretty_assertions::assert_eq;

use common::pull_request;
use release_changelog_builder::changelog::{fallback_changelog, generate_changelog};
use release_changelog_builder::config::{Category, Configuration};
use release_changelog_builder::error::ChangelogError;

#[test]
fn test_groups_by_category_in_configured_order() {
    let prs = vec![
        pull_request(3, "Fix crash on start", "bob", &["bug"]),
        pull_request(1, "Add dark mode", "alice", &["Feature"]),
        pull_request(2, "Bump deps", "carol", &["dependencies"]),
    ];

    let changelog = generate_changelog(&prs, &Configuration::default(), None, None, None);

    assert_eq!(
        changelog,
        "## 🚀 Features\n\n\
         - Add dark mode\n   - PR: #1\n\n\
         ## 🐛 Bug Fixes\n\n\
         - Fix crash on start\n   - PR: #3\n\n\
         ## Other Changes\n\n\
         - Bump deps\n   - PR: #2"
    );
}

#[test]
fn test_first_matching_category_wins() {
    let config = Configuration {
        categories: vec![
            Category::new("## Fixes", &["fix"]),
            Category::new("## Fixes again", &["fix"]),
        ],
        pr_template: "- #{{TITLE}}".to_string(),
        ..Default::default()
    };
    let prs = vec![pull_request(1, "Patch", "alice", &["fix"])];

    let changelog = generate_changelog(&prs, &config, None, None, None);

    assert_eq!(changelog, "## Fixes\n\n- Patch");
}

#[test]
fn test_ignored_labels_still_count_as_contributions() {
    let config = Configuration {
        template: "#{{CHANGELOG}}\n\nContributors: #{{CONTRIBUTORS}}\nPRs: #{{PULL_REQUESTS}}".to_string(),
        pr_template: "- #{{TITLE}} (#{{AUTHOR}})".to_string(),
        ignore_labels: vec!["skip-changelog".to_string()],
        ..Default::default()
    };
    let prs = vec![
        pull_request(1, "Add search", "alice", &["feature"]),
        pull_request(2, "Internal refactor", "bob", &["Skip-Changelog"]),
        pull_request(3, "Search filters", "alice", &["feature"]),
    ];

    let changelog = generate_changelog(&prs, &config, None, None, None);

    assert_eq!(
        changelog,
        "## 🚀 Features\n\n- Add search (alice)\n- Search filters (alice)\n\n\
         Contributors: alice, bob\nPRs: 1, 2, 3"
    );
}

#[test]
fn test_empty_list_renders_empty_template() {
    let changelog = generate_changelog(&[], &Configuration::default(), None, None, None);

    assert_eq!(changelog, "- no changes");
}

#[test]
fn test_all_ignored_renders_empty_template() {
    let config = Configuration {
        ignore_labels: vec!["wip".to_string()],
        ..Default::default()
    };
    let prs = vec![pull_request(1, "Half done", "alice", &["wip"])];

    assert_eq!(generate_changelog(&prs, &config, None, None, None), "- no changes");
}

#[test]
fn test_prefix_annotation_and_postfix() {
    let prs = vec![pull_request(1, "Add search", "alice", &["feature"])];

    let changelog = generate_changelog(
        &prs,
        &Configuration::default(),
        Some("Release 2.0 is out"),
        Some("Highlights below"),
        Some("Thanks everyone"),
    );

    assert_eq!(
        changelog,
        "Highlights below\n\nRelease 2.0 is out\n\n## 🚀 Features\n\n- Add search\n   - PR: #1\n\nThanks everyone"
    );
}

#[test]
fn test_empty_messages_are_skipped() {
    let prs = vec![pull_request(1, "Add search", "alice", &[])];

    let with_blanks = generate_changelog(&prs, &Configuration::default(), Some(""), Some(""), Some(""));
    let without = generate_changelog(&prs, &Configuration::default(), None, None, None);

    assert_eq!(with_blanks, without);
}

#[test]
fn test_empty_main_template_keeps_body() {
    let config = Configuration {
        template: String::new(),
        pr_template: "* #{{TITLE}}".to_string(),
        ..Default::default()
    };
    let prs = vec![pull_request(1, "Add search", "alice", &[])];

    assert_eq!(
        generate_changelog(&prs, &config, None, None, None),
        "## Other Changes\n\n* Add search"
    );
}

#[test]
fn test_pr_list_placeholder() {
    let config = Configuration {
        template: "#{{PR_LIST}}".to_string(),
        ..Default::default()
    };
    let prs = vec![
        pull_request(4, "One", "alice", &[]),
        pull_request(5, "Two", "bob", &[]),
    ];

    assert_eq!(
        generate_changelog(&prs, &config, None, None, None),
        "- #4: One\n- #5: Two"
    );
}

#[test]
fn test_fallback_for_missing_tags_keeps_empty_template() {
    let changelog = fallback_changelog(
        &Configuration::default(),
        &ChangelogError::NoTagsFound,
        None,
        None,
    );

    assert_eq!(changelog, "⚠️ No tags found in repository\n\n- no changes");
}

#[test]
fn test_fallback_for_other_errors() {
    let err = ChangelogError::UnsupportedPlatform("svn".to_string());

    let changelog = fallback_changelog(&Configuration::default(), &err, Some("Prefix"), None);

    assert_eq!(
        changelog,
        "Prefix\n\n⚠️ Changelog generation failed: Unsupported platform: svn. \
         Supported platforms: github, gitea, local, git"
    );
}

use crate::config::Category;
use crate::provider::types::PullRequestInfo;

/// Pull requests grouped by category, in configured category order.
#[derive(Debug)]
pub struct Categorized<'a> {
    pub categories: Vec<(&'a Category, Vec<&'a PullRequestInfo>)>,
    pub uncategorized: Vec<&'a PullRequestInfo>,
}

impl Categorized<'_> {
    pub fn is_empty(&self) -> bool {
        self.uncategorized.is_empty() && self.categories.iter().all(|(_, prs)| prs.is_empty())
    }
}

pub fn is_ignored(pr: &PullRequestInfo, ignore_labels: &[String]) -> bool {
    pr.labels.iter().any(|label| {
        let label = label.to_lowercase();
        ignore_labels.iter().any(|ignored| ignored.to_lowercase() == label)
    })
}

pub fn matches_category(pr: &PullRequestInfo, category: &Category) -> bool {
    category.labels.iter().any(|wanted| {
        let wanted = wanted.to_lowercase();
        pr.labels.iter().any(|label| label.to_lowercase() == wanted)
    })
}

/// Drops ignored pull requests, then hands each remaining one to the first
/// category whose labels it carries.
pub fn categorize<'a>(
    prs: &'a [PullRequestInfo],
    categories: &'a [Category],
    ignore_labels: &[String],
) -> Categorized<'a> {
    let mut grouped: Vec<(&Category, Vec<&PullRequestInfo>)> =
        categories.iter().map(|category| (category, Vec::new())).collect();
    let mut uncategorized = Vec::new();

    for pr in prs.iter().filter(|pr| !is_ignored(pr, ignore_labels)) {
        match grouped
            .iter_mut()
            .find(|(category, _)| matches_category(pr, category))
        {
            Some((_, members)) => members.push(pr),
            None => uncategorized.push(pr),
        }
    }

    Categorized {
        categories: grouped,
        uncategorized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::PullRequestStatus;
    use chrono::Utc;

    fn labelled(number: u64, labels: &[&str]) -> PullRequestInfo {
        let mut pr = PullRequestInfo {
            number,
            title: format!("PR {}", number),
            html_url: String::new(),
            base_branch: "main".to_string(),
            branch: None,
            created_at: Utc::now(),
            merged_at: None,
            merge_commit_sha: String::new(),
            author: "alice".to_string(),
            author_name: "Alice".to_string(),
            repo_name: "o/r".to_string(),
            labels: vec![],
            milestone: String::new(),
            body: String::new(),
            assignees: vec![],
            requested_reviewers: vec![],
            approved_reviewers: vec![],
            status: PullRequestStatus::Merged,
        };
        pr.set_labels(labels);
        pr
    }

    #[test]
    fn first_matching_category_wins() {
        let categories = vec![
            Category::new("Features", &["Feature"]),
            Category::new("Fixes", &["fix", "feature"]),
        ];
        let prs = vec![labelled(1, &["FEATURE", "fix"]), labelled(2, &["fix"])];

        let result = categorize(&prs, &categories, &[]);

        assert_eq!(result.categories[0].1.len(), 1);
        assert_eq!(result.categories[0].1[0].number, 1);
        assert_eq!(result.categories[1].1.len(), 1);
        assert_eq!(result.categories[1].1[0].number, 2);
        assert!(result.uncategorized.is_empty());
    }

    #[test]
    fn empty_label_list_never_matches() {
        let categories = vec![Category::new("Everything", &[])];
        let prs = vec![labelled(1, &["anything"]), labelled(2, &[])];

        let result = categorize(&prs, &categories, &[]);

        assert!(result.categories[0].1.is_empty());
        assert_eq!(result.uncategorized.len(), 2);
    }

    #[test]
    fn ignored_labels_remove_pull_requests_entirely() {
        let categories = vec![Category::new("Features", &["feature"])];
        let prs = vec![labelled(1, &["feature", "Skip-Changelog"]), labelled(2, &[])];

        let result = categorize(&prs, &categories, &["skip-changelog".to_string()]);

        assert!(result.categories[0].1.is_empty());
        assert_eq!(result.uncategorized.len(), 1);
        assert_eq!(result.uncategorized[0].number, 2);
        assert!(!result.is_empty());
    }
}

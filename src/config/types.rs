use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub title: String,
    /// Any one of these labels claims a pull request for the category.
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Category {
    pub fn new(title: &str, labels: &[&str]) -> Self {
        Self {
            key: None,
            title: title.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Changelog configuration. Every field missing from user input keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub template: String,
    pub pr_template: String,
    /// Accepted for compatibility with existing configuration files.
    pub commit_template: String,
    pub empty_template: String,
    pub categories: Vec<Category>,
    pub ignore_labels: Vec<String>,
    pub trim_values: bool,
    #[serde(rename = "defaultCategory", alias = "default_category")]
    pub default_category: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            template: "#{{CHANGELOG}}".to_string(),
            pr_template: "- #{{TITLE}}\n   - PR: ##{{NUMBER}}".to_string(),
            commit_template: "- #{{TITLE}}".to_string(),
            empty_template: "- no changes".to_string(),
            categories: vec![
                Category::new("## 🚀 Features", &["feature"]),
                Category::new("## 🐛 Bug Fixes", &["bug", "fix"]),
                Category::new("## 📝 Documentation", &["documentation", "docs"]),
                Category::new("## 🔧 Maintenance", &["maintenance", "chore"]),
            ],
            ignore_labels: vec![],
            trim_values: true,
            default_category: "## Other Changes".to_string(),
        }
    }
}

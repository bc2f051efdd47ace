//! Detection of platform, credentials and repository from the CI environment.
//!
//! Everything here works on an [`Environment`] snapshot instead of reading
//! process variables directly.

pub mod platform;
pub mod repository;
pub mod token;

use std::collections::HashMap;

use crate::provider::types::Platform;

pub use platform::{api_base_url, detect_platform};
pub use repository::{detect_owner_repo, parse_repo, OwnerRepo};
pub use token::detect_token;

#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn capture() -> Self {
        std::env::vars().collect()
    }

    /// Empty values count as unset, as they do on CI runners.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Ref that triggered the workflow on the given platform.
    pub fn event_ref(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Gitea => self.get("GITEA_REF"),
            _ => self.get("GITHUB_REF"),
        }
    }

    pub fn workspace(&self) -> Option<&str> {
        self.get("GITHUB_WORKSPACE").or_else(|| self.get("GITEA_WORKSPACE"))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

pub mod categories;
pub mod collector;
pub mod generator;
pub mod tags;
pub mod template;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ChangelogError;

pub use collector::{collect_pull_requests, CollectRequest};
pub use generator::{fallback_changelog, generate_changelog};
pub use tags::{resolve_tags, ResolvedTags, TagQuery};

/// What ends up in the changelog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Merged pull requests between the two tags.
    #[default]
    Pr,
    /// Raw commit log between the two tags.
    Commit,
    /// Pull requests followed by commits, without deduplication.
    Hybrid,
}

impl Mode {
    pub fn includes_pull_requests(self) -> bool {
        matches!(self, Mode::Pr | Mode::Hybrid)
    }

    pub fn includes_commits(self) -> bool {
        matches!(self, Mode::Commit | Mode::Hybrid)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Pr => write!(f, "PR"),
            Mode::Commit => write!(f, "COMMIT"),
            Mode::Hybrid => write!(f, "HYBRID"),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "" | "PR" => Ok(Mode::Pr),
            "COMMIT" => Ok(Mode::Commit),
            "HYBRID" => Ok(Mode::Hybrid),
            _ => Err(ChangelogError::InvalidMode(s.to_string())),
        }
    }
}

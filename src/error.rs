use thiserror::Error;

use crate::changelog::Mode;
use crate::provider::Platform;

#[derive(Debug, Error)]
pub enum ChangelogError {
    #[error("No tags found in repository")]
    NoTagsFound,

    #[error(
        "Tag '{name}' not found in repository. Searched {searched} tag(s). \
         If this is an old tag, try increasing maxTagsToFetch (current: {max_tags_to_fetch})."
    )]
    TagNotFound {
        name: String,
        searched: usize,
        max_tags_to_fetch: usize,
    },

    #[error(
        "Could not determine fromTag: no tag found before {to_tag}. Searched {searched} tag(s). \
         If {to_tag} is not the latest tag, try increasing maxTagsToFetch (current: {max_tags_to_fetch})."
    )]
    NoPredecessorTag {
        to_tag: String,
        searched: usize,
        max_tags_to_fetch: usize,
    },

    #[error("{mode} mode is not supported for {platform} platform. Use COMMIT mode instead.")]
    UnsupportedModeForPlatform { mode: Mode, platform: Platform },

    #[error("Unsupported platform: {0}. Supported platforms: github, gitea, local, git")]
    UnsupportedPlatform(String),

    #[error("Unsupported mode: {0}. Supported modes: PR, COMMIT, HYBRID")]
    InvalidMode(String),

    #[error(
        "Owner and repo are required. Provide via repo input (owner/repo or URL) \
         or ensure running in a GitHub/Gitea Actions environment. ({0})"
    )]
    MissingOwnerRepo(String),

    #[error("Token is required for {0}. Provide via input or environment variable (GITHUB_TOKEN or GITEA_TOKEN).")]
    MissingToken(Platform),

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

pub type Result<T, E = ChangelogError> = std::result::Result<T, E>;

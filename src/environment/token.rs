use tracing::debug;

use super::Environment;
use crate::error::{ChangelogError, Result};
use crate::provider::types::Platform;

/// Token for the platform's API. Local platforms never need one.
pub fn detect_token(platform: Platform, input: Option<&str>, env: &Environment) -> Result<Option<String>> {
    if platform.is_local() {
        return Ok(None);
    }

    if let Some(token) = input.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(Some(token.to_string()));
    }

    let candidates: &[&str] = match platform {
        Platform::Gitea => &["GITEA_TOKEN", "GITHUB_TOKEN"],
        _ => &["GITHUB_TOKEN"],
    };

    for name in candidates {
        if let Some(token) = env.get(name) {
            debug!("Using token from {}", name);
            return Ok(Some(token.to_string()));
        }
    }

    Err(ChangelogError::MissingToken(platform))
}

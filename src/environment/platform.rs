use std::path::Path;
use tracing::info;

use super::Environment;
use crate::error::Result;
use crate::provider::gitea::DEFAULT_GITEA_URL;
use crate::provider::types::Platform;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Explicit input first, then the runner's server variables, then a local
/// checkout when no tokens are around; GitHub otherwise.
pub fn detect_platform(
    input: Option<&str>,
    repository_path: Option<&str>,
    env: &Environment,
) -> Result<Platform> {
    if let Some(platform) = input.map(str::trim).filter(|p| !p.is_empty()) {
        return platform.parse();
    }

    if env.contains("GITEA_SERVER_URL") {
        info!("ℹ️ Detected Gitea platform from GITEA_SERVER_URL");
        return Ok(Platform::Gitea);
    }

    if env.contains("GITHUB_SERVER_URL") || env.contains("GITHUB_API_URL") {
        info!("ℹ️ Detected GitHub platform from GITHUB_SERVER_URL");
        return Ok(Platform::Github);
    }

    let path = repository_path
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .or_else(|| env.workspace())
        .unwrap_or(".");
    let has_no_tokens = !env.contains("GITHUB_TOKEN") && !env.contains("GITEA_TOKEN");

    if has_no_tokens && is_blank_or_relative(path) && is_local_git_repo(Path::new(path)) {
        info!("ℹ️ Detected local git repository (no tokens available, repository path is relative)");
        return Ok(Platform::Git);
    }

    info!("ℹ️ No platform detected from environment, defaulting to GitHub");
    Ok(Platform::Github)
}

pub fn api_base_url(platform: Platform, input: Option<&str>, env: &Environment) -> Option<String> {
    if let Some(url) = input.map(str::trim).filter(|u| !u.is_empty()) {
        return Some(url.to_string());
    }

    match platform {
        Platform::Gitea => Some(
            env.get("GITEA_SERVER_URL")
                .unwrap_or(DEFAULT_GITEA_URL)
                .to_string(),
        ),
        Platform::Github => Some(
            env.get("GITHUB_API_URL")
                .unwrap_or(DEFAULT_GITHUB_API_URL)
                .to_string(),
        ),
        Platform::Local | Platform::Git => None,
    }
}

fn is_blank_or_relative(path: &str) -> bool {
    path.is_empty() || path == "." || path == "./" || !Path::new(path).is_absolute()
}

fn is_local_git_repo(path: &Path) -> bool {
    path.join(".git").exists() || (path.exists() && path.to_string_lossy().ends_with(".git"))
}

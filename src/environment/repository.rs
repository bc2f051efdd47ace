use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

use super::Environment;
use crate::error::{ChangelogError, Result};
use crate::provider::types::Platform;

static REMOTE_URL: LazyLock<Regex> = LazyLock::new(|| {
    // https://host/owner/repo(.git), ssh://git@host/owner/repo.git, git@host:owner/repo.git
    Regex::new(r"^(?:[a-z+]+://(?:[^@/]+@)?[^/]+/|[^@]+@[^:]+:)(?:.*/)?([^/]+)/([^/]+?)(?:\.git)?/?$")
        .expect("remote url pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRepo {
    pub owner: String,
    pub repo: String,
}

impl OwnerRepo {
    fn new(owner: &str, repo: &str) -> Self {
        Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }
    }
}

/// Accepts `owner/repo` or a clone URL.
pub fn parse_repo(input: &str) -> Option<OwnerRepo> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(captures) = REMOTE_URL.captures(input) {
        return Some(OwnerRepo::new(&captures[1], &captures[2]));
    }

    let (owner, repo) = input.split_once('/')?;
    let repo = repo.trim_end_matches(".git");
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some(OwnerRepo::new(owner, repo))
}

pub fn detect_owner_repo(
    input: Option<&str>,
    platform: Platform,
    env: &Environment,
    remote_url: Option<&str>,
) -> Result<OwnerRepo> {
    if let Some(repo) = input.and_then(parse_repo) {
        return Ok(repo);
    }

    if let Some(repo) = env.get("GITHUB_REPOSITORY").and_then(parse_repo) {
        return Ok(repo);
    }

    if platform == Platform::Gitea {
        if let Some(repo) = env.get("GITEA_REPOSITORY").and_then(parse_repo) {
            return Ok(repo);
        }
    }

    if platform.is_local() {
        if let Some(repo) = remote_url.and_then(parse_repo) {
            debug!("Using owner/repo from git remote: {}/{}", repo.owner, repo.repo);
            return Ok(repo);
        }

        let name = env
            .workspace()
            .and_then(|workspace| Path::new(workspace).file_name())
            .map(|name| name.to_string_lossy().to_string())
            .filter(|name| !name.is_empty());
        if let Some(name) = name {
            info!("ℹ️ No remote found, using local/{}", name);
            return Ok(OwnerRepo::new("local", &name));
        }
    }

    Err(ChangelogError::MissingOwnerRepo(format!(
        "input: {}, platform: {}",
        input.unwrap_or("<none>"),
        platform
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repository_forms() {
        let expected = Some(OwnerRepo::new("octo", "widgets"));

        assert_eq!(parse_repo("octo/widgets"), expected);
        assert_eq!(parse_repo("https://github.com/octo/widgets"), expected);
        assert_eq!(parse_repo("https://github.com/octo/widgets.git"), expected);
        assert_eq!(parse_repo("git@github.com:octo/widgets.git"), expected);
        assert_eq!(parse_repo("ssh://git@gitea.example.com:2222/octo/widgets.git"), expected);
        assert_eq!(parse_repo("widgets"), None);
        assert_eq!(parse_repo(""), None);
    }

    #[test]
    fn input_beats_environment() {
        let env: Environment = [("GITHUB_REPOSITORY", "env/repo")].into_iter().collect();

        let repo = detect_owner_repo(Some("octo/widgets"), Platform::Github, &env, None).unwrap();
        assert_eq!(repo, OwnerRepo::new("octo", "widgets"));

        let repo = detect_owner_repo(None, Platform::Github, &env, None).unwrap();
        assert_eq!(repo, OwnerRepo::new("env", "repo"));
    }

    #[test]
    fn gitea_repository_only_for_gitea() {
        let env: Environment = [("GITEA_REPOSITORY", "tea/pot")].into_iter().collect();

        assert_eq!(
            detect_owner_repo(None, Platform::Gitea, &env, None).unwrap(),
            OwnerRepo::new("tea", "pot")
        );
        assert!(matches!(
            detect_owner_repo(None, Platform::Github, &env, None),
            Err(ChangelogError::MissingOwnerRepo(_))
        ));
    }

    #[test]
    fn local_platform_uses_remote_then_workspace() {
        let env: Environment = [("GITHUB_WORKSPACE", "/work/my-project")].into_iter().collect();

        assert_eq!(
            detect_owner_repo(None, Platform::Git, &env, Some("git@host:team/tool.git")).unwrap(),
            OwnerRepo::new("team", "tool")
        );
        assert_eq!(
            detect_owner_repo(None, Platform::Git, &env, None).unwrap(),
            OwnerRepo::new("local", "my-project")
        );
    }
}

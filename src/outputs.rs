use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info};

use crate::environment::Environment;
use crate::provider::types::PullRequestInfo;

/// Values published to the CI runner once the changelog is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutputs {
    pub changelog: String,
    pub owner: String,
    pub repo: String,
    pub from_tag: String,
    pub to_tag: String,
    pub contributors: String,
    pub pull_requests: String,
    pub tag_annotation: String,
    pub failed: bool,
}

impl ActionOutputs {
    /// Everything but the changelog stays empty.
    pub fn failure(changelog: String) -> Self {
        Self {
            changelog,
            failed: true,
            ..Default::default()
        }
    }

    /// Numbers of real pull requests; commit entries carry number 0 and are skipped.
    pub fn pull_request_numbers(pull_requests: &[PullRequestInfo]) -> String {
        pull_requests
            .iter()
            .filter(|pr| pr.number > 0)
            .map(|pr| pr.number.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("changelog", self.changelog.as_str()),
            ("owner", self.owner.as_str()),
            ("repo", self.repo.as_str()),
            ("fromTag", self.from_tag.as_str()),
            ("toTag", self.to_tag.as_str()),
            ("contributors", self.contributors.as_str()),
            ("pull_requests", self.pull_requests.as_str()),
            ("tag_annotation", self.tag_annotation.as_str()),
            ("failed", if self.failed { "true" } else { "false" }),
        ]
    }

    /// Appends the outputs to the file named by `GITHUB_OUTPUT`. Without one the
    /// run is not inside a CI runner and nothing is written.
    pub fn write(&self, env: &Environment) -> Result<()> {
        let Some(path) = env.get("GITHUB_OUTPUT") else {
            debug!("GITHUB_OUTPUT not set, skipping step outputs");
            return Ok(());
        };
        self.write_to(Path::new(path))
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;

        let delimiter = format!("ghadelimiter_{}", Utc::now().timestamp_nanos_opt().unwrap_or_default());
        let mut buffer = String::new();
        for (name, value) in self.entries() {
            buffer.push_str(&format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"));
        }

        file.write_all(buffer.as_bytes())
            .with_context(|| format!("Failed to write outputs to {}", path.display()))?;
        Ok(())
    }

    /// Emits the changelog to `changelog_path` or stdout, then the step
    /// outputs. A broken `GITHUB_OUTPUT` is logged and never hides the
    /// changelog.
    pub fn publish(&self, env: &Environment, changelog_path: Option<&Path>) -> Result<()> {
        match changelog_path {
            Some(path) => {
                std::fs::write(path, &self.changelog)
                    .with_context(|| format!("Failed to write changelog to {}", path.display()))?;
                info!("Changelog written to {}", path.display());
            }
            None => println!("{}", self.changelog),
        }

        if let Err(err) = self.write(env) {
            error!("❌ Failed to write step outputs: {:#}", err);
        }
        Ok(())
    }
}

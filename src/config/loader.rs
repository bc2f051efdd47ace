use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

use super::types::Configuration;

pub fn parse_configuration_json(json: &str) -> Result<Configuration> {
    serde_json::from_str(json).context("Failed to parse configuration JSON")
}

/// Loads a configuration file relative to the repository. `.toml` files are read
/// as TOML, everything else as JSON. Returns `Ok(None)` when the file is absent.
pub fn load_configuration_file(repository_path: &Path, config_path: &str) -> Result<Option<Configuration>> {
    let full_path = repository_path.join(config_path);
    if !full_path.exists() {
        warn!("Configuration file not found: {}", full_path.display());
        return Ok(None);
    }

    let content = std::fs::read_to_string(&full_path)
        .with_context(|| format!("Failed to read {}", full_path.display()))?;

    let is_toml = full_path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    let config = if is_toml {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", full_path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", full_path.display()))?
    };

    Ok(Some(config))
}

/// JSON input wins over the file; anything unusable falls through to the defaults.
pub fn resolve_configuration(
    repository_path: &Path,
    config_json: Option<&str>,
    config_file: Option<&str>,
) -> Configuration {
    if let Some(json) = config_json.filter(|j| !j.trim().is_empty()) {
        match parse_configuration_json(json) {
            Ok(config) => {
                info!("ℹ️ Using configuration from configurationJson input");
                return config;
            }
            Err(e) => error!("{:#}", e),
        }
    }

    if let Some(file) = config_file.filter(|f| !f.trim().is_empty()) {
        match load_configuration_file(repository_path, file.trim()) {
            Ok(Some(config)) => {
                info!("ℹ️ Using configuration from configuration file");
                return config;
            }
            Ok(None) => {}
            Err(e) => error!("Failed to load configuration from file: {:#}", e),
        }
    }

    info!("ℹ️ No configuration provided, using defaults");
    Configuration::default()
}

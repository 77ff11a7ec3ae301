//! Defaults loading.
//!
//! The CLI accepts a defaults file (`nbcollection-ci.toml`) for the values
//! the environment usually owns: remote name, branch, requirements file,
//! venv directory. CLI flags and environment variables take precedence.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub remote_name: String,
    pub branch: String,
    pub requirements: String,
    pub venv_dir: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            remote_name: "origin".to_string(),
            branch: "main".to_string(),
            requirements: "requirements.txt".to_string(),
            venv_dir: ".venv".to_string(),
        }
    }
}

/// Load defaults from `config_path`, or discover a defaults file under
/// `search_dir`.
///
/// An explicitly provided file that fails to parse is an error; an
/// auto-discovered one only warns and falls back to built-in defaults.
pub fn load_defaults(search_dir: &Path, config_path: Option<&Path>) -> Result<Defaults> {
    let config_path_provided = config_path.is_some();

    let discovered = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => discover_defaults(search_dir),
    };

    let Some(config_file) = discovered else {
        return Ok(Defaults::default());
    };

    let content = fs::read_to_string(&config_file)
        .with_context(|| format!("Failed reading defaults file: {}", config_file.display()))?;

    match parse_defaults(&content, &config_file) {
        Ok(defaults) => Ok(defaults),
        Err(e) => {
            if config_path_provided {
                return Err(e);
            }
            tracing::warn!(
                "Failed to parse auto-discovered defaults {}: {}",
                config_file.display(),
                e
            );
            Ok(Defaults::default())
        }
    }
}

/// Parse a TOML defaults file, supporting a nested [nbcollection-ci]
/// section so the file can be shared with other tools.
fn parse_defaults(content: &str, config_file: &Path) -> Result<Defaults> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let value = if let Some(nested) = raw.get("nbcollection-ci") {
        nested.clone()
    } else {
        raw
    };

    value
        .try_into()
        .with_context(|| format!("Invalid defaults file: {}", config_file.display()))
}

fn discover_defaults(search_dir: &Path) -> Option<PathBuf> {
    let candidates = ["nbcollection-ci.toml", ".nbcollection-ci.toml"];

    for candidate in candidates {
        let path = search_dir.join(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    None
}

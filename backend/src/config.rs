//! Application configuration.
//!
//! Settings live in a small YAML file. Every field has a default, so a
//! missing file or a partial one is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable that overrides the configured data directory
pub const DATA_DIR_ENV: &str = "HOSPITAL_ADMIN_DATA_DIR";

const DATA_DIR_NAME: &str = "Hospital Admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding doctors.yaml and the CSV files
    pub data_directory: PathBuf,
    /// Default tracing filter, used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, falling back to defaults when the file does not
    /// exist, then apply the environment override.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            Self::from_yaml_str(&contents)
                .with_context(|| format!("Invalid config {}", path.display()))?
        } else {
            info!("No config at {}, using defaults", path.display());
            Self::default()
        };

        Ok(config.with_data_dir_override(std::env::var(DATA_DIR_ENV).ok()))
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).with_context(|| format!("Failed to write config {}", path.display()))?;
        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace the data directory with `value` unless it is blank
    pub fn with_data_dir_override(mut self, value: Option<String>) -> Self {
        match value {
            Some(dir) if !dir.trim().is_empty() => {
                info!("Data directory overridden by {}: {}", DATA_DIR_ENV, dir.trim());
                self.data_directory = PathBuf::from(dir.trim());
            }
            Some(_) => warn!("Ignoring empty {}", DATA_DIR_ENV),
            None => {}
        }
        self
    }
}

/// `~/Documents/Hospital Admin`, or the home directory if there is no
/// Documents folder
pub fn default_data_directory() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("hospital_admin_data"))
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AuditError;
use crate::repo::DEFAULT_NESTED_LAYOUT;

pub const CONFIG_FILE: &str = "license-audit.toml";
pub const DEFAULT_ALLOW_LIST: &str = "cordova-coho/src/validLicenses.json";
pub const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Allow-list document, relative to the workspace root
    pub allow_list: Option<PathBuf>,

    /// Repositories whose packages live in `<name>/<name>`
    pub nested_layouts: Option<Vec<String>>,

    /// Per-repository scan timeout
    pub scan_timeout_secs: Option<u64>,

    /// Repositories audited when none are given on the command line
    pub repos: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_list: Some(PathBuf::from(DEFAULT_ALLOW_LIST)),
            nested_layouts: Some(vec![DEFAULT_NESTED_LAYOUT.to_string()]),
            scan_timeout_secs: Some(DEFAULT_SCAN_TIMEOUT_SECS),
            repos: Some(Vec::new()),
        }
    }
}

impl Config {
    pub fn allow_list_path(&self, root: &Path) -> PathBuf {
        let path = self
            .allow_list
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ALLOW_LIST));
        root.join(path)
    }

    pub fn nested_layouts(&self) -> Vec<String> {
        self.nested_layouts
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_NESTED_LAYOUT.to_string()])
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs.unwrap_or(DEFAULT_SCAN_TIMEOUT_SECS))
    }

    pub fn repos(&self) -> Vec<String> {
        self.repos.clone().unwrap_or_default()
    }
}

/// Load `license-audit.toml` from the workspace root, or defaults if absent.
pub fn load_config(root: &Path) -> Result<Config, AuditError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config_from(&path)
}

/// Load an explicit configuration file. Unlike [`load_config`] the file must exist.
pub fn load_config_from(path: &Path) -> Result<Config, AuditError> {
    let content = fs::read_to_string(path).map_err(|e| AuditError::Config {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    let config: Config = toml::from_str(&content).map_err(|e| AuditError::Config {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    if config.scan_timeout_secs == Some(0) {
        return Err(AuditError::Config {
            path: path.to_path_buf(),
            details: "scan_timeout_secs must be at least 1".to_string(),
        });
    }

    Ok(config)
}

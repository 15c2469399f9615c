use crate::errors::Result;
use crate::wm::Viewport;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What `create_file` does when the target name is already a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryOverwrite {
    /// Drop the directory subtree and store the file in its place.
    #[default]
    Replace,
    /// Refuse with `IsADirectory`.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Prefix applied to every key in the primary store.
    pub prefix: String,
    /// The one key mirrored into the cookie jar.
    pub cookie_key: String,
    pub cookie_name: String,
    pub cookie_days: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            prefix: "delta_os_".to_string(),
            cookie_key: "general.json".to_string(),
            cookie_name: "delta_settings".to_string(),
            cookie_days: 365,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DeskConfig {
    pub storage: StorageConfig,
    pub viewport: Viewport,
    pub directory_overwrite: DirectoryOverwrite,
}

impl DeskConfig {
    /// Reads the config file if there is one. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<DeskConfig> {
        if !path.exists() {
            tracing::info!("No config file at {}, using defaults", path.display());
            return Ok(DeskConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: DeskConfig = serde_json::from_str(&contents)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: DeskConfig =
            serde_json::from_str(r#"{"directory_overwrite": "reject"}"#).unwrap();
        assert_eq!(config.directory_overwrite, DirectoryOverwrite::Reject);
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.viewport, Viewport::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = DeskConfig::load(Path::new("/nonexistent/sakura/config.json")).unwrap();
        assert_eq!(config, DeskConfig::default());
    }
}

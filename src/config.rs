//! Application configuration loaded from YAML.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::render::Layout;

fn default_catalog_path() -> PathBuf {
    PathBuf::from("data/fish_data.json")
}

fn default_icons_dir() -> PathBuf {
    PathBuf::from("icons")
}

fn default_preferences_path() -> PathBuf {
    PathBuf::from("preferences.json")
}

fn default_reload_catalog() -> bool {
    true
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default = "default_icons_dir")]
    pub icons_dir: PathBuf,
    #[serde(default = "default_preferences_path")]
    pub preferences_path: PathBuf,
    /// Re-read the catalog on every update instead of once at startup.
    #[serde(default = "default_reload_catalog")]
    pub reload_catalog: bool,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            icons_dir: default_icons_dir(),
            preferences_path: default_preferences_path(),
            reload_catalog: default_reload_catalog(),
            layout: Layout::default(),
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: AppConfig =
            serde_yaml::from_str("server:\n  port: 9000\nlayout: verbose\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.layout, Layout::Verbose);
        assert!(config.reload_catalog);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fishtable.yaml");
        let config = AppConfig {
            reload_catalog: false,
            ..AppConfig::default()
        };
        config.to_yaml(&path).unwrap();

        let loaded = AppConfig::from_yaml(&path).unwrap();
        assert!(!loaded.reload_catalog);
        assert_eq!(loaded.catalog_path, config.catalog_path);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AppConfig::from_yaml("does/not/exist.yaml").unwrap_err();
        assert!(err.to_string().contains("does/not/exist.yaml"));
    }
}

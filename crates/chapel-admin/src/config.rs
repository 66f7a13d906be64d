//! Admin configuration
//!
//! Read from `~/.chapel/config.toml`, or `~/.chapel/config.<profile>.toml`
//! when a profile is given. A missing file means defaults.

use crate::error::{AdminError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub api_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    pub search_debounce_ms: u64,
    pub autosave_debounce_ms: u64,
    pub default_page_size: u32,
    pub default_language: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000/api".into(),
            api_key: None,
            log_level: None,
            search_debounce_ms: 300,
            autosave_debounce_ms: 1500,
            default_page_size: 20,
            default_language: "en".into(),
        }
    }
}

impl AdminConfig {
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| AdminError::Config(e.to_string()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AdminError::Config(e.to_string()))
    }

    pub fn save(&self, profile: Option<&str>) -> Result<()> {
        self.save_to(&Self::config_path(profile)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| AdminError::Config(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| AdminError::Config(e.to_string()))?;
        fs::write(path, content).map_err(|e| AdminError::Config(e.to_string()))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| AdminError::Config("cannot find home directory".into()))?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".chapel").join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AdminConfig::from_toml(
            r#"
            api_url = "https://church.example/api"
            search_debounce_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.api_url, "https://church.example/api");
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
        assert_eq!(config.autosave_debounce(), Duration::from_millis(1500));
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.default_language, "en");
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("chapel-config-{}", std::process::id()))
            .join("config.staging.toml");
        let config = AdminConfig {
            api_key: Some("secret".into()),
            log_level: Some("debug".into()),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(AdminConfig::load_from(&path).unwrap(), config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_and_bad_toml() {
        let missing = std::env::temp_dir().join("chapel-config-does-not-exist.toml");
        assert_eq!(AdminConfig::load_from(&missing).unwrap(), AdminConfig::default());
        assert!(matches!(
            AdminConfig::from_toml("default_page_size = \"many\""),
            Err(AdminError::Config(_))
        ));
    }
}

//! # Configuration
//!
//! `grepl` reads an optional JSON file holding the defaults of every session. By default it lives
//! in the platform config directory (e.g. `~/.config/grepl/config.json` on Linux). A missing file
//! means the built-in defaults; command-line flags override whatever the file says.
use anyhow::{Context, Result};
use directories::ProjectDirs;
use grepl_core::walker::LabelFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Template of the field label. Accepts `{ancestor}`, `{name}` and `{type}`.
    pub input_prompt_format: String,
    pub ancestor_delimiter: String,
    /// Metadata sent with every request.
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let labels = LabelFormat::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            input_prompt_format: labels.template,
            ancestor_delimiter: labels.delimiter,
            headers: BTreeMap::new(),
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn label_format(&self) -> LabelFormat {
        LabelFormat {
            template: self.input_prompt_format.clone(),
            delimiter: self.ancestor_delimiter.clone(),
        }
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses the file at `path`, or the one in the platform config directory.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path,
            None => ProjectDirs::from("com", "grepl", "grepl")
                .context("Could not determine config directory")?
                .config_dir()
                .join("config.json"),
        };

        Ok(Self { config_path })
    }

    pub fn load(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read {}", self.config_path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", self.config_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("grepl-{}-{name}.json", std::process::id()));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("grepl-config-that-does-not-exist.json");
        let manager = ConfigManager::new(Some(path)).unwrap();

        let config = manager.load().unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.label_format(), LabelFormat::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let path = temp_config(
            "partial",
            r#"{ "port": 6000, "ancestor_delimiter": ".", "headers": { "x-id": "1" } }"#,
        );
        let config = ConfigManager::new(Some(path.clone()))
            .unwrap()
            .load()
            .unwrap();
        fs::remove_file(path).unwrap();

        assert_eq!(config.port, 6000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.label_format().delimiter, ".");
        assert_eq!(config.headers.get("x-id").map(String::as_str), Some("1"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_config("malformed", "{ port: ");
        let result = ConfigManager::new(Some(path.clone())).unwrap().load();
        fs::remove_file(path).unwrap();

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration in"));
    }
}

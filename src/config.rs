use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Fixed endpoint of the hosted assistant agent.
pub const DEFAULT_API_URL: &str =
    "https://skynetassistantsagentapi20250725153455-bne6c7gudbdcdeek.eastus-01.azurewebsites.net/query";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub enable_copy: Option<bool>,
    pub enable_voice: Option<bool>,
    pub enable_scroll_top: Option<bool>,
    /// External command that records one utterance and prints the
    /// transcript on stdout. Voice input is offered only when set.
    pub dictation_command: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoint(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn copy_enabled(&self) -> bool {
        self.enable_copy.unwrap_or(true)
    }

    pub fn voice_enabled(&self) -> bool {
        self.enable_voice.unwrap_or(true)
    }

    pub fn scroll_top_enabled(&self) -> bool {
        self.enable_scroll_top.unwrap_or(true)
    }

    pub fn load() -> Result<Self> {
        Self::read_from(&Self::config_path()?)
    }

    fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("botica").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_fields_missing() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.endpoint(), DEFAULT_API_URL);
        assert!(config.copy_enabled());
        assert!(config.voice_enabled());
        assert!(config.scroll_top_enabled());
        assert!(config.dictation_command.is_none());
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"api_url": "http://localhost:8080/query", "enable_voice": false}"#,
        )
        .unwrap();
        assert_eq!(config.endpoint(), "http://localhost:8080/query");
        assert!(!config.voice_enabled());
        assert!(config.copy_enabled());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::read_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.endpoint(), DEFAULT_API_URL);
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            api_url: Some("http://localhost:9000/query".to_string()),
            enable_copy: Some(false),
            enable_voice: None,
            enable_scroll_top: Some(true),
            dictation_command: Some("whisper-capture --once".to_string()),
        };
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = Config::read_from(&path).unwrap();
        assert_eq!(loaded.endpoint(), "http://localhost:9000/query");
        assert!(!loaded.copy_enabled());
        assert!(loaded.voice_enabled());
        assert_eq!(
            loaded.dictation_command.as_deref(),
            Some("whisper-capture --once")
        );
    }

    #[test]
    fn rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::read_from(&path).is_err());
    }
}

//! Game server configuration file (`DedicatedServerConfig.json`).
//!
//! Consulted when the bridge's own config does not carry Web API settings.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::ConfigError;

/// Web API fields of the dedicated server's config file.
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    #[serde(rename = "bEnableHostWebAPIServer", default)]
    pub web_api_enabled: bool,

    #[serde(rename = "HostWebAPIServerPort", default)]
    pub web_api_port: u16,

    #[serde(rename = "HostWebAPIServerPassword", default)]
    pub web_api_password: Option<String>,
}

impl GameConfig {
    /// Parse the server config from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Load the server config from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_web_api_fields() {
        let config = GameConfig::from_json(
            r#"{
                "bEnableHostWebAPIServer": true,
                "HostWebAPIServerPort": 8080,
                "HostWebAPIServerPassword": "password"
            }"#,
        )
        .unwrap();

        assert!(config.web_api_enabled);
        assert_eq!(config.web_api_port, 8080);
        assert_eq!(config.web_api_password.as_deref(), Some("password"));
    }

    #[test]
    fn missing_fields_default_to_disabled() {
        let config = GameConfig::from_json(r#"{"ServerName": "My Server"}"#).unwrap();

        assert!(!config.web_api_enabled);
        assert_eq!(config.web_api_port, 0);
        assert!(config.web_api_password.is_none());
    }
}

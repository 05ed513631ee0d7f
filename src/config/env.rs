//! Environment variable overrides for configuration.
//!
//! Supports overriding config values with environment variables:
//! - `ROADHOUSE_DISCORD_TOKEN` - Discord bot token
//! - `ROADHOUSE_SERVER_PATH` - Dedicated server install path
//! - `ROADHOUSE_WEB_API_PORT` - Admin Web API port
//! - `ROADHOUSE_WEB_API_PASSWORD` - Admin Web API password

use std::env;

use crate::config::types::{Config, WebApiConfig};

/// Environment variable prefix for all config overrides.
const ENV_PREFIX: &str = "ROADHOUSE";

/// Apply environment variable overrides to a config.
///
/// This allows sensitive values like tokens and passwords to be
/// provided via environment variables instead of the config file.
pub fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(token) = env::var(format!("{ENV_PREFIX}_DISCORD_TOKEN")) {
        config.discord_token = token;
    }

    if let Ok(path) = env::var(format!("{ENV_PREFIX}_SERVER_PATH")) {
        config.path = path;
    }

    if let Ok(port) = env::var(format!("{ENV_PREFIX}_WEB_API_PORT")) {
        if let Ok(port) = port.parse() {
            let password = config.web_api.as_ref().and_then(|w| w.password.clone());
            config.web_api = Some(WebApiConfig { port, password });
        }
    }

    if let Ok(password) = env::var(format!("{ENV_PREFIX}_WEB_API_PASSWORD")) {
        if let Some(ref mut web_api) = config.web_api {
            web_api.password = Some(password);
        }
    }

    config
}

/// Get the config file path from environment or use default.
///
/// Checks `ROADHOUSE_CONFIG`, otherwise returns "config.json".
pub fn get_config_path() -> String {
    env::var(format!("{ENV_PREFIX}_CONFIG")).unwrap_or_else(|_| "config.json".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_config() -> Config {
        Config {
            discord_token: "original_token".to_string(),
            path: "/srv/motortown".to_string(),
            messages: None,
            mention: None,
            web_api: None,
        }
    }

    #[test]
    fn no_vars_leaves_config_unchanged() {
        env::remove_var("ROADHOUSE_DISCORD_TOKEN");
        env::remove_var("ROADHOUSE_SERVER_PATH");
        env::remove_var("ROADHOUSE_WEB_API_PORT");
        env::remove_var("ROADHOUSE_WEB_API_PASSWORD");

        let result = apply_env_overrides(make_test_config());

        assert_eq!(result.discord_token, "original_token");
        assert_eq!(result.path, "/srv/motortown");
        assert!(result.web_api.is_none());
    }

    #[test]
    fn default_config_path() {
        env::remove_var("ROADHOUSE_CONFIG");
        assert_eq!(get_config_path(), "config.json");
    }
}

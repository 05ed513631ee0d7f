//! Configuration validation.
//!
//! Validates configuration values and provides helpful error messages.

use crate::common::error::ConfigError;
use crate::config::types::{Config, MessageRoute};
use crate::game::router::parse_color;

/// Validate a configuration and return detailed errors.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.discord_token.is_empty() {
        errors.push("discord_token is required".to_string());
    }
    if config.discord_token == "YOUR_DISCORD_TOKEN_HERE" {
        errors.push("discord_token has not been configured (still using placeholder)".to_string());
    }

    if config.path.is_empty() {
        errors.push("path is required".to_string());
    }

    if let Some(ref messages) = config.messages {
        let routes = [
            ("chat", &messages.chat),
            ("login", &messages.login),
            ("logout", &messages.logout),
            ("ban", &messages.ban),
        ];
        for (name, route) in routes {
            if let Some(route) = route {
                validate_route(name, route, &mut errors);
            }
        }
    }

    if let Some(ref mention) = config.mention {
        if mention.keyword.is_empty() {
            errors.push("mention.keyword must not be empty".to_string());
        }
    }

    if let Some(ref web_api) = config.web_api {
        if web_api.port == 0 {
            errors.push("web_api.port must be non-zero".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            message: errors.join("\n"),
        })
    }
}

fn validate_route(name: &str, route: &MessageRoute, errors: &mut Vec<String>) {
    if route.channel_id == 0 {
        errors.push(format!("message_settings.{name}.channel_id must be non-zero"));
    }
    if route.text_template.is_none() && route.embed.is_none() {
        errors.push(format!(
            "message_settings.{name} needs a text_template or embed_settings"
        ));
    }
    if let Some(ref embed) = route.embed {
        if let Some(ref color) = embed.color {
            if parse_color(color).is_none() {
                errors.push(format!(
                    "message_settings.{name}.embed_settings.color '{color}' is not a hex color"
                ));
            }
        }
    }
}

//! Configuration type definitions.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Directory of server log files, relative to the install path.
const SERVER_LOG_DIR: &str = "MotorTown/Saved/ServerLog";

/// Root configuration structure (`config.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord bot token.
    pub discord_token: String,
    /// Dedicated server install path.
    pub path: String,
    /// Per-event-kind message routes.
    #[serde(rename = "message_settings")]
    pub messages: Option<MessagesConfig>,
    /// Optional keyword-to-replacement rewrite for rendered text.
    pub mention: Option<MentionConfig>,
    /// Admin Web API connection settings. When absent, the server's own
    /// `DedicatedServerConfig.json` is consulted instead.
    pub web_api: Option<WebApiConfig>,
}

impl Config {
    /// Directory holding the server's `*.log` files.
    pub fn log_dir(&self) -> PathBuf {
        Path::new(&self.path).join(SERVER_LOG_DIR)
    }

    /// Path of the game server's own configuration file.
    pub fn game_config_path(&self) -> PathBuf {
        Path::new(&self.path).join("DedicatedServerConfig.json")
    }
}

/// Message routes keyed by event kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessagesConfig {
    pub chat: Option<MessageRoute>,
    pub login: Option<MessageRoute>,
    pub logout: Option<MessageRoute>,
    pub ban: Option<MessageRoute>,
}

/// Destination and formatting for one event kind.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRoute {
    /// Template for the plain-text part of the message.
    pub text_template: Option<String>,
    /// Embed settings; rendered independently of the text part.
    #[serde(rename = "embed_settings")]
    pub embed: Option<EmbedSpec>,
    /// Destination Discord channel.
    pub channel_id: u64,
}

/// Embed formatting for a message route.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedSpec {
    pub title_template: Option<String>,
    pub description_template: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Hex color, with or without a leading `#`.
    pub color: Option<String>,
}

/// Keyword substitution applied to rendered text (never to embeds).
#[derive(Debug, Clone, Deserialize)]
pub struct MentionConfig {
    /// Keyword to look for, matched case-insensitively.
    pub keyword: String,
    /// Replacement, typically a Discord role or user mention.
    pub replacement: String,
}

/// Admin Web API connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WebApiConfig {
    pub port: u16,
    pub password: Option<String>,
}

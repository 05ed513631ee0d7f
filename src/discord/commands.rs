//! Discord admin commands (!kick, !ban, !player-list, etc).
//!
//! Handles command parsing and execution for Discord commands. Each command
//! runs on its own task so a slow admin API call never blocks other commands
//! or event forwarding; failures are caught at the handler boundary and
//! reported back as a failure reply.

use std::sync::Arc;

use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::prelude::*;
use tracing::{error, info};

use crate::common::error::ApiResult;
use crate::game::api::{AdminApiClient, PlayerRecord};

/// Reply when a list endpoint returns no players.
const NO_PLAYERS: &str = "No player on the server";

/// Reply when the ban list is empty.
const NO_BANNED_PLAYERS: &str = "No player banned on the server";

/// A parsed admin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Kick(String),
    Ban(String),
    Unban(String),
    Announce(String),
    PlayerList,
    BanList,
    OnlinePlayers,
    Help,
}

/// Parse a Discord message into a command.
///
/// Returns `None` for ordinary chatter, `Some(Err(reply))` when the command
/// name matched but a required argument is missing.
pub fn parse_command(content: &str) -> Option<Result<Command, String>> {
    let content = content.trim();
    if content.len() > 500 {
        return None;
    }
    let rest = content.strip_prefix('!')?;

    let mut parts = rest.splitn(2, ' ');
    let name = parts.next()?.to_lowercase();
    let arg = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match name.as_str() {
        "kick" => Some(require(arg, "Player id").map(Command::Kick)),
        "ban" => Some(require(arg, "Player id").map(Command::Ban)),
        "unban" => Some(require(arg, "Player id").map(Command::Unban)),
        "announce" => Some(require(arg, "Message").map(Command::Announce)),
        "player-list" | "playerlist" => Some(Ok(Command::PlayerList)),
        "ban-list" | "banlist" => Some(Ok(Command::BanList)),
        "online-players" | "onlineplayers" => Some(Ok(Command::OnlinePlayers)),
        "help" => Some(Ok(Command::Help)),
        _ => None,
    }
}

fn require(arg: Option<String>, what: &str) -> Result<String, String> {
    arg.ok_or_else(|| format!("{what} is required"))
}

/// Render a player list reply: one `"name (unique_id)"` entry per line.
pub fn format_player_list(players: &[PlayerRecord], empty_message: &str) -> String {
    if players.is_empty() {
        return empty_message.to_string();
    }
    players
        .iter()
        .map(|p| format!("{} ({})", p.name, p.unique_id))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Maps inbound Discord commands to admin API calls.
pub struct CommandBridge {
    api: Option<Arc<AdminApiClient>>,
}

impl CommandBridge {
    pub fn new(api: Option<Arc<AdminApiClient>>) -> Self {
        Self { api }
    }

    /// Parse and dispatch a command from Discord.
    ///
    /// Returns `true` if the message was a command, `false` otherwise.
    pub fn dispatch(&self, ctx: &Context, msg: &Message) -> bool {
        let Some(parsed) = parse_command(&msg.content) else {
            return false;
        };

        info!("Command from {}: {}", msg.author.name, msg.content);

        let http = ctx.http.clone();
        let channel_id = msg.channel_id;

        let command = match parsed {
            Ok(command) => command,
            Err(reply) => {
                tokio::spawn(async move { say(&http, channel_id, &reply).await });
                return true;
            }
        };

        if let Command::Help = command {
            tokio::spawn(async move { say(&http, channel_id, help_text()).await });
            return true;
        }

        let Some(api) = self.api.clone() else {
            tokio::spawn(async move {
                say(&http, channel_id, "The server's Web API is not configured").await;
            });
            return true;
        };

        tokio::spawn(async move {
            let reply = match execute(&api, command).await {
                Ok(reply) => reply,
                Err(e) => format!("Command failed: {e}"),
            };
            say(&http, channel_id, &reply).await;
        });

        true
    }
}

/// Run one command against the admin API and build the reply.
async fn execute(api: &AdminApiClient, command: Command) -> ApiResult<String> {
    match command {
        Command::Kick(id) => {
            api.kick(&id).await?;
            Ok(format!("Player ({id}) kicked"))
        }
        Command::Ban(id) => {
            api.ban(&id).await?;
            Ok(format!("Player ({id}) banned"))
        }
        Command::Unban(id) => {
            api.unban(&id).await?;
            Ok(format!("Player ({id}) unbanned"))
        }
        Command::Announce(message) => {
            api.announce(&message).await?;
            Ok("Message sent".to_string())
        }
        Command::PlayerList => {
            let players = api.player_list().await?;
            Ok(format_player_list(&players, NO_PLAYERS))
        }
        Command::BanList => {
            let players = api.player_ban_list().await?;
            Ok(format_player_list(&players, NO_BANNED_PLAYERS))
        }
        Command::OnlinePlayers => {
            let count = api.player_count().await?;
            Ok(format!("{count} players online"))
        }
        Command::Help => Ok(help_text().to_string()),
    }
}

fn help_text() -> &'static str {
    r#"**Available Commands:**
• `!kick <player-id>` - Kick a player from the server
• `!ban <player-id>` - Ban a player
• `!unban <player-id>` - Unban a player
• `!player-list` - List players on the server
• `!ban-list` - List banned players
• `!online-players` - Show the online player count
• `!announce <message>` - Send a message to the in-game chat"#
}

async fn say(http: &Http, channel_id: serenity::model::id::ChannelId, reply: &str) {
    if let Err(e) = channel_id.say(http, reply).await {
        error!("Failed to send command reply: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            parse_command("!kick 76561197997411952"),
            Some(Ok(Command::Kick("76561197997411952".to_string())))
        );
        assert_eq!(
            parse_command("!announce server restarting in 5 minutes"),
            Some(Ok(Command::Announce(
                "server restarting in 5 minutes".to_string()
            )))
        );
    }

    #[test]
    fn parses_list_command_aliases() {
        assert_eq!(parse_command("!player-list"), Some(Ok(Command::PlayerList)));
        assert_eq!(parse_command("!playerlist"), Some(Ok(Command::PlayerList)));
        assert_eq!(parse_command("!ban-list"), Some(Ok(Command::BanList)));
        assert_eq!(parse_command("!banlist"), Some(Ok(Command::BanList)));
        assert_eq!(
            parse_command("!online-players"),
            Some(Ok(Command::OnlinePlayers))
        );
        assert_eq!(
            parse_command("!ONLINEPLAYERS"),
            Some(Ok(Command::OnlinePlayers))
        );
    }

    #[test]
    fn missing_argument_yields_usage_reply() {
        assert_eq!(
            parse_command("!kick"),
            Some(Err("Player id is required".to_string()))
        );
        assert_eq!(
            parse_command("!announce   "),
            Some(Err("Message is required".to_string()))
        );
    }

    #[test]
    fn ordinary_chatter_is_not_a_command() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command("!unknown"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn formats_player_list_entries() {
        let players = vec![
            PlayerRecord {
                name: "McRay".to_string(),
                unique_id: "76561197997411952".to_string(),
            },
            PlayerRecord {
                name: "Arend".to_string(),
                unique_id: "76561197997411953".to_string(),
            },
        ];

        assert_eq!(
            format_player_list(&players, NO_PLAYERS),
            "McRay (76561197997411952)\nArend (76561197997411953)"
        );
    }

    #[test]
    fn empty_player_list_uses_fixed_message() {
        assert_eq!(format_player_list(&[], NO_PLAYERS), NO_PLAYERS);
        assert_eq!(
            format_player_list(&[], NO_BANNED_PLAYERS),
            NO_BANNED_PLAYERS
        );
    }
}

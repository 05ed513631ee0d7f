//! Game event classification.
//!
//! Turns raw server log lines into typed events. Classification is a pure
//! function over one line of text; lines from unrelated log categories are
//! expected noise and classify to no event.

use chrono::NaiveDateTime;

use crate::common::error::EventParseError;

/// Format of the bracketed timestamp that prefixes every structured line.
const TIMESTAMP_FORMAT: &str = "[%Y.%m.%d-%H.%M.%S]";

/// A recognized game event parsed from one log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    /// Wall-clock timestamp parsed from the line.
    pub timestamp: NaiveDateTime,
    /// Player the event is about.
    pub player: String,
    /// The raw source line.
    pub raw: String,
    /// Kind-specific payload.
    pub kind: EventKind,
}

/// Kind-specific event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// An in-game chat message.
    Chat { message: String },
    /// A player session change. `player_id` is present only on login.
    Session {
        login: bool,
        player_id: Option<String>,
    },
    /// An admin banned a player.
    Ban { admin: String },
}

impl GameEvent {
    /// Named fields for template rendering.
    ///
    /// Field names follow the log vocabulary: `{{player}}`, `{{message}}`,
    /// `{{admin}}`, `{{player_id}}`, `{{timestamp}}`, `{{text}}`.
    pub fn template_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("timestamp", self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
            ("player", self.player.clone()),
            ("text", self.raw.clone()),
        ];

        match &self.kind {
            EventKind::Chat { message } => {
                fields.push(("message", message.clone()));
            }
            EventKind::Session { player_id, .. } => {
                if let Some(id) = player_id {
                    fields.push(("player_id", id.clone()));
                }
            }
            EventKind::Ban { admin } => {
                fields.push(("admin", admin.clone()));
            }
        }

        fields
    }
}

/// Classify one log line.
///
/// Returns `Ok(Some(event))` for a recognized line, `Ok(None)` for noise
/// (including lines that do not start with a bracketed token), and an error
/// for a line that carries the bracket prefix but violates the grammar.
/// Callers are expected to confine errors to the offending line.
pub fn classify(line: &str) -> Result<Option<GameEvent>, EventParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let Some(&first) = tokens.first() else {
        return Ok(None);
    };

    // Lines without the bracketed prefix belong to other log categories.
    if !first.starts_with('[') || !first.ends_with(']') {
        return Ok(None);
    }

    let timestamp = NaiveDateTime::parse_from_str(first, TIMESTAMP_FORMAT).map_err(|_| {
        EventParseError::BadTimestamp {
            token: first.to_string(),
        }
    })?;

    let Some(&marker) = tokens.get(1) else {
        return Ok(None);
    };

    if marker == "[CHAT]" {
        let player = require(&tokens, 2)?.trim_end_matches(':').to_string();
        let message = tokens[3..].join(" ");
        return Ok(Some(GameEvent {
            timestamp,
            player,
            raw: line.to_string(),
            kind: EventKind::Chat { message },
        }));
    }

    if marker == "Player" && tokens.get(2) == Some(&"Login:") {
        let player = require(&tokens, 3)?.to_string();
        let player_id = tokens
            .last()
            .map(|t| t.trim_matches(|c| c == '(' || c == ')').to_string());
        return Ok(Some(GameEvent {
            timestamp,
            player,
            raw: line.to_string(),
            kind: EventKind::Session {
                login: true,
                player_id,
            },
        }));
    }

    if marker == "Player" && tokens.get(2) == Some(&"Logout:") {
        let player = require(&tokens, 3)?.to_string();
        return Ok(Some(GameEvent {
            timestamp,
            player,
            raw: line.to_string(),
            kind: EventKind::Session {
                login: false,
                player_id: None,
            },
        }));
    }

    if marker == "[ADMIN]" {
        let admin = require(&tokens, 2)?.to_string();
        let player = require(&tokens, 4)?.to_string();
        return Ok(Some(GameEvent {
            timestamp,
            player,
            raw: line.to_string(),
            kind: EventKind::Ban { admin },
        }));
    }

    Ok(None)
}

fn require<'a>(tokens: &[&'a str], index: usize) -> Result<&'a str, EventParseError> {
    tokens
        .get(index)
        .copied()
        .ok_or(EventParseError::TruncatedLine {
            expected: index + 1,
            got: tokens.len(),
        })
}

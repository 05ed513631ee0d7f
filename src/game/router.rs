//! Event-to-message routing.
//!
//! Looks up the configured route for an event's kind, renders templates,
//! and applies the mention-keyword substitution. Produces a transport-free
//! message description; the Discord side turns it into an actual send.

use regex::RegexBuilder;
use tracing::warn;

use crate::config::types::{MentionConfig, MessageRoute, MessagesConfig};
use crate::game::events::{EventKind, GameEvent};
use crate::game::formatter::render;

/// The route categories an event can map to.
///
/// Login and logout are independent routes picked by the session event's
/// login flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Chat,
    Login,
    Logout,
    Ban,
}

impl RouteKind {
    /// Route category for a classified event.
    pub fn of(event: &GameEvent) -> Self {
        match &event.kind {
            EventKind::Chat { .. } => RouteKind::Chat,
            EventKind::Session { login: true, .. } => RouteKind::Login,
            EventKind::Session { login: false, .. } => RouteKind::Logout,
            EventKind::Ban { .. } => RouteKind::Ban,
        }
    }
}

/// A rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub channel_id: u64,
    pub text: Option<String>,
    pub embed: Option<OutboundEmbed>,
}

/// A rendered embed. Thumbnail URL passes through unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub color: Option<u32>,
}

/// Maps classified events to outbound Discord messages.
#[derive(Debug)]
pub struct Router {
    routes: MessagesConfig,
    mention: Option<(regex::Regex, String)>,
}

impl Router {
    /// Create a router from the configured routes and mention substitution.
    pub fn new(routes: Option<MessagesConfig>, mention: Option<MentionConfig>) -> Self {
        let mention = mention.and_then(|m| {
            match RegexBuilder::new(&regex::escape(&m.keyword))
                .case_insensitive(true)
                .build()
            {
                Ok(re) => Some((re, m.replacement)),
                Err(e) => {
                    warn!("Ignoring mention keyword '{}': {}", m.keyword, e);
                    None
                }
            }
        });

        Self {
            routes: routes.unwrap_or_default(),
            mention,
        }
    }

    /// Build the outbound message for an event.
    ///
    /// Returns `None` when no route is configured for the event's kind;
    /// such events are dropped without delivery and without error.
    pub fn message_for(&self, event: &GameEvent) -> Option<OutboundMessage> {
        let route = self.route_for(RouteKind::of(event))?;
        let fields = event.template_fields();

        // Mention substitution applies to the text channel only.
        let text = route
            .text_template
            .as_deref()
            .map(|template| self.substitute_mention(render(template, &fields)));

        let embed = route.embed.as_ref().map(|spec| OutboundEmbed {
            title: spec
                .title_template
                .as_deref()
                .map(|t| render(t, &fields)),
            description: spec
                .description_template
                .as_deref()
                .map(|t| render(t, &fields)),
            thumbnail_url: spec.thumbnail_url.clone(),
            color: spec.color.as_deref().and_then(parse_color),
        });

        Some(OutboundMessage {
            channel_id: route.channel_id,
            text,
            embed,
        })
    }

    fn route_for(&self, kind: RouteKind) -> Option<&MessageRoute> {
        match kind {
            RouteKind::Chat => self.routes.chat.as_ref(),
            RouteKind::Login => self.routes.login.as_ref(),
            RouteKind::Logout => self.routes.logout.as_ref(),
            RouteKind::Ban => self.routes.ban.as_ref(),
        }
    }

    fn substitute_mention(&self, text: String) -> String {
        match &self.mention {
            // NoExpand: the configured replacement is literal text, not an
            // expansion template.
            Some((re, replacement)) => re
                .replace_all(&text, regex::NoExpand(replacement))
                .into_owned(),
            None => text,
        }
    }
}

/// Parse a hex color value (`#RRGGBB` or `RRGGBB`) into its numeric form.
pub fn parse_color(value: &str) -> Option<u32> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

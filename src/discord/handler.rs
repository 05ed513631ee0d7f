//! Discord event handling and game-event forwarding.
//!
//! The `ready` event starts two long-lived tasks: one forwarding classified
//! game events to their configured channels, one refreshing the bot's
//! presence with the online player count. Inbound messages are screened for
//! admin commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use serenity::all::{ChannelId, Colour, CreateEmbed, CreateMessage};
use serenity::async_trait;
use serenity::gateway::ActivityData;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::discord::commands::CommandBridge;
use crate::game::api::AdminApiClient;
use crate::game::events::classify;
use crate::game::router::{OutboundEmbed, OutboundMessage, Router};

/// Presence refresh interval.
const PRESENCE_INTERVAL: Duration = Duration::from_secs(15);

/// Discord event handler wiring the bridge together.
pub struct Handler {
    router: Arc<Router>,
    bridge: CommandBridge,
    api: Option<Arc<AdminApiClient>>,
    /// Raw log lines from the tailer; taken by the first `ready`.
    line_rx: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    /// Guards the presence task across gateway reconnects.
    presence_started: AtomicBool,
    /// Events stamped before this moment are stale and skipped.
    started_at: NaiveDateTime,
}

impl Handler {
    pub fn new(
        router: Router,
        api: Option<Arc<AdminApiClient>>,
        line_rx: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self {
            router: Arc::new(router),
            bridge: CommandBridge::new(api.clone()),
            api,
            line_rx: Mutex::new(Some(line_rx)),
            presence_started: AtomicBool::new(false),
            started_at: chrono::Local::now().naive_local(),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        // The gateway can reconnect and fire `ready` again; the forwarding
        // task survives reconnects, so only start it once.
        if let Some(line_rx) = self.line_rx.lock().await.take() {
            let http = ctx.http.clone();
            let router = Arc::clone(&self.router);
            let started_at = self.started_at;
            tokio::spawn(forward_events(http, router, line_rx, started_at));
        }

        if let Some(ref api) = self.api {
            if !self.presence_started.swap(true, Ordering::SeqCst) {
                tokio::spawn(refresh_presence(ctx, Arc::clone(api)));
            }
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        self.bridge.dispatch(&ctx, &msg);
    }
}

/// Forward classified game events to their configured channels, in the
/// order the tailer produced them.
async fn forward_events(
    http: Arc<Http>,
    router: Arc<Router>,
    mut line_rx: mpsc::UnboundedReceiver<String>,
    started_at: NaiveDateTime,
) {
    while let Some(line) = line_rx.recv().await {
        if let Some(message) = outbound_for(&line, &router, started_at) {
            deliver(&http, message).await;
        }
    }

    warn!("Event forwarding task ended");
}

/// Classify one raw line and decide what, if anything, to deliver.
///
/// Noise lines, events stamped before `started_at`, and kinds without a
/// configured route all yield nothing. A parse error is confined to its
/// line: it is logged and the line is dropped.
fn outbound_for(line: &str, router: &Router, started_at: NaiveDateTime) -> Option<OutboundMessage> {
    let event = match classify(line) {
        Ok(Some(event)) => event,
        Ok(None) => return None,
        Err(e) => {
            warn!("Ignoring unparseable log line: {}", e);
            return None;
        }
    };

    // Content written before the bridge started is history, not news.
    if event.timestamp < started_at {
        return None;
    }

    router.message_for(&event)
}

/// Send one message. Transport failures are logged and swallowed; the next
/// event is unaffected.
async fn deliver(http: &Http, message: OutboundMessage) {
    let channel_id = ChannelId::new(message.channel_id);

    let mut builder = CreateMessage::new();
    if let Some(text) = message.text {
        builder = builder.content(text);
    }
    if let Some(embed) = message.embed {
        builder = builder.embed(build_embed(embed));
    }

    if let Err(e) = channel_id.send_message(http, builder).await {
        error!("Failed to deliver event message to {}: {}", channel_id, e);
    }
}

fn build_embed(spec: OutboundEmbed) -> CreateEmbed {
    let mut embed = CreateEmbed::new();
    if let Some(title) = spec.title {
        embed = embed.title(title);
    }
    if let Some(description) = spec.description {
        embed = embed.description(description);
    }
    if let Some(url) = spec.thumbnail_url {
        embed = embed.thumbnail(url);
    }
    if let Some(color) = spec.color {
        embed = embed.colour(Colour::new(color));
    }
    embed
}

/// Poll the player count and mirror it in the bot's activity.
async fn refresh_presence(ctx: Context, api: Arc<AdminApiClient>) {
    let mut ticker = tokio::time::interval(PRESENCE_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match api.player_count().await {
            Ok(count) => {
                ctx.set_activity(Some(ActivityData::playing(format!(
                    "with {count} other players"
                ))));
            }
            Err(e) => {
                warn!("Failed to update presence: {}", e);
            }
        }
    }
}

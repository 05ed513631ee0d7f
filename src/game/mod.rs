//! MotorTown server integration: log tailing, event classification,
//! message routing, and the admin Web API client.

pub mod api;
pub mod config;
pub mod events;
pub mod formatter;
pub mod router;
pub mod tailer;

pub use api::{AdminApiClient, PlayerRecord};
pub use events::{classify, EventKind, GameEvent};
pub use router::{OutboundMessage, Router};
pub use tailer::LogTailer;

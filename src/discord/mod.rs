//! Discord integration: client setup, event handling, admin commands.

pub mod bot;
pub mod commands;
pub mod handler;

pub use bot::build_client;
pub use commands::CommandBridge;
pub use handler::Handler;

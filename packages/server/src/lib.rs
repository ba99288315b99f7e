//! Heya chat relay library.
//!
//! Room-scoped WebSocket chat: every message a client sends is appended to a
//! SQLite log and fanned out to everyone in the same room.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

#[cfg(test)]
mod test_support;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::run as run_server;

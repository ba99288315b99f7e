//! Server configuration, parsed from the command line.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

/// What to do with a message the log failed to persist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PersistencePolicy {
    /// Deliver to the room anyway; the message event carries `id: null`
    #[default]
    BestEffort,
    /// Do not fan out; only the sender is told the message was dropped
    Durable,
}

/// Heya chat relay server
#[derive(Debug, Clone, Parser)]
#[command(name = "heya-server", version, about)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    /// SQLite database URL of the message log
    #[arg(long, default_value = "sqlite://chat.db")]
    pub database_url: String,

    /// Directory of the prebuilt frontend bundle
    #[arg(long, default_value = "dist")]
    pub static_dir: PathBuf,

    /// Upper bound on a single recipient's write, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub send_timeout_ms: u64,

    /// Close connections that send nothing for this many seconds
    #[arg(long)]
    pub idle_timeout_secs: Option<u64>,

    /// Frames buffered per connection before writes start waiting
    #[arg(long, default_value_t = 64)]
    pub outbound_buffer: usize,

    /// Whether fan-out requires a successful append
    #[arg(long, value_enum, default_value_t = PersistencePolicy::BestEffort)]
    pub persistence_policy: PersistencePolicy,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::parse_from(["heya-server"])
    }
}

/// Runtime settings a connection session needs
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub send_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub outbound_buffer: usize,
    pub persistence_policy: PersistencePolicy,
}

impl From<&ServerConfig> for SessionSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            send_timeout: config.send_timeout(),
            idle_timeout: config.idle_timeout(),
            outbound_buffer: config.outbound_buffer,
            persistence_policy: config.persistence_policy,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

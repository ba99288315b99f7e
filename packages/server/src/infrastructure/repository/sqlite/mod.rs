//! SQLite backed repositories.

mod message;

pub use message::SqliteMessageRepository;

//! In-memory repositories.

mod room;

pub use room::InMemoryRoomRegistry;

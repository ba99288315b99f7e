//! Infrastructure layer: storage, in-memory registry, connections and DTOs.

pub mod connection;
pub mod dto;
pub mod repository;

//! UI 層
//!
//! HTTP / WebSocket のエンドポイントと、接続ごとのセッション管理。

pub mod handler;
mod runner;
pub mod session;
mod signal;
pub mod state;

pub use runner::{build_router, run, serve};

//! Two-player chess on a shared board: move generation, check detection and
//! game-status classification, served over HTTP and WebSocket.

pub mod api;
pub mod config;
pub mod engine;
pub mod ws;

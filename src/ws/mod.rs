//! Real-time game event streaming over WebSocket.
//!
//! - [`messages`]: typed event/command envelopes.
//! - [`manager`]: per-game subscriber tracking and broadcast.
//! - [`handler`]: Axum upgrade handler and command loop.

pub mod handler;
pub mod manager;
pub mod messages;

pub use handler::ws_handler;
pub use manager::WsManager;
pub use messages::WsEvent;

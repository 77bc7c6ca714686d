//! HTTP/JSON surface over the engine and game sessions.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;

//! UI layer: axum server exposing the WebSocket endpoint and the HTTP API.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, ServerConfig, router};
pub use signal::shutdown_signal;

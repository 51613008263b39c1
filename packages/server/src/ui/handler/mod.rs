//! Request handlers.

mod http;
mod websocket;

pub use http::{get_presence, get_room_members, health_check, post_room_notice};
pub use websocket::websocket_handler;

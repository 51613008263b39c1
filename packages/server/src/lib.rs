//! Real-time room and presence hub.
//!
//! Tracks which connections are live, which rooms each connection has joined,
//! and which accounts are online, and fans out room and presence events over
//! WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

//! Domain entities.

use super::value_object::{AccountId, ConnectionId, DisplayName};

/// One (room, connection) pairing held by the membership index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    pub connection_id: ConnectionId,
    pub display_name: DisplayName,
}

impl MemberEntry {
    pub fn new(connection_id: ConnectionId, display_name: DisplayName) -> Self {
        Self {
            connection_id,
            display_name,
        }
    }
}

/// A persisted group member as reported by the durable store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomMember {
    pub account_id: AccountId,
    pub username: String,
}

impl RoomMember {
    pub fn new(account_id: AccountId, username: impl Into<String>) -> Self {
        Self {
            account_id,
            username: username.into(),
        }
    }
}

/// Who a message is attributed to when it is persisted.
///
/// `account_id` comes from the connection's authenticated identity, never
/// from the client payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageAuthor {
    pub account_id: Option<AccountId>,
    pub display_name: DisplayName,
}

/// A message after the durable store assigned its id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMessage {
    pub id: String,
    pub sender: String,
    pub text: String,
    /// Unix timestamp in milliseconds.
    pub ts: i64,
    pub account_id: Option<AccountId>,
}

//! WebSocket frame DTOs.
//!
//! Every frame is a JSON object tagged by `type`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::RoomId;

/// `type` values a client may send.
pub const CLIENT_FRAME_TYPES: [&str; 4] = ["join", "leave", "message", "list"];

/// Inbound frame as received from a client.
///
/// Ids are kept as raw JSON so conversion can report exactly which field was
/// invalid.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    #[serde(rename_all = "camelCase")]
    Join {
        room_id: Value,
        username: String,
        #[serde(default)]
        user_id: Option<Value>,
    },
    #[serde(rename_all = "camelCase")]
    Leave { room_id: Value },
    #[serde(rename_all = "camelCase")]
    Message {
        room_id: Value,
        text: String,
        #[serde(default)]
        sender: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    List { room_id: Value },
}

/// Why a raw frame could not be turned into a [`ClientFrame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Not JSON, not an object, or missing/invalid fields.
    Malformed,
    /// Well-formed JSON whose `type` is not one of [`CLIENT_FRAME_TYPES`].
    UnknownType,
}

/// Parse a raw text frame.
pub fn parse_client_frame(raw: &str) -> Result<ClientFrame, FrameError> {
    let value: Value = serde_json::from_str(raw).map_err(|_| FrameError::Malformed)?;
    if !value.is_object() {
        return Err(FrameError::Malformed);
    }

    let known = value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|kind| CLIENT_FRAME_TYPES.contains(&kind));
    if !known {
        return Err(FrameError::UnknownType);
    }

    serde_json::from_value(value).map_err(|_| FrameError::Malformed)
}

/// Member id on the wire: an account id for persisted members, a connection
/// id for live members of the presence room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemberIdDto {
    Account(i64),
    Connection(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDto {
    pub id: MemberIdDto,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: String,
    pub sender: String,
    pub text: String,
    pub ts: i64,
}

/// Outbound frame sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    #[serde(rename_all = "camelCase")]
    Joined {
        room_id: RoomId,
        members: Vec<MemberDto>,
        history: Vec<MessageDto>,
    },
    #[serde(rename_all = "camelCase")]
    MemberJoined { user: String, client_id: String },
    #[serde(rename_all = "camelCase")]
    MemberLeft { user: String, client_id: String },
    Message { message: MessageDto },
    List {
        members: Vec<MemberDto>,
        history: Vec<MessageDto>,
    },
    Error { message: String },
    #[serde(rename_all = "camelCase")]
    OnlineUsersUpdate { user_ids: Vec<i64> },
    ForbiddenWordAdded { word: String },
    ForbiddenWordRemoved { word: String },
}

impl ServerEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Serialize to a frame shared by every recipient.
    pub fn to_frame(&self) -> Result<Arc<str>, serde_json::Error> {
        serde_json::to_string(self).map(Arc::from)
    }
}

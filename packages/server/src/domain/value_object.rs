//! Value objects for the room/presence model.
//!
//! Every constructor that accepts untrusted input validates it and returns a
//! [`ValueObjectError`] instead of panicking.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Wire name of the global presence ("home") room.
pub const PRESENCE_ROOM_NAME: &str = "home";

pub const DISPLAY_NAME_MAX_CHARS: usize = 64;
pub const MESSAGE_TEXT_MAX_CHARS: usize = 4000;

/// Opaque identifier of one live transport session.
///
/// Generated server-side at connect time and never reused during the process
/// lifetime. Distinct from any [`AccountId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a fresh connection id (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Durable identity of an authenticated user, stable across reconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accepts a JSON integer or a string holding an integer.
impl TryFrom<&Value> for AccountId {
    type Error = ValueObjectError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        parse_integer(value)
            .map(Self)
            .ok_or_else(|| ValueObjectError::InvalidAccountId(value.to_string()))
    }
}

/// Identifier of a persisted group (or 1:1 conversation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A logical channel connections join to receive broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomId {
    /// A persisted group room.
    Group(GroupId),
    /// The non-persisted global presence room.
    Presence,
}

impl RoomId {
    pub fn group(id: i64) -> Self {
        Self::Group(GroupId::new(id))
    }

    pub fn is_presence(&self) -> bool {
        matches!(self, Self::Presence)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(id) => write!(f, "{id}"),
            Self::Presence => f.write_str(PRESENCE_ROOM_NAME),
        }
    }
}

impl FromStr for RoomId {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == PRESENCE_ROOM_NAME {
            return Ok(Self::Presence);
        }
        trimmed
            .parse::<i64>()
            .map(Self::group)
            .map_err(|_| ValueObjectError::InvalidRoomId(s.to_string()))
    }
}

/// Accepts a JSON integer, a string holding an integer, or the presence room name.
impl TryFrom<&Value> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => s.parse(),
            other => parse_integer(other)
                .map(Self::group)
                .ok_or_else(|| ValueObjectError::InvalidRoomId(other.to_string())),
        }
    }
}

/// Group rooms serialize as numbers, the presence room as its name.
impl Serialize for RoomId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Group(id) => serializer.serialize_i64(id.value()),
            Self::Presence => serializer.serialize_str(PRESENCE_ROOM_NAME),
        }
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(&value).map_err(de::Error::custom)
    }
}

/// Display name used for one room session. May differ from the account's
/// canonical username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.chars().count() > DISPLAY_NAME_MAX_CHARS {
            return Err(ValueObjectError::InvalidDisplayName {
                max: DISPLAY_NAME_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Chat message body. Stored and broadcast exactly as sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() || value.chars().count() > MESSAGE_TEXT_MAX_CHARS {
            return Err(ValueObjectError::InvalidMessageText {
                max: MESSAGE_TEXT_MAX_CHARS,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

//! Inbound events a connection can raise, after validation.
//!
//! The wire format is parsed in the infrastructure layer; by the time a value
//! of [`InboundEvent`] exists every id and field has been validated.

use super::value_object::{AccountId, DisplayName, MessageText, RoomId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Join(JoinRequest),
    Leave { room_id: RoomId },
    Send(SendRequest),
    List { room_id: RoomId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room_id: RoomId,
    pub display_name: DisplayName,
    pub account_id: Option<AccountId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub room_id: RoomId,
    pub text: MessageText,
    /// Display name claimed by the client. The membership entry's name is used
    /// when absent.
    pub sender: Option<DisplayName>,
}

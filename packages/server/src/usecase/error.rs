//! UseCase 層のエラー定義
//!
//! `Display` の文字列はそのまま `{type:"error", message}` としてクライアントに返す。

use thiserror::Error;

use crate::domain::{StoreError, ValueObjectError};
use crate::infrastructure::dto::websocket::FrameError;

/// 1 つのインバウンドイベントの処理失敗
///
/// どのバリアントも接続を切断しない。発生元の接続にのみ通知される。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("invalid_message")]
    InvalidMessage,

    #[error("unknown_type")]
    UnknownType,

    #[error("Invalid userId")]
    InvalidUserId,

    #[error("Invalid roomId")]
    InvalidRoomId,

    #[error("Invalid username")]
    InvalidUsername,

    #[error("Invalid message text")]
    InvalidMessageText,

    #[error("userId does not match this connection")]
    AccountMismatch,

    #[error("not_a_member")]
    NotAMember,

    #[error("Cannot send messages to the presence room")]
    PresenceRoomSend,

    #[error("Failed to load room")]
    RoomLoadFailed(#[source] StoreError),

    #[error("Failed to save message")]
    SaveFailed(#[source] StoreError),
}

impl From<FrameError> for CoordinatorError {
    fn from(error: FrameError) -> Self {
        match error {
            FrameError::Malformed => Self::InvalidMessage,
            FrameError::UnknownType => Self::UnknownType,
        }
    }
}

impl From<ValueObjectError> for CoordinatorError {
    fn from(error: ValueObjectError) -> Self {
        match error {
            ValueObjectError::InvalidAccountId(_) => Self::InvalidUserId,
            ValueObjectError::InvalidRoomId(_) => Self::InvalidRoomId,
            ValueObjectError::InvalidDisplayName { .. } => Self::InvalidUsername,
            ValueObjectError::InvalidMessageText { .. } => Self::InvalidMessageText,
        }
    }
}

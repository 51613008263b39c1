//! Conversion logic between DTOs and domain types.

use crate::domain::{
    AccountId, DisplayName, InboundEvent, JoinRequest, MemberEntry, MessageText, PersistedMessage,
    RoomId, RoomMember, SendRequest, ValueObjectError,
};
use crate::infrastructure::dto::{http as http_dto, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

/// Validate every field of an inbound frame.
impl TryFrom<dto::ClientFrame> for InboundEvent {
    type Error = ValueObjectError;

    fn try_from(frame: dto::ClientFrame) -> Result<Self, Self::Error> {
        match frame {
            dto::ClientFrame::Join {
                room_id,
                username,
                user_id,
            } => {
                let room_id = RoomId::try_from(&room_id)?;
                let account_id = user_id
                    .as_ref()
                    .filter(|value| !value.is_null())
                    .map(AccountId::try_from)
                    .transpose()?;
                Ok(Self::Join(JoinRequest {
                    room_id,
                    display_name: DisplayName::new(username)?,
                    account_id,
                }))
            }
            dto::ClientFrame::Leave { room_id } => Ok(Self::Leave {
                room_id: RoomId::try_from(&room_id)?,
            }),
            dto::ClientFrame::Message {
                room_id,
                text,
                sender,
            } => Ok(Self::Send(SendRequest {
                room_id: RoomId::try_from(&room_id)?,
                text: MessageText::new(text)?,
                sender: sender
                    .filter(|name| !name.trim().is_empty())
                    .map(DisplayName::new)
                    .transpose()?,
            })),
            dto::ClientFrame::List { room_id } => Ok(Self::List {
                room_id: RoomId::try_from(&room_id)?,
            }),
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

/// Live presence-room member, identified by connection.
impl From<&MemberEntry> for dto::MemberDto {
    fn from(entry: &MemberEntry) -> Self {
        Self {
            id: dto::MemberIdDto::Connection(entry.connection_id.as_str().to_string()),
            username: entry.display_name.as_str().to_string(),
        }
    }
}

/// Persisted group member, identified by account.
impl From<RoomMember> for dto::MemberDto {
    fn from(member: RoomMember) -> Self {
        Self {
            id: dto::MemberIdDto::Account(member.account_id.value()),
            username: member.username,
        }
    }
}

impl From<PersistedMessage> for dto::MessageDto {
    fn from(message: PersistedMessage) -> Self {
        Self {
            id: message.id,
            sender: message.sender,
            text: message.text,
            ts: message.ts,
        }
    }
}

impl From<&MemberEntry> for http_dto::RoomMemberDto {
    fn from(entry: &MemberEntry) -> Self {
        Self {
            client_id: entry.connection_id.as_str().to_string(),
            username: entry.display_name.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, GroupId};
    use serde_json::json;

    fn join_frame(room_id: serde_json::Value, user_id: Option<serde_json::Value>) -> dto::ClientFrame {
        dto::ClientFrame::Join {
            room_id,
            username: "  alice ".to_string(),
            user_id,
        }
    }

    #[test]
    fn test_join_frame_to_domain() {
        // テスト項目: join フレームが検証済みの JoinRequest に変換される
        // given (前提条件):
        let frame = join_frame(json!("42"), Some(json!(7)));

        // when (操作):
        let event = InboundEvent::try_from(frame).unwrap();

        // then (期待する結果):
        assert_eq!(
            event,
            InboundEvent::Join(JoinRequest {
                room_id: RoomId::Group(GroupId::new(42)),
                display_name: DisplayName::new("alice".to_string()).unwrap(),
                account_id: Some(AccountId::new(7)),
            })
        );
    }

    #[test]
    fn test_join_frame_with_null_user_id_is_anonymous() {
        // テスト項目: userId が null の join は匿名として扱われる
        // given (前提条件):
        let frame = join_frame(json!("home"), Some(serde_json::Value::Null));

        // when (操作):
        let event = InboundEvent::try_from(frame).unwrap();

        // then (期待する結果):
        assert!(matches!(
            event,
            InboundEvent::Join(JoinRequest {
                room_id: RoomId::Presence,
                account_id: None,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_fields_are_rejected() {
        // テスト項目: 不正な roomId / userId / text はそれぞれ対応するエラーになる
        // given (前提条件):
        let bad_room = join_frame(json!("lobby"), None);
        let bad_user = join_frame(json!(1), Some(json!("abc")));
        let bad_text = dto::ClientFrame::Message {
            room_id: json!(1),
            text: "   ".to_string(),
            sender: None,
        };

        // when (操作):
        let bad_room = InboundEvent::try_from(bad_room);
        let bad_user = InboundEvent::try_from(bad_user);
        let bad_text = InboundEvent::try_from(bad_text);

        // then (期待する結果):
        assert!(matches!(bad_room, Err(ValueObjectError::InvalidRoomId(_))));
        assert!(matches!(bad_user, Err(ValueObjectError::InvalidAccountId(_))));
        assert!(matches!(
            bad_text,
            Err(ValueObjectError::InvalidMessageText { .. })
        ));
    }

    #[test]
    fn test_domain_to_member_dtos() {
        // テスト項目: ライブメンバーは接続 ID、永続メンバーはアカウント ID で表現される
        // given (前提条件):
        let connection_id = ConnectionId::generate();
        let entry = MemberEntry::new(
            connection_id.clone(),
            DisplayName::new("bob".to_string()).unwrap(),
        );
        let member = RoomMember::new(AccountId::new(3), "carol");

        // when (操作):
        let live = dto::MemberDto::from(&entry);
        let persisted = dto::MemberDto::from(member);
        let http = http_dto::RoomMemberDto::from(&entry);

        // then (期待する結果):
        assert_eq!(
            live.id,
            dto::MemberIdDto::Connection(connection_id.as_str().to_string())
        );
        assert_eq!(persisted.id, dto::MemberIdDto::Account(3));
        assert_eq!(persisted.username, "carol");
        assert_eq!(http.client_id, connection_id.as_str());
        assert_eq!(http.username, "bob");
    }

    #[test]
    fn test_persisted_message_to_dto() {
        // テスト項目: 永続化済みメッセージがワイヤ形式の MessageDto に変換される
        // given (前提条件):
        let message = PersistedMessage {
            id: "m-1".to_string(),
            sender: "alice".to_string(),
            text: "hi".to_string(),
            ts: 1_700_000_000_000,
            account_id: Some(AccountId::new(1)),
        };

        // when (操作):
        let dto = dto::MessageDto::from(message);

        // then (期待する結果):
        assert_eq!(dto.id, "m-1");
        assert_eq!(dto.sender, "alice");
        assert_eq!(dto.text, "hi");
        assert_eq!(dto.ts, 1_700_000_000_000);
    }
}

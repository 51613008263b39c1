//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続化とルームへのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 永続化に失敗したメッセージがブロードキャストされないことを保証
//! - メッセージが接続の認証済みアカウントに紐づけて保存されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：送信者を含むルームの全参加者に配送
//! - 異常系：ストアの保存失敗、未参加のルームへの送信、プレゼンスルームへの送信

use std::sync::Arc;

use crate::domain::{
    ConnectionId, DurableStore, MessageAuthor, PersistedMessage, RoomId, SendRequest,
};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::{error::CoordinatorError, hub::ChatHub};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    hub: Arc<ChatHub>,
    store: Arc<dyn DurableStore>,
}

impl SendMessageUseCase {
    pub fn new(hub: Arc<ChatHub>, store: Arc<dyn DurableStore>) -> Self {
        Self { hub, store }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(PersistedMessage)` - 保存され、ルームにブロードキャストされたメッセージ
    /// * `Err(CoordinatorError)` - 送信失敗（ブロードキャストは行われない）
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        request: SendRequest,
    ) -> Result<PersistedMessage, CoordinatorError> {
        let RoomId::Group(group_id) = request.room_id else {
            return Err(CoordinatorError::PresenceRoomSend);
        };

        // 1. 参加者であることを確認し、送信者を決める
        let author = {
            let state = self.hub.lock().await;
            let entry = state
                .memberships
                .member(request.room_id, connection_id)
                .ok_or(CoordinatorError::NotAMember)?;
            MessageAuthor {
                account_id: state
                    .sessions
                    .get(connection_id)
                    .and_then(|session| session.account),
                display_name: request
                    .sender
                    .unwrap_or_else(|| entry.display_name.clone()),
            }
        };

        // 2. 永続化
        let message = self
            .store
            .save_message(group_id, author, request.text)
            .await
            .map_err(|e| {
                tracing::warn!(
                    "Failed to save message from '{}' in room {}: {}",
                    connection_id,
                    group_id,
                    e
                );
                CoordinatorError::SaveFailed(e)
            })?;

        // 3. await の後のメンバーにブロードキャスト（送信者を含む）
        let event = ServerEvent::Message {
            message: message.clone().into(),
        };
        let delivered = {
            let state = self.hub.lock().await;
            let targets = state.member_ids(request.room_id, None);
            self.hub.broadcaster().broadcast(&targets, &event).await
        };
        tracing::debug!(
            "Message '{}' (ts {}) delivered to {} connection(s) in room {}",
            message.id,
            message.ts,
            delivered,
            group_id
        );

        Ok(message)
    }
}

//! UseCase: ルーム退出処理

use std::sync::Arc;

use crate::domain::{ConnectionId, MemberEntry, RoomId};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::hub::ChatHub;

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    hub: Arc<ChatHub>,
}

impl LeaveRoomUseCase {
    pub fn new(hub: Arc<ChatHub>) -> Self {
        Self { hub }
    }

    /// ルーム退出を実行
    ///
    /// 参加していないルームからの leave は何もせず `None` を返す（エラーにしない）。
    /// 接続がどのルームにも参加していない状態になった場合のみプレゼンスから外す。
    pub async fn execute(&self, connection_id: &ConnectionId, room_id: RoomId) -> Option<MemberEntry> {
        let mut state = self.hub.lock().await;
        let removed = state.memberships.leave(room_id, connection_id)?;
        tracing::info!("Connection '{}' left room {}", connection_id, room_id);

        // 配送はロック区間内でキューに積む（状態の変更順と配送順を揃える）
        if !room_id.is_presence() {
            let remaining = state.member_ids(room_id, None);
            let event = ServerEvent::MemberLeft {
                user: removed.display_name.as_str().to_string(),
                client_id: connection_id.to_string(),
            };
            self.hub.broadcaster().broadcast(&remaining, &event).await;
        }

        let account = state
            .sessions
            .get(connection_id)
            .and_then(|session| session.account);
        let went_offline = match account {
            Some(account) if state.memberships.rooms_of(connection_id).is_empty() => {
                state.presence.mark_offline(account, connection_id)
            }
            _ => false,
        };

        if went_offline {
            let event = ServerEvent::OnlineUsersUpdate {
                user_ids: state.online_user_ids(),
            };
            self.hub.broadcaster().broadcast_to_all(&event).await;
        }

        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccountId;
    use crate::usecase::testing::{DrainEvents, TestHub, join_request};

    #[tokio::test]
    async fn test_leave_broadcasts_member_left_to_remaining_members() {
        // テスト項目: leave で残りの参加者に member_left が配送される
        // given (前提条件):
        let fixture = TestHub::new();
        let join = fixture.join_usecase();
        let usecase = LeaveRoomUseCase::new(fixture.hub.clone());
        let (alice, mut alice_rx) = fixture.connect().await;
        let (bob, _bob_rx) = fixture.connect().await;
        join.execute(&alice, join_request(RoomId::group(42), "alice", None))
            .await
            .unwrap();
        join.execute(&bob, join_request(RoomId::group(42), "bob", None))
            .await
            .unwrap();
        alice_rx.drain();

        // when (操作):
        let removed = usecase.execute(&bob, RoomId::group(42)).await;

        // then (期待する結果):
        assert_eq!(removed.map(|entry| entry.connection_id), Some(bob.clone()));
        assert_eq!(
            alice_rx.drain(),
            vec![ServerEvent::MemberLeft {
                user: "bob".to_string(),
                client_id: bob.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_double_leave_is_silent() {
        // テスト項目: 参加していないルームからの leave は何も配送しない
        // given (前提条件):
        let fixture = TestHub::new();
        let join = fixture.join_usecase();
        let usecase = LeaveRoomUseCase::new(fixture.hub.clone());
        let (alice, mut alice_rx) = fixture.connect().await;
        let (bob, _bob_rx) = fixture.connect().await;
        join.execute(&alice, join_request(RoomId::group(42), "alice", None))
            .await
            .unwrap();
        join.execute(&bob, join_request(RoomId::group(42), "bob", None))
            .await
            .unwrap();
        usecase.execute(&bob, RoomId::group(42)).await;
        alice_rx.drain();

        // when (操作):
        let removed = usecase.execute(&bob, RoomId::group(42)).await;

        // then (期待する結果):
        assert!(removed.is_none());
        assert!(alice_rx.drain().is_empty());
    }

    #[tokio::test]
    async fn test_leaving_last_room_takes_account_offline() {
        // テスト項目: 最後のルームから退出するとアカウントがオフラインになる
        // given (前提条件):
        let fixture = TestHub::new();
        let join = fixture.join_usecase();
        let usecase = LeaveRoomUseCase::new(fixture.hub.clone());
        let (_observer, mut observer_rx) = fixture.connect().await;
        let (alice, _alice_rx) = fixture.connect().await;
        join.execute(&alice, join_request(RoomId::Presence, "alice", Some(1)))
            .await
            .unwrap();
        join.execute(&alice, join_request(RoomId::group(42), "alice", Some(1)))
            .await
            .unwrap();
        observer_rx.drain();

        // when (操作):
        usecase.execute(&alice, RoomId::group(42)).await;
        let still_online = fixture.hub.online_account_ids().await;
        usecase.execute(&alice, RoomId::Presence).await;

        // then (期待する結果):
        assert_eq!(still_online, vec![AccountId::new(1)]);
        assert!(fixture.hub.online_account_ids().await.is_empty());
        assert_eq!(
            observer_rx.drain(),
            vec![ServerEvent::OnlineUsersUpdate { user_ids: vec![] }]
        );
    }
}

//! UseCase: 接続切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectUseCase::execute() メソッド
//! - 参加中の全ルームからの退出、プレゼンスの更新、レジストリからの削除
//!
//! ### なぜこのテストが必要か
//! - 明示的な leave と同じ形の member_left が各ルームに配送されることを保証
//! - 同じアカウントの接続が残っている間はオフライン通知しないことを確認
//! - クローズとハートビートの両方から呼ばれても二重に処理されないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：2 つのルームに参加した接続の切断
//! - エッジケース：同じ接続の二重切断、複数タブを持つアカウント

use std::sync::Arc;

use crate::domain::ConnectionId;
use crate::infrastructure::dto::websocket::ServerEvent;

use super::hub::ChatHub;

/// 接続切断のユースケース
pub struct DisconnectUseCase {
    hub: Arc<ChatHub>,
}

impl DisconnectUseCase {
    pub fn new(hub: Arc<ChatHub>) -> Self {
        Self { hub }
    }

    /// 接続切断を実行
    ///
    /// 冪等。既に切断済みの接続に対しては何もせず `false` を返す。
    pub async fn execute(&self, connection_id: &ConnectionId) -> bool {
        let mut state = self.hub.lock().await;
        let Some(session) = state.sessions.remove(connection_id) else {
            drop(state);
            self.hub.registry().unregister(connection_id).await;
            tracing::debug!("Connection '{}' already disconnected", connection_id);
            return false;
        };

        let left = state.memberships.leave_all(connection_id);
        let went_offline = session
            .account
            .map(|account| state.presence.mark_offline(account, connection_id))
            .unwrap_or(false);

        // broadcast_to_all に去った接続を含めない
        self.hub.registry().unregister(connection_id).await;

        tracing::info!(
            "Connection '{}' disconnected ({} room(s) left)",
            connection_id,
            left.len()
        );

        // 配送はロック区間内でキューに積む（状態の変更順と配送順を揃える）
        for (room_id, entry) in left {
            if room_id.is_presence() {
                continue;
            }
            tracing::debug!("Announcing departure from room {}", room_id);
            let targets = state.member_ids(room_id, None);
            let event = ServerEvent::MemberLeft {
                user: entry.display_name.into_string(),
                client_id: connection_id.to_string(),
            };
            self.hub.broadcaster().broadcast(&targets, &event).await;
        }

        if went_offline {
            let event = ServerEvent::OnlineUsersUpdate {
                user_ids: state.online_user_ids(),
            };
            self.hub.broadcaster().broadcast_to_all(&event).await;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, RoomId};
    use crate::usecase::leave_room::LeaveRoomUseCase;
    use crate::usecase::testing::{DrainEvents, TestHub, join_request};

    #[tokio::test]
    async fn test_disconnect_leaves_every_room() {
        // テスト項目: 2 つのルームに参加した接続の切断で、両ルームに member_left が配送される
        // given (前提条件):
        let fixture = TestHub::new();
        let join = fixture.join_usecase();
        let (alice, _alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        let (carol, mut carol_rx) = fixture.connect().await;
        join.execute(&alice, join_request(RoomId::group(1), "alice", None))
            .await
            .unwrap();
        join.execute(&alice, join_request(RoomId::group(2), "alice", None))
            .await
            .unwrap();
        join.execute(&bob, join_request(RoomId::group(1), "bob", None))
            .await
            .unwrap();
        join.execute(&carol, join_request(RoomId::group(2), "carol", None))
            .await
            .unwrap();
        bob_rx.drain();
        carol_rx.drain();

        // when (操作):
        let disconnected = fixture.disconnect_usecase().execute(&alice).await;

        // then (期待する結果):
        assert!(disconnected);
        let expected = vec![ServerEvent::MemberLeft {
            user: "alice".to_string(),
            client_id: alice.to_string(),
        }];
        assert_eq!(bob_rx.drain(), expected);
        assert_eq!(carol_rx.drain(), expected);
        assert!(!fixture.hub.is_connected(&alice).await);
        assert_eq!(fixture.registry.count().await, 2);
    }

    #[tokio::test]
    async fn test_disconnect_matches_explicit_leave() {
        // テスト項目: 切断で配送される member_left は明示的な leave と同じ形になる
        // given (前提条件):
        let fixture = TestHub::new();
        let join = fixture.join_usecase();
        let (alice, _alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        join.execute(&alice, join_request(RoomId::group(1), "alice", None))
            .await
            .unwrap();
        join.execute(&bob, join_request(RoomId::group(1), "bob", None))
            .await
            .unwrap();
        bob_rx.drain();

        // when (操作):
        LeaveRoomUseCase::new(fixture.hub.clone())
            .execute(&alice, RoomId::group(1))
            .await;
        let after_leave = bob_rx.drain();
        join.execute(&alice, join_request(RoomId::group(1), "alice", None))
            .await
            .unwrap();
        bob_rx.drain();
        fixture.disconnect_usecase().execute(&alice).await;
        let after_disconnect = bob_rx.drain();

        // then (期待する結果):
        assert_eq!(after_leave, after_disconnect);
        assert_eq!(after_leave.len(), 1);
    }

    #[tokio::test]
    async fn test_presence_goes_offline_only_with_last_connection() {
        // テスト項目: アカウントの最後の接続が切断されたときだけ online_users_update が配送される
        // given (前提条件):
        let fixture = TestHub::new();
        let join = fixture.join_usecase();
        let disconnect = fixture.disconnect_usecase();
        let (_observer, mut observer_rx) = fixture.connect().await;
        let (c1, _c1_rx) = fixture.connect().await;
        let (c2, _c2_rx) = fixture.connect().await;
        join.execute(&c1, join_request(RoomId::Presence, "alice", Some(1)))
            .await
            .unwrap();
        join.execute(&c2, join_request(RoomId::Presence, "alice", Some(1)))
            .await
            .unwrap();
        assert_eq!(
            observer_rx.drain(),
            vec![ServerEvent::OnlineUsersUpdate { user_ids: vec![1] }]
        );

        // when (操作):
        disconnect.execute(&c1).await;
        let after_first = observer_rx.drain();
        disconnect.execute(&c2).await;
        let after_second = observer_rx.drain();

        // then (期待する結果):
        assert!(after_first.is_empty());
        assert_eq!(
            after_second,
            vec![ServerEvent::OnlineUsersUpdate { user_ids: vec![] }]
        );
        assert!(!fixture
            .hub
            .online_account_ids()
            .await
            .contains(&AccountId::new(1)));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        // テスト項目: 同じ接続を 2 回切断しても 2 回目は何も配送しない
        // given (前提条件):
        let fixture = TestHub::new();
        let join = fixture.join_usecase();
        let disconnect = fixture.disconnect_usecase();
        let (alice, _alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        join.execute(&alice, join_request(RoomId::group(1), "alice", Some(1)))
            .await
            .unwrap();
        join.execute(&bob, join_request(RoomId::group(1), "bob", None))
            .await
            .unwrap();
        disconnect.execute(&alice).await;
        bob_rx.drain();

        // when (操作):
        let second = disconnect.execute(&alice).await;

        // then (期待する結果):
        assert!(!second);
        assert!(bob_rx.drain().is_empty());
    }
}

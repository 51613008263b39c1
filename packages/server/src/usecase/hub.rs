//! ChatHub: プロセス全体で 1 つだけ持つ接続・ルーム・プレゼンスの集約
//!
//! - 接続ごとのセッション（認証済みアカウント）
//! - [`RoomMembershipIndex`]（ルーム → 参加中の接続）
//! - [`PresenceTracker`]（アカウント → ライブ接続）
//!
//! 状態は 1 つの `Mutex` で保護する。状態の変更に伴うフレームは、ロックを保持した
//! まま各接続のキューに積む（キューは非ブロッキングなので待たない）。これで
//! 配送順が状態の変更順と一致する。ロックの取得順は hub → レジストリ。
//!
//! 永続ストアの呼び出しをまたいでロックを保持してはいけない。await の後は
//! 状態が変わっている前提で再度ロックを取って読み直すこと。

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::domain::{
    AccountId, ConnectionId, ConnectionLookup, ConnectionRegistry, EvictionSignal, MemberEntry,
    PresenceTracker, PusherChannel, RoomId, RoomMembershipIndex,
};
use crate::infrastructure::dto::websocket::ServerEvent;

use super::broadcaster::Broadcaster;

/// 1 つの接続のセッション情報
#[derive(Debug, Default, Clone)]
pub(crate) struct Session {
    /// 最初のアカウント付き join で束縛される
    pub account: Option<AccountId>,
}

#[derive(Debug, Default)]
pub(crate) struct HubState {
    pub sessions: HashMap<ConnectionId, Session>,
    pub memberships: RoomMembershipIndex,
    pub presence: PresenceTracker,
}

impl HubState {
    /// ルームの参加者の接続 ID（`except` を除く）
    pub fn member_ids(&self, room_id: RoomId, except: Option<&ConnectionId>) -> Vec<ConnectionId> {
        self.memberships
            .members_of(room_id)
            .into_iter()
            .map(|entry| entry.connection_id)
            .filter(|id| Some(id) != except)
            .collect()
    }

    pub fn online_user_ids(&self) -> Vec<i64> {
        self.presence
            .online_account_ids()
            .into_iter()
            .map(|id| id.value())
            .collect()
    }
}

pub struct ChatHub {
    registry: Arc<dyn ConnectionRegistry>,
    broadcaster: Broadcaster,
    state: Mutex<HubState>,
}

impl ChatHub {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        let lookup: Arc<dyn ConnectionLookup> = registry.clone();
        Self {
            registry,
            broadcaster: Broadcaster::new(lookup),
            state: Mutex::new(HubState::default()),
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().await
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    pub fn registry(&self) -> &Arc<dyn ConnectionRegistry> {
        &self.registry
    }

    /// 新しい接続を登録し、サーバー側で生成した接続 ID と追い出しシグナルを返す
    pub async fn connect(&self, channel: PusherChannel) -> (ConnectionId, EvictionSignal) {
        let connection_id = ConnectionId::generate();
        let evicted = self
            .registry
            .register(connection_id.clone(), channel)
            .await;
        self.lock()
            .await
            .sessions
            .insert(connection_id.clone(), Session::default());
        tracing::info!("Connection '{}' registered", connection_id);
        (connection_id, evicted)
    }

    #[cfg(test)]
    pub async fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.lock().await.sessions.contains_key(connection_id)
    }

    /// ハートビート応答を受け取った
    pub async fn mark_alive(&self, connection_id: &ConnectionId) {
        self.registry.mark_alive(connection_id).await;
    }

    /// 接続イベント以外の経路（HTTP 層など）からルームに任意のイベントを配送する
    ///
    /// # Returns
    ///
    /// 配送できた接続の数
    pub async fn notify_room(&self, room_id: RoomId, event: &ServerEvent) -> usize {
        let state = self.lock().await;
        let targets = state.member_ids(room_id, None);
        let delivered = self.broadcaster.broadcast(&targets, event).await;
        drop(state);
        tracing::debug!(
            "Room notice delivered to {}/{} members of room {}",
            delivered,
            targets.len(),
            room_id
        );
        delivered
    }

    pub async fn online_account_ids(&self) -> Vec<AccountId> {
        self.lock().await.presence.online_account_ids()
    }

    pub async fn room_members(&self, room_id: RoomId) -> Vec<MemberEntry> {
        self.lock().await.memberships.members_of(room_id)
    }

    #[cfg(test)]
    pub async fn account_of(&self, connection_id: &ConnectionId) -> Option<AccountId> {
        self.lock()
            .await
            .sessions
            .get(connection_id)
            .and_then(|session| session.account)
    }
}

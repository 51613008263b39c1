//! UseCase 層のテスト用ヘルパー

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::{
    Notify,
    mpsc::{self, UnboundedReceiver},
};

use crate::domain::{
    AccountId, ConnectionId, ConnectionLookup, ConnectionRegistry, DisplayName, DurableStore,
    EvictionSignal, GroupId, HeartbeatSweep, JoinRequest, MessageAuthor, MessageText,
    PersistedMessage, PushFrame, PusherChannel, RoomId, RoomMember, StoreError,
};
use crate::infrastructure::dto::websocket::ServerEvent;
use crate::infrastructure::{InMemoryConnectionRegistry, InMemoryDurableStore};

use super::{
    coordinator::RoomCoordinator, disconnect::DisconnectUseCase, hub::ChatHub,
    join_room::JoinRoomUseCase, send_message::SendMessageUseCase,
};

mock! {
    pub Store {}

    #[async_trait]
    impl DurableStore for Store {
        async fn get_members(&self, group_id: GroupId) -> Result<Vec<RoomMember>, StoreError>;
        async fn get_history(&self, group_id: GroupId) -> Result<Vec<PersistedMessage>, StoreError>;
        async fn save_message(
            &self,
            group_id: GroupId,
            author: MessageAuthor,
            text: MessageText,
        ) -> Result<PersistedMessage, StoreError>;
    }
}

/// 受信したテキストフレームを ServerEvent として取り出す（Ping などは読み捨て）
pub trait DrainEvents {
    fn drain(&mut self) -> Vec<ServerEvent>;
}

impl DrainEvents for UnboundedReceiver<PushFrame> {
    fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(frame) = self.try_recv() {
            if let PushFrame::Text(text) = frame {
                events.push(serde_json::from_str(&text).expect("server frame should be valid"));
            }
        }
        events
    }
}

/// `arm` の後、最初の `connection_ids` の途中で `release` まで止まるレジストリ
///
/// broadcast_to_all の対象解決中に別のタスクを割り込ませるために使う。
#[derive(Default)]
pub struct GatedRegistry {
    inner: InMemoryConnectionRegistry,
    armed: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl GatedRegistry {
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionLookup for GatedRegistry {
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<PusherChannel> {
        self.inner.lookup(connection_id).await
    }

    async fn connection_ids(&self) -> Vec<ConnectionId> {
        let ids = self.inner.connection_ids().await;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
        ids
    }
}

#[async_trait]
impl ConnectionRegistry for GatedRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        channel: PusherChannel,
    ) -> EvictionSignal {
        self.inner.register(connection_id, channel).await
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        self.inner.unregister(connection_id).await;
    }

    async fn mark_alive(&self, connection_id: &ConnectionId) {
        self.inner.mark_alive(connection_id).await;
    }

    async fn sweep_heartbeat(&self) -> HeartbeatSweep {
        self.inner.sweep_heartbeat().await
    }
}

/// テストごとに独立した ChatHub
pub struct TestHub {
    pub hub: Arc<ChatHub>,
    pub registry: Arc<InMemoryConnectionRegistry>,
    pub store: Arc<InMemoryDurableStore>,
    durable: Arc<dyn DurableStore>,
}

impl TestHub {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDurableStore::new());
        Self::build(store.clone(), store)
    }

    /// ストアを差し替える（`store` フィールドは使われない）
    pub fn with_store(durable: Arc<dyn DurableStore>) -> Self {
        Self::build(Arc::new(InMemoryDurableStore::new()), durable)
    }

    fn build(store: Arc<InMemoryDurableStore>, durable: Arc<dyn DurableStore>) -> Self {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        Self {
            hub: Arc::new(ChatHub::new(registry.clone())),
            registry,
            store,
            durable,
        }
    }

    pub async fn connect(&self) -> (ConnectionId, UnboundedReceiver<PushFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (connection_id, _evicted) = self.hub.connect(tx).await;
        (connection_id, rx)
    }

    pub fn join_usecase(&self) -> JoinRoomUseCase {
        JoinRoomUseCase::new(self.hub.clone(), self.durable.clone())
    }

    pub fn send_usecase(&self) -> SendMessageUseCase {
        SendMessageUseCase::new(self.hub.clone(), self.durable.clone())
    }

    pub fn disconnect_usecase(&self) -> DisconnectUseCase {
        DisconnectUseCase::new(self.hub.clone())
    }

    pub fn coordinator(&self) -> Arc<RoomCoordinator> {
        Arc::new(RoomCoordinator::new(self.hub.clone(), self.durable.clone()))
    }
}

pub fn display_name(name: &str) -> DisplayName {
    DisplayName::new(name.to_string()).unwrap()
}

pub fn join_request(room_id: RoomId, name: &str, account_id: Option<i64>) -> JoinRequest {
    JoinRequest {
        room_id,
        display_name: display_name(name),
        account_id: account_id.map(AccountId::new),
    }
}

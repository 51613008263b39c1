//! WebSocket 接続レジストリの実装
//!
//! ## 責務
//!
//! - 接続 ID と送信チャンネル（`PusherChannel`）の対応を管理
//! - ハートビート用の生存フラグを管理
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! このレジストリは生成された `PusherChannel` を受け取り、ID から引けるようにするだけです。
//! 実際の送信（ファンアウト）は `Broadcaster` が `ConnectionLookup` 経由で行います。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::domain::{
    ConnectionId, ConnectionLookup, ConnectionRegistry, EvictionSignal, HeartbeatSweep, PushFrame,
    PusherChannel,
};

/// レジストリに保持する接続ごとの情報
struct ConnectionEntry {
    channel: PusherChannel,
    /// 直前のプローブに応答したか
    alive: bool,
    /// 追い出し時にソケットのタスクを止める
    evicted: EvictionSignal,
}

/// インメモリの接続レジストリ
pub struct InMemoryConnectionRegistry {
    /// Key: 接続 ID, Value: 送信チャンネルと生存フラグ
    connections: Arc<Mutex<HashMap<ConnectionId, ConnectionEntry>>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self {
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// 登録中の接続数
    pub async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionLookup for InMemoryConnectionRegistry {
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<PusherChannel> {
        let connections = self.connections.lock().await;
        connections
            .get(connection_id)
            .map(|entry| entry.channel.clone())
    }

    async fn connection_ids(&self) -> Vec<ConnectionId> {
        let connections = self.connections.lock().await;
        let mut ids: Vec<ConnectionId> = connections.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        connection_id: ConnectionId,
        channel: PusherChannel,
    ) -> EvictionSignal {
        let evicted = Arc::new(Notify::new());
        let mut connections = self.connections.lock().await;
        tracing::debug!("Connection '{}' registered", connection_id);
        connections.insert(
            connection_id,
            ConnectionEntry {
                channel,
                alive: true,
                evicted: evicted.clone(),
            },
        );
        evicted
    }

    async fn unregister(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        if connections.remove(connection_id).is_some() {
            tracing::debug!("Connection '{}' unregistered", connection_id);
        }
    }

    async fn mark_alive(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        if let Some(entry) = connections.get_mut(connection_id) {
            entry.alive = true;
        }
    }

    async fn sweep_heartbeat(&self) -> HeartbeatSweep {
        let mut connections = self.connections.lock().await;
        let mut sweep = HeartbeatSweep::default();

        for (connection_id, entry) in connections.iter_mut() {
            if !entry.alive {
                // 前回のプローブに応答がない: Close を積み、キューの消化を待たずにタスクも止める
                let _ = entry.channel.send(PushFrame::Close);
                entry.evicted.notify_one();
                sweep.evicted.push(connection_id.clone());
                continue;
            }
            entry.alive = false;
            if let Err(e) = entry.channel.send(PushFrame::Ping) {
                tracing::warn!("Failed to probe connection '{}': {}", connection_id, e);
            }
            sweep.probed += 1;
        }

        sweep.evicted.sort();
        sweep
    }
}

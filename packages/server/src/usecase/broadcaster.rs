//! Broadcaster: 接続 ID の集合へのファンアウト
//!
//! ## 責務
//!
//! - ペイロードを 1 度だけシリアライズし、対象の接続それぞれに配送する
//! - 1 つの接続への配送失敗はログに残して握りつぶす（ループを止めない）
//!
//! 接続の解決は [`ConnectionLookup`] 経由で行う。具体的なマップには依存しない。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionLookup, MessagePushError, PushFrame};
use crate::infrastructure::dto::websocket::ServerEvent;

pub struct Broadcaster {
    connections: Arc<dyn ConnectionLookup>,
}

impl Broadcaster {
    pub fn new(connections: Arc<dyn ConnectionLookup>) -> Self {
        Self { connections }
    }

    /// 1 つの接続にイベントを送信
    pub async fn push_to(
        &self,
        target: &ConnectionId,
        event: &ServerEvent,
    ) -> Result<(), MessagePushError> {
        let frame = event
            .to_frame()
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        self.deliver(target, frame).await
    }

    /// 対象の接続全てにイベントを送信
    ///
    /// # Returns
    ///
    /// 配送できた接続の数。失敗した接続は warn ログのみ。
    pub async fn broadcast(&self, targets: &[ConnectionId], event: &ServerEvent) -> usize {
        if targets.is_empty() {
            return 0;
        }

        let frame = match event.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to serialize broadcast payload: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        for target in targets {
            // ブロードキャストでは一部の送信失敗を許容
            match self.deliver(target, frame.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!("Skipping connection during broadcast: {}", e),
            }
        }
        delivered
    }

    /// 登録済みの全接続にイベントを送信
    pub async fn broadcast_to_all(&self, event: &ServerEvent) -> usize {
        let targets = self.connections.connection_ids().await;
        self.broadcast(&targets, event).await
    }

    async fn deliver(&self, target: &ConnectionId, frame: Arc<str>) -> Result<(), MessagePushError> {
        let channel = self
            .connections
            .lookup(target)
            .await
            .ok_or_else(|| MessagePushError::ConnectionNotFound(target.to_string()))?;

        channel
            .send(PushFrame::Text(frame))
            .map_err(|e| MessagePushError::PushFailed(format!("{target}: {e}")))?;
        tracing::debug!("Pushed frame to connection '{}'", target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConnectionRegistry;
    use crate::infrastructure::InMemoryConnectionRegistry;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_broadcast_skips_dead_socket() {
        // テスト項目: 送信が必ず失敗する接続があっても健全な接続には配送される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let broadcaster = Broadcaster::new(registry.clone());

        let dead = ConnectionId::generate();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        drop(dead_rx);
        registry.register(dead.clone(), dead_tx).await;

        let healthy = ConnectionId::generate();
        let (healthy_tx, mut healthy_rx) = mpsc::unbounded_channel();
        registry.register(healthy.clone(), healthy_tx).await;

        let event = ServerEvent::error("hello");

        // when (操作):
        let delivered = broadcaster.broadcast(&[dead, healthy], &event).await;

        // then (期待する結果):
        assert_eq!(delivered, 1);
        let frame = healthy_rx.try_recv().unwrap();
        assert_eq!(frame, PushFrame::Text(event.to_frame().unwrap()));
    }

    #[tokio::test]
    async fn test_broadcast_to_unknown_connection_is_skipped() {
        // テスト項目: 未登録の接続 ID は無視され、エラーにならない
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let broadcaster = Broadcaster::new(registry);

        // when (操作):
        let delivered = broadcaster
            .broadcast(&[ConnectionId::generate()], &ServerEvent::error("x"))
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_reports_not_found() {
        // テスト項目: 未登録の接続への push_to は ConnectionNotFound を返す
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let broadcaster = Broadcaster::new(registry);
        let target = ConnectionId::generate();

        // when (操作):
        let result = broadcaster.push_to(&target, &ServerEvent::error("x")).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ConnectionNotFound(target.to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_to_all_reaches_every_connection() {
        // テスト項目: broadcast_to_all は登録済みの全接続に配送される
        // given (前提条件):
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let broadcaster = Broadcaster::new(registry.clone());
        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            registry.register(ConnectionId::generate(), tx).await;
            receivers.push(rx);
        }

        // when (操作):
        let delivered = broadcaster
            .broadcast_to_all(&ServerEvent::OnlineUsersUpdate { user_ids: vec![1] })
            .await;

        // then (期待する結果):
        assert_eq!(delivered, 3);
        for rx in receivers.iter_mut() {
            assert!(matches!(rx.try_recv(), Ok(PushFrame::Text(_))));
        }
    }
}

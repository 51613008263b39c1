//! RoomCoordinator: 接続ごとのプロトコル状態機械
//!
//! テキストフレームを [`InboundEvent`] に変換し、対応するユースケースに振り分ける。
//! ハンドラーは失敗を外に漏らさず、発生元の接続への `error` イベントに変換する。

use std::sync::Arc;

use crate::domain::{ConnectionId, DurableStore, EvictionSignal, InboundEvent, PusherChannel};
use crate::infrastructure::dto::websocket::{ServerEvent, parse_client_frame};

use super::{
    disconnect::DisconnectUseCase, error::CoordinatorError, hub::ChatHub,
    join_room::JoinRoomUseCase, leave_room::LeaveRoomUseCase, list_room::ListRoomUseCase,
    send_message::SendMessageUseCase,
};

pub struct RoomCoordinator {
    hub: Arc<ChatHub>,
    join_room: JoinRoomUseCase,
    leave_room: LeaveRoomUseCase,
    send_message: SendMessageUseCase,
    list_room: ListRoomUseCase,
    disconnect: DisconnectUseCase,
}

impl RoomCoordinator {
    pub fn new(hub: Arc<ChatHub>, store: Arc<dyn DurableStore>) -> Self {
        Self {
            join_room: JoinRoomUseCase::new(hub.clone(), store.clone()),
            leave_room: LeaveRoomUseCase::new(hub.clone()),
            send_message: SendMessageUseCase::new(hub.clone(), store.clone()),
            list_room: ListRoomUseCase::new(hub.clone(), store),
            disconnect: DisconnectUseCase::new(hub.clone()),
            hub,
        }
    }

    pub fn hub(&self) -> &Arc<ChatHub> {
        &self.hub
    }

    pub async fn connect(&self, channel: PusherChannel) -> (ConnectionId, EvictionSignal) {
        self.hub.connect(channel).await
    }

    /// 受信したテキストフレームを処理する
    ///
    /// 失敗は `{type:"error", message}` として発生元にだけ返す。接続は維持される。
    pub async fn handle_text(&self, connection_id: &ConnectionId, raw: &str) {
        if let Err(error) = self.dispatch(connection_id, raw).await {
            tracing::debug!(
                "Rejected frame from '{}': {:?}",
                connection_id,
                error
            );
            let event = ServerEvent::error(error.to_string());
            if let Err(e) = self.hub.broadcaster().push_to(connection_id, &event).await {
                tracing::debug!("Error event not delivered: {}", e);
            }
        }
    }

    async fn dispatch(&self, connection_id: &ConnectionId, raw: &str) -> Result<(), CoordinatorError> {
        let frame = parse_client_frame(raw)?;
        let event = InboundEvent::try_from(frame)?;
        self.handle_event(connection_id, event).await
    }

    /// 検証済みのイベントを処理する
    pub async fn handle_event(
        &self,
        connection_id: &ConnectionId,
        event: InboundEvent,
    ) -> Result<(), CoordinatorError> {
        match event {
            InboundEvent::Join(request) => self
                .join_room
                .execute(connection_id, request)
                .await
                .map(|_| ()),
            InboundEvent::Leave { room_id } => {
                self.leave_room.execute(connection_id, room_id).await;
                Ok(())
            }
            InboundEvent::Send(request) => self
                .send_message
                .execute(connection_id, request)
                .await
                .map(|_| ()),
            InboundEvent::List { room_id } => self.list_room.execute(connection_id, room_id).await,
        }
    }

    /// トランスポートの切断（クローズ、ハートビートのタイムアウト）
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> bool {
        self.disconnect.execute(connection_id).await
    }
}

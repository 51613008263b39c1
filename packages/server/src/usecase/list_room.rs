//! UseCase: ルームのメンバー・履歴の取得

use std::sync::Arc;

use crate::domain::{ConnectionId, DurableStore, RoomId};
use crate::infrastructure::dto::websocket::{MemberDto, MessageDto, ServerEvent};

use super::{error::CoordinatorError, hub::ChatHub};

pub struct ListRoomUseCase {
    hub: Arc<ChatHub>,
    store: Arc<dyn DurableStore>,
}

impl ListRoomUseCase {
    pub fn new(hub: Arc<ChatHub>, store: Arc<dyn DurableStore>) -> Self {
        Self { hub, store }
    }

    /// 要求元にだけ list を返す
    ///
    /// プレゼンスルームはメモリ上の参加者（接続 ID）、グループルームはストアの
    /// メンバーと履歴を返す。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<(), CoordinatorError> {
        let event = match room_id {
            RoomId::Presence => {
                let members = self.hub.room_members(room_id).await;
                ServerEvent::List {
                    members: members.iter().map(MemberDto::from).collect(),
                    history: Vec::new(),
                }
            }
            RoomId::Group(group_id) => {
                let members = self
                    .store
                    .get_members(group_id)
                    .await
                    .map_err(CoordinatorError::RoomLoadFailed)?;
                let history = self
                    .store
                    .get_history(group_id)
                    .await
                    .map_err(CoordinatorError::RoomLoadFailed)?;
                ServerEvent::List {
                    members: members.into_iter().map(MemberDto::from).collect(),
                    history: history.into_iter().map(MessageDto::from).collect(),
                }
            }
        };

        if let Err(e) = self.hub.broadcaster().push_to(connection_id, &event).await {
            tracing::debug!("List response not delivered: {}", e);
        }
        Ok(())
    }
}

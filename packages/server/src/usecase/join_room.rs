//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 新規参加とリロードによる再参加の区別、プレゼンスのエッジ通知
//!
//! ### なぜこのテストが必要か
//! - 再参加で member_joined が重複して配送されないことを保証
//! - 同じアカウントの 2 つ目の接続でオンライン通知が再送されないことを保証
//! - プレゼンスルーム（"home"）が永続ストアに触れないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：グループルームへの参加、プレゼンスルームへの参加
//! - 異常系：接続に束縛済みのアカウントと異なる userId、ストアの読み込み失敗
//! - エッジケース：切断済み接続からの join

use std::sync::Arc;

use crate::domain::{ConnectionId, DurableStore, JoinOutcome, JoinRequest, RoomId};
use crate::infrastructure::dto::websocket::{MemberDto, MessageDto, ServerEvent};

use super::{error::CoordinatorError, hub::ChatHub};

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    hub: Arc<ChatHub>,
    store: Arc<dyn DurableStore>,
}

impl JoinRoomUseCase {
    pub fn new(hub: Arc<ChatHub>, store: Arc<dyn DurableStore>) -> Self {
        Self { hub, store }
    }

    /// ルーム参加を実行
    ///
    /// 1. アカウントを接続に束縛し、プレゼンスに登録
    /// 2. メンバーシップに追加（新規参加かどうかは書き込み前に判定）
    /// 3. member_joined / online_users_update をブロードキャスト
    /// 4. 要求元に joined を返す（グループルームのみストアからメンバーと履歴を取得）
    ///
    /// 切断済みの接続からの join は何もしない。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        request: JoinRequest,
    ) -> Result<JoinOutcome, CoordinatorError> {
        let room_id = request.room_id;
        let Some(outcome) = self.apply(connection_id, request).await? else {
            tracing::debug!(
                "Join from '{}' ignored: connection already gone",
                connection_id
            );
            return Ok(JoinOutcome { is_new_join: false });
        };

        let joined = self.build_joined(room_id).await?;
        if let Err(e) = self.hub.broadcaster().push_to(connection_id, &joined).await {
            tracing::debug!("Joined confirmation not delivered: {}", e);
        }

        Ok(outcome)
    }

    /// 状態の変更と、それに伴うブロードキャストのキュー投入
    ///
    /// フレームはロックを保持したままキューに積む。並行する join / leave / 切断の
    /// online_users_update が状態の変更順と異なる順で届くことはない。
    async fn apply(
        &self,
        connection_id: &ConnectionId,
        request: JoinRequest,
    ) -> Result<Option<JoinOutcome>, CoordinatorError> {
        let mut state = self.hub.lock().await;

        let account = {
            let Some(session) = state.sessions.get_mut(connection_id) else {
                return Ok(None);
            };
            match (session.account, request.account_id) {
                (Some(bound), Some(requested)) if bound != requested => {
                    return Err(CoordinatorError::AccountMismatch);
                }
                (None, Some(requested)) => session.account = Some(requested),
                _ => {}
            }
            session.account
        };

        let came_online = account
            .map(|account| state.presence.mark_online(account, connection_id.clone()))
            .unwrap_or(false);

        let display_name = request.display_name.as_str().to_string();
        let outcome = state.memberships.join(
            request.room_id,
            connection_id.clone(),
            request.display_name,
        );

        tracing::info!(
            "Connection '{}' joined room {} (new: {}, account: {:?})",
            connection_id,
            request.room_id,
            outcome.is_new_join,
            account.map(|a| a.value())
        );

        if outcome.is_new_join && !request.room_id.is_presence() {
            let targets = state.member_ids(request.room_id, Some(connection_id));
            let event = ServerEvent::MemberJoined {
                user: display_name,
                client_id: connection_id.to_string(),
            };
            self.hub.broadcaster().broadcast(&targets, &event).await;
        }

        if came_online {
            let event = ServerEvent::OnlineUsersUpdate {
                user_ids: state.online_user_ids(),
            };
            self.hub.broadcaster().broadcast_to_all(&event).await;
        }

        Ok(Some(outcome))
    }

    async fn build_joined(&self, room_id: RoomId) -> Result<ServerEvent, CoordinatorError> {
        let RoomId::Group(group_id) = room_id else {
            return Ok(ServerEvent::Joined {
                room_id,
                members: Vec::new(),
                history: Vec::new(),
            });
        };

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

        Ok(ServerEvent::Joined {
            room_id,
            members: members.into_iter().map(MemberDto::from).collect(),
            history: history.into_iter().map(MessageDto::from).collect(),
        })
    }
}

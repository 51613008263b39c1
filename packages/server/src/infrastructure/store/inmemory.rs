//! InMemory DurableStore 実装
//!
//! ドメイン層が定義する DurableStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! グループのメンバーは `add_member` で事前に投入します（本来は CRUD 層が管理するデータ）。
//! メッセージ ID は UUID v4、タイムスタンプは注入された `Clock` から採番します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    DurableStore, GroupId, MessageAuthor, MessageText, PersistedMessage, RoomMember, StoreError,
};
use yoriai_shared::time::{Clock, SystemClock};

/// 1 グループ分の永続データ
#[derive(Debug, Default)]
struct GroupRecord {
    members: Vec<RoomMember>,
    messages: Vec<PersistedMessage>,
}

/// インメモリ DurableStore 実装
pub struct InMemoryDurableStore {
    groups: Arc<Mutex<HashMap<GroupId, GroupRecord>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDurableStore {
    /// システム時計を使う InMemoryDurableStore を作成
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// 時計を指定して InMemoryDurableStore を作成（テスト用）
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            groups: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// グループにメンバーを追加（同じアカウントの場合はユーザー名を更新）
    pub async fn add_member(&self, group_id: GroupId, member: RoomMember) {
        let mut groups = self.groups.lock().await;
        let record = groups.entry(group_id).or_default();
        match record
            .members
            .iter_mut()
            .find(|m| m.account_id == member.account_id)
        {
            Some(existing) => existing.username = member.username,
            None => record.members.push(member),
        }
    }

    /// グループのメッセージ件数
    pub async fn count_messages(&self, group_id: GroupId) -> usize {
        let groups = self.groups.lock().await;
        groups.get(&group_id).map_or(0, |record| record.messages.len())
    }
}

impl Default for InMemoryDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableStore for InMemoryDurableStore {
    async fn get_members(&self, group_id: GroupId) -> Result<Vec<RoomMember>, StoreError> {
        let groups = self.groups.lock().await;
        Ok(groups
            .get(&group_id)
            .map(|record| record.members.clone())
            .unwrap_or_default())
    }

    async fn get_history(&self, group_id: GroupId) -> Result<Vec<PersistedMessage>, StoreError> {
        let groups = self.groups.lock().await;
        Ok(groups
            .get(&group_id)
            .map(|record| record.messages.clone())
            .unwrap_or_default())
    }

    async fn save_message(
        &self,
        group_id: GroupId,
        author: MessageAuthor,
        text: MessageText,
    ) -> Result<PersistedMessage, StoreError> {
        let message = PersistedMessage {
            id: Uuid::new_v4().to_string(),
            sender: author.display_name.into_string(),
            text: text.into_string(),
            ts: self.clock.now_millis(),
            account_id: author.account_id,
        };

        let mut groups = self.groups.lock().await;
        groups
            .entry(group_id)
            .or_default()
            .messages
            .push(message.clone());
        tracing::debug!("Message '{}' saved to group {}", message.id, group_id);

        Ok(message)
    }
}

//! Durable store trait.
//!
//! The persistence layer for groups and messages lives outside this crate.
//! The coordinator only depends on this trait; the infrastructure layer
//! provides implementations.

use async_trait::async_trait;

use super::{
    entity::{MessageAuthor, PersistedMessage, RoomMember},
    error::StoreError,
    value_object::{GroupId, MessageText},
};

/// Durable store for group membership and message history.
///
/// Every call is a suspension point for the caller: in-memory room state may
/// change while it is outstanding.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Persisted members of the group.
    async fn get_members(&self, group_id: GroupId) -> Result<Vec<RoomMember>, StoreError>;

    /// Message history of the group, oldest first.
    async fn get_history(&self, group_id: GroupId) -> Result<Vec<PersistedMessage>, StoreError>;

    /// Persist a message and return it with its server-assigned id and timestamp.
    async fn save_message(
        &self,
        group_id: GroupId,
        author: MessageAuthor,
        text: MessageText,
    ) -> Result<PersistedMessage, StoreError>;
}

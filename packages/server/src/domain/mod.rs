//! Domain layer: value objects, entities, and the in-memory indexes that make
//! up the room/presence model.
//!
//! Traits for the collaborators the domain needs (durable store, connection
//! registry) are declared here and implemented by the infrastructure layer.

pub mod connection;
pub mod entity;
pub mod error;
pub mod event;
pub mod membership;
pub mod presence;
pub mod store;
pub mod value_object;

pub use connection::{
    ConnectionLookup, ConnectionRegistry, EvictionSignal, HeartbeatSweep, PushFrame,
    PusherChannel,
};
pub use entity::{MemberEntry, MessageAuthor, PersistedMessage, RoomMember};
pub use error::{MessagePushError, StoreError, ValueObjectError};
pub use event::{InboundEvent, JoinRequest, SendRequest};
pub use membership::{JoinOutcome, RoomMembershipIndex};
pub use presence::PresenceTracker;
pub use store::DurableStore;
pub use value_object::{
    AccountId, ConnectionId, DisplayName, GroupId, MessageText, PRESENCE_ROOM_NAME, RoomId,
};

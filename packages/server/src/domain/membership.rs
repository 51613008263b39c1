//! Room membership index.
//!
//! Maps a room to the connections currently joined to it, in join order.
//! A room exists only while it has at least one member; the key is removed
//! when the last member leaves.

use std::collections::HashMap;

use super::{
    entity::MemberEntry,
    value_object::{ConnectionId, DisplayName, RoomId},
};

/// Outcome of [`RoomMembershipIndex::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// `false` when the connection was already a member (e.g. a page refresh).
    pub is_new_join: bool,
}

/// Room id → ordered membership entries.
///
/// Invariant: a connection appears at most once per room.
#[derive(Debug, Default)]
pub struct RoomMembershipIndex {
    rooms: HashMap<RoomId, Vec<MemberEntry>>,
}

impl RoomMembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the membership, or update the display name in place if the
    /// connection is already a member.
    pub fn join(
        &mut self,
        room_id: RoomId,
        connection_id: ConnectionId,
        display_name: DisplayName,
    ) -> JoinOutcome {
        let members = self.rooms.entry(room_id).or_default();
        match members
            .iter_mut()
            .find(|entry| entry.connection_id == connection_id)
        {
            Some(existing) => {
                existing.display_name = display_name;
                JoinOutcome { is_new_join: false }
            }
            None => {
                members.push(MemberEntry::new(connection_id, display_name));
                JoinOutcome { is_new_join: true }
            }
        }
    }

    /// Remove the membership. Returns the removed entry, or `None` if the
    /// connection was not a member.
    pub fn leave(&mut self, room_id: RoomId, connection_id: &ConnectionId) -> Option<MemberEntry> {
        let members = self.rooms.get_mut(&room_id)?;
        let position = members
            .iter()
            .position(|entry| &entry.connection_id == connection_id)?;
        let removed = members.remove(position);
        if members.is_empty() {
            self.rooms.remove(&room_id);
        }
        Some(removed)
    }

    /// Remove the connection from every room it belongs to.
    ///
    /// Returned pairs are ordered by room id so callers emit deterministic
    /// broadcasts.
    pub fn leave_all(&mut self, connection_id: &ConnectionId) -> Vec<(RoomId, MemberEntry)> {
        self.rooms_of(connection_id)
            .into_iter()
            .filter_map(|room_id| {
                self.leave(room_id, connection_id)
                    .map(|entry| (room_id, entry))
            })
            .collect()
    }

    /// Members of the room in join order. Empty for an unknown room.
    pub fn members_of(&self, room_id: RoomId) -> Vec<MemberEntry> {
        self.rooms.get(&room_id).cloned().unwrap_or_default()
    }

    pub fn member(&self, room_id: RoomId, connection_id: &ConnectionId) -> Option<&MemberEntry> {
        self.rooms
            .get(&room_id)?
            .iter()
            .find(|entry| &entry.connection_id == connection_id)
    }

    pub fn is_member(&self, room_id: RoomId, connection_id: &ConnectionId) -> bool {
        self.member(room_id, connection_id).is_some()
    }

    /// Rooms the connection belongs to, sorted.
    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, members)| {
                members
                    .iter()
                    .any(|entry| &entry.connection_id == connection_id)
            })
            .map(|(room_id, _)| *room_id)
            .collect();
        rooms.sort();
        rooms
    }

    #[cfg(test)]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

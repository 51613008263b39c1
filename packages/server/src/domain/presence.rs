//! Per-account presence tracking.
//!
//! Presence is keyed by account, not by connection: a person with several
//! tabs or devices open is one online account. Only the 0→1 and 1→0
//! connection-count edges are reported to the caller.

use std::collections::{HashMap, HashSet};

use super::value_object::{AccountId, ConnectionId};

/// Account id → ids of the connections currently authenticated as it.
///
/// Invariant: a key is present iff its set is non-empty.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    online: HashMap<AccountId, HashSet<ConnectionId>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `connection_id` to the account's set.
    ///
    /// Returns `true` only if this is the account's first live connection.
    pub fn mark_online(&mut self, account_id: AccountId, connection_id: ConnectionId) -> bool {
        let was_offline = !self.online.contains_key(&account_id);
        self.online
            .entry(account_id)
            .or_default()
            .insert(connection_id);
        was_offline
    }

    /// Remove `connection_id` from the account's set, deleting the key when it
    /// empties.
    ///
    /// Returns `true` only if this removal took the account fully offline.
    /// Removing a connection that is not in the set changes nothing.
    pub fn mark_offline(&mut self, account_id: AccountId, connection_id: &ConnectionId) -> bool {
        let Some(connections) = self.online.get_mut(&account_id) else {
            return false;
        };
        if !connections.remove(connection_id) {
            return false;
        }
        if connections.is_empty() {
            self.online.remove(&account_id);
            return true;
        }
        false
    }

    /// Snapshot of the online accounts, sorted ascending.
    pub fn online_account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.online.keys().copied().collect();
        ids.sort();
        ids
    }

    #[cfg(test)]
    pub fn is_online(&self, account_id: AccountId) -> bool {
        self.online.contains_key(&account_id)
    }

    #[cfg(test)]
    pub fn connection_count(&self, account_id: AccountId) -> usize {
        self.online.get(&account_id).map_or(0, HashSet::len)
    }
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human escalation list.

use tracing::{debug, info};

use parley_core::{Account, HumanEscalationList, ParleyError, RoomId};

use crate::store::{variable_key, PolicyStore, Purpose};

/// Reads the rooms flagged for human handling and releases them.
#[derive(Clone)]
pub struct EscalationBook {
    store: PolicyStore,
}

impl EscalationBook {
    pub fn new(store: PolicyStore) -> Self {
        Self { store }
    }

    pub async fn load(&self, account: &Account) -> Result<HumanEscalationList, ParleyError> {
        let rooms = self.store.load_room_ids(account, Purpose::HumanRooms).await?;
        debug!(account_id = %account.id, count = rooms.len(), "escalation list loaded");
        Ok(HumanEscalationList(rooms.into_iter().collect()))
    }

    /// Remove `room_id` from `list` and persist the whole list.
    ///
    /// Releasing a room that is not flagged returns the list unchanged
    /// without writing.
    pub async fn release(
        &self,
        account: &Account,
        list: &HumanEscalationList,
        room_id: &RoomId,
    ) -> Result<HumanEscalationList, ParleyError> {
        if !list.contains(room_id) {
            debug!(account_id = %account.id, room_id = %room_id, "room not escalated, nothing to release");
            return Ok(list.clone());
        }
        let mut next = list.clone();
        next.0.remove(room_id);
        let rooms: Vec<RoomId> = next.0.iter().cloned().collect();
        self.store
            .write_room_ids(variable_key(account, Purpose::HumanRooms), &rooms)
            .await?;
        info!(account_id = %account.id, room_id = %room_id, "escalation released");
        Ok(next)
    }
}

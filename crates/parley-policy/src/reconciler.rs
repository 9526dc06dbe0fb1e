// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room list reconciliation.
//!
//! A toggle is planned as a pure function of the current policy, then the
//! planned whole-list writes are applied one after another. Adding a room
//! to one override list always removes it from the other, so a room found
//! in both (remote state written by someone else) is repaired by the next
//! toggle that touches it.
//!
//! The repair write goes first. If it fails nothing changed and the
//! caller keeps the original policy. If it succeeds and the primary write
//! then fails, the caller keeps the repaired policy: the repair is
//! already persisted and reverting it would reintroduce the conflict.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use parley_core::{Account, AutomationPolicy, ChatKind, ListKind, ParleyError, RoomId, RoomRef};

use crate::store::PolicyStore;

/// What a failed policy change was aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleTarget {
    Room(RoomId),
    Global(ChatKind),
}

impl fmt::Display for ToggleTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleTarget::Room(id) => write!(f, "room {id}"),
            ToggleTarget::Global(kind) => write!(f, "{kind} chat global toggle"),
        }
    }
}

/// A policy change that could not be fully persisted.
///
/// `policy` is what the remote store now holds, and what the caller must
/// adopt in place of its optimistic value.
#[derive(Debug, Error)]
#[error("failed to persist automation change for {target}")]
pub struct ToggleError {
    pub target: ToggleTarget,
    pub policy: AutomationPolicy,
    #[source]
    pub source: ParleyError,
}

/// One whole-list replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListWrite {
    pub kind: ChatKind,
    pub list: ListKind,
    pub rooms: Vec<RoomId>,
}

/// The writes a toggle needs and the policy after each of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TogglePlan {
    /// Removes the room from the opposite list when it was found there.
    pub repair: Option<ListWrite>,
    /// Policy once `repair` is persisted.
    pub repaired: AutomationPolicy,
    pub primary: Option<ListWrite>,
    /// Policy once every write is persisted.
    pub next: AutomationPolicy,
}

impl TogglePlan {
    pub fn is_noop(&self) -> bool {
        self.repair.is_none() && self.primary.is_none()
    }
}

fn opposite(list: ListKind) -> ListKind {
    match list {
        ListKind::Enabled => ListKind::Disabled,
        ListKind::Disabled => ListKind::Enabled,
    }
}

fn list_write(policy: &AutomationPolicy, kind: ChatKind, list: ListKind) -> ListWrite {
    ListWrite {
        kind,
        list,
        rooms: policy.list(list).ids_of(kind),
    }
}

/// Plan the list changes that make `room` resolve to `new_state`.
///
/// Writes target the list key of the chat kind a room was listed under,
/// so a room is always removed from the list it was loaded from.
pub fn plan_toggle(room: &RoomRef, new_state: bool, policy: &AutomationPolicy) -> TogglePlan {
    let kind = room.kind();
    let id = &room.room_id;
    // Under a global "on" the disabled list holds exceptions; under "off" the enabled list does.
    let (list, add) = match (policy.global_enabled(kind), new_state) {
        (true, false) => (ListKind::Disabled, true),
        (true, true) => (ListKind::Disabled, false),
        (false, true) => (ListKind::Enabled, true),
        (false, false) => (ListKind::Enabled, false),
    };

    let mut repaired = policy.clone();
    let mut repair = None;
    if add {
        let other = opposite(list);
        if let Some(listed_as) = repaired.list(other).kind_of(id) {
            repaired.list_mut(other).remove(id);
            repair = Some(list_write(&repaired, listed_as, other));
        }
    }

    let mut next = repaired.clone();
    let primary = if add {
        next.list_mut(list)
            .insert(id.clone(), kind)
            .then(|| list_write(&next, kind, list))
    } else {
        match next.list(list).kind_of(id) {
            Some(listed_as) => {
                next.list_mut(list).remove(id);
                Some(list_write(&next, listed_as, list))
            }
            None => None,
        }
    };

    TogglePlan {
        repair,
        repaired,
        primary,
        next,
    }
}

/// Applies toggles and global switches to the remote policy store.
#[derive(Clone)]
pub struct Reconciler {
    store: PolicyStore,
}

impl Reconciler {
    pub fn new(store: PolicyStore) -> Self {
        Self { store }
    }

    /// Set the automation state of one room and persist the changed lists.
    ///
    /// On success the returned policy holds the room in at most one
    /// override list. On failure the error carries the policy to adopt.
    pub async fn toggle(
        &self,
        account: &Account,
        room: &RoomRef,
        new_state: bool,
        policy: &AutomationPolicy,
    ) -> Result<AutomationPolicy, ToggleError> {
        let plan = plan_toggle(room, new_state, policy);
        if plan.is_noop() {
            debug!(room_id = %room.room_id, new_state, "toggle needs no writes");
            return Ok(plan.next);
        }

        if let Some(write) = &plan.repair {
            if let Err(source) = self.apply(account, write).await {
                warn!(room_id = %room.room_id, error = %source, "repair write failed, keeping original policy");
                return Err(ToggleError {
                    target: ToggleTarget::Room(room.room_id.clone()),
                    policy: policy.clone(),
                    source,
                });
            }
            info!(room_id = %room.room_id, list = %write.list, "removed room from opposite override list");
        }

        if let Some(write) = &plan.primary {
            if let Err(source) = self.apply(account, write).await {
                warn!(
                    room_id = %room.room_id,
                    error = %source,
                    repaired = plan.repair.is_some(),
                    "override list write failed, reverting toggle"
                );
                return Err(ToggleError {
                    target: ToggleTarget::Room(room.room_id.clone()),
                    policy: plan.repaired,
                    source,
                });
            }
        }

        info!(account_id = %account.id, room_id = %room.room_id, new_state, "automation toggle persisted");
        Ok(plan.next)
    }

    /// Switch the account-wide default for one chat kind.
    pub async fn set_global(
        &self,
        account: &Account,
        kind: ChatKind,
        enabled: bool,
        policy: &AutomationPolicy,
    ) -> Result<AutomationPolicy, ToggleError> {
        let mut next = policy.clone();
        next.set_global(kind, enabled);
        if next == *policy {
            return Ok(next);
        }
        if let Err(source) = self.store.write_global(account, kind, enabled).await {
            warn!(account_id = %account.id, %kind, error = %source, "global toggle write failed");
            return Err(ToggleError {
                target: ToggleTarget::Global(kind),
                policy: policy.clone(),
                source,
            });
        }
        info!(account_id = %account.id, %kind, enabled, "global automation toggle persisted");
        Ok(next)
    }

    async fn apply(&self, account: &Account, write: &ListWrite) -> Result<(), ParleyError> {
        self.store
            .write_list(account, write.kind, write.list, &write.rooms)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve;

    fn room_id(id: &str) -> RoomId {
        RoomId::from(id)
    }

    #[test]
    fn global_on_toggle_off_adds_to_disabled() {
        let policy = AutomationPolicy {
            single_chat_global_enabled: true,
            ..Default::default()
        };
        let room = RoomRef::new("R1", false);
        let plan = plan_toggle(&room, false, &policy);
        assert!(plan.repair.is_none());
        assert_eq!(
            plan.primary,
            Some(ListWrite {
                kind: ChatKind::Single,
                list: ListKind::Disabled,
                rooms: vec![room_id("R1")],
            })
        );
        assert!(!resolve(&room, &plan.next));
    }

    #[test]
    fn global_off_toggle_on_repairs_conflict() {
        let mut policy = AutomationPolicy::default();
        policy.enabled_rooms.insert(room_id("R2"), ChatKind::Group);
        policy.disabled_rooms.insert(room_id("R2"), ChatKind::Group);

        let plan = plan_toggle(&RoomRef::new("R2", true), true, &policy);
        assert_eq!(
            plan.repair,
            Some(ListWrite {
                kind: ChatKind::Group,
                list: ListKind::Disabled,
                rooms: vec![],
            })
        );
        // Already in the enabled list, so only the repair is written.
        assert!(plan.primary.is_none());
        assert!(plan.next.enabled_rooms.contains(&room_id("R2")));
        assert!(plan.next.disabled_rooms.is_empty());
    }

    #[test]
    fn removal_targets_the_kind_the_room_was_listed_under() {
        let mut policy = AutomationPolicy::default();
        policy.enabled_rooms.insert(room_id("X"), ChatKind::Group);
        policy.enabled_rooms.insert(room_id("Y"), ChatKind::Single);

        let plan = plan_toggle(&RoomRef::new("X", false), false, &policy);
        assert_eq!(
            plan.primary,
            Some(ListWrite {
                kind: ChatKind::Group,
                list: ListKind::Enabled,
                rooms: vec![],
            })
        );
        assert!(plan.next.enabled_rooms.contains(&room_id("Y")));
    }

    #[test]
    fn global_on_toggle_off_also_clears_enabled_entry() {
        let mut policy = AutomationPolicy {
            group_chat_global_enabled: true,
            ..Default::default()
        };
        policy.enabled_rooms.insert(room_id("G1"), ChatKind::Group);

        let plan = plan_toggle(&RoomRef::new("G1", true), false, &policy);
        assert_eq!(plan.repair.as_ref().map(|w| w.list), Some(ListKind::Enabled));
        assert_eq!(plan.primary.as_ref().map(|w| w.list), Some(ListKind::Disabled));
        assert!(plan.next.conflicts().is_empty());
    }

    #[test]
    fn setting_current_state_plans_nothing() {
        let mut policy = AutomationPolicy {
            single_chat_global_enabled: true,
            ..Default::default()
        };
        policy.disabled_rooms.insert(room_id("R1"), ChatKind::Single);
        policy.enabled_rooms.insert(room_id("R3"), ChatKind::Group);

        for (room, state) in [
            (RoomRef::new("R1", false), false),
            (RoomRef::new("R2", false), true),
            (RoomRef::new("R3", true), true),
            (RoomRef::new("G9", true), false),
        ] {
            let plan = plan_toggle(&room, state, &policy);
            assert!(plan.is_noop(), "{room:?} -> {state}");
            assert_eq!(plan.next, policy);
        }
    }

    #[test]
    fn toggle_target_display() {
        assert_eq!(ToggleTarget::Room(room_id("R1")).to_string(), "room R1");
        assert_eq!(
            ToggleTarget::Global(ChatKind::Group).to_string(),
            "group chat global toggle"
        );
    }
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy-changing commands: `parley toggle` and `parley release`.

use std::io::Write;

use parley_core::{Account, ParleyError, RoomId, RoomRef};
use parley_policy::{EscalationBook, PolicyStore, Reconciler, resolve};
use tracing::info;

use crate::inspect::io_error;

/// Turn automation on or off for one room and report the stored outcome.
pub async fn run_toggle(
    policy_store: &PolicyStore,
    account: &Account,
    room: &RoomRef,
    new_state: bool,
    out: &mut impl Write,
) -> Result<(), ParleyError> {
    let policy = policy_store.load_policy(account).await?;
    let reconciler = Reconciler::new(policy_store.clone());
    let next = reconciler
        .toggle(account, room, new_state, &policy)
        .await
        .map_err(|e| e.source)?;

    info!(account_id = %account.id, room_id = %room.room_id, enabled = new_state, "automation toggled");
    let state = if resolve(room, &next) { "on" } else { "off" };
    writeln!(out, "{} {}: automation {state}", room.kind(), room.room_id).map_err(io_error)?;
    Ok(())
}

/// Hand an escalated room back to automation.
pub async fn run_release(
    policy_store: &PolicyStore,
    account: &Account,
    room_id: &RoomId,
    out: &mut impl Write,
) -> Result<(), ParleyError> {
    let book = EscalationBook::new(policy_store.clone());
    let list = book.load(account).await?;
    if !list.contains(room_id) {
        writeln!(out, "{room_id} is not escalated").map_err(io_error)?;
        return Ok(());
    }
    let remaining = book.release(account, &list, room_id).await?;
    writeln!(out, "{room_id} released, {} rooms still escalated", remaining.len())
        .map_err(io_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::services;
    use parley_test_utils::fixtures::account;

    #[tokio::test]
    async fn toggle_repairs_and_reports_state() {
        let s = services().await;
        s.variables.insert("Sales_A_group_enabled_rooms", r#"["G1"]"#).await;
        s.variables.insert("Sales_A_group_disabled_rooms", r#"["G1"]"#).await;

        let mut buf = Vec::new();
        run_toggle(
            &s.policy_store,
            &account("A", "Sales", ""),
            &RoomRef::new("G1", true),
            true,
            &mut buf,
        )
        .await
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "group G1: automation on\n");
        assert!(s.variables.list("Sales_A_group_disabled_rooms").await.is_empty());
        assert_eq!(s.variables.list("Sales_A_group_enabled_rooms").await, vec!["G1"]);
    }

    #[tokio::test]
    async fn toggle_failure_surfaces_store_error() {
        let s = services().await;
        s.variables.fail_next_writes(1).await;
        let mut buf = Vec::new();
        let err = run_toggle(
            &s.policy_store,
            &account("A", "Sales", ""),
            &RoomRef::new("R1", false),
            true,
            &mut buf,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ParleyError::VariableStore { .. }));
        assert!(buf.is_empty());
    }

    #[tokio::test]
    async fn release_reports_remaining() {
        let s = services().await;
        s.variables.insert("Sales_A_human_rooms", r#"["R1","R2"]"#).await;
        let account = account("A", "Sales", "");

        let mut buf = Vec::new();
        run_release(&s.policy_store, &account, &RoomId::from("R1"), &mut buf)
            .await
            .unwrap();
        run_release(&s.policy_store, &account, &RoomId::from("R9"), &mut buf)
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "R1 released, 1 rooms still escalated\nR9 is not escalated\n"
        );
        assert_eq!(s.variables.write_count().await, 1);
    }
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Console session behavior against in-memory services, on paused time.

use std::sync::Arc;
use std::time::Duration;

use parley_config::ParleyConfig;
use parley_core::{AccountId, ChatKind, ParleyError, RoomId, RoomRef};
use parley_console::{ConsoleServices, ConsoleSession, NoticeLevel, SyncState};
use parley_test_utils::fixtures::{account, personal_text, room, room_with_preview};
use parley_test_utils::{
    MemoryVariableStore, MockDirectory, MockOfficialStore, MockPersonalStore, MockWorkflow,
};

const TICK: Duration = Duration::from_millis(3000);

struct Harness {
    directory: Arc<MockDirectory>,
    variables: Arc<MemoryVariableStore>,
    personal: Arc<MockPersonalStore>,
    workflow: Arc<MockWorkflow>,
    session: ConsoleSession,
}

async fn harness_with(config: ParleyConfig) -> Harness {
    let directory = Arc::new(MockDirectory::new());
    let variables = Arc::new(MemoryVariableStore::new());
    let personal = Arc::new(MockPersonalStore::new());
    let official = Arc::new(MockOfficialStore::new());
    let workflow = Arc::new(MockWorkflow::new());

    directory
        .set_accounts(vec![
            account("A", "Sales", "10.0.0.1"),
            account("B", "Support", "10.0.0.2"),
        ])
        .await;
    directory
        .set_rooms(
            "A",
            vec![room_with_preview("R1", false, "old"), room("G1", true)],
        )
        .await;
    directory.set_counter("A", 1).await;
    directory.set_rooms("B", vec![room("R9", false)]).await;
    directory.set_counter("B", 1).await;
    variables.insert("Sales_A_single_chat_ai", "true").await;
    personal
        .set_records("A", "R1", vec![personal_text("m1", "peer", "hello", "10:00")])
        .await;

    let session = ConsoleSession::new(
        &config,
        ConsoleServices {
            directory: directory.clone(),
            variables: variables.clone(),
            personal: personal.clone(),
            official,
            workflow: workflow.clone(),
        },
    );
    Harness {
        directory,
        variables,
        personal,
        workflow,
        session,
    }
}

async fn harness() -> Harness {
    harness_with(ParleyConfig::default()).await
}

async fn advance(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Sleep just past `n` poll ticks so every due tick has been handled.
async fn advance_ticks(n: u32) {
    advance(TICK * n + Duration::from_millis(100)).await;
}

#[tokio::test(start_paused = true)]
async fn selecting_an_account_loads_state_and_starts_sync() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();

    let view = h.session.view().await;
    assert!(view.policy_loaded);
    assert!(view.policy.single_chat_global_enabled);
    assert_eq!(view.rooms.len(), 2);
    assert!(view.room_automation(&RoomRef::new("R1", false)));
    assert!(!view.room_automation(&RoomRef::new("G1", true)));

    advance(Duration::from_millis(10)).await;
    assert_eq!(h.session.sync_state().await, SyncState::Polling);
    // Started with the counter read during selection as baseline.
    assert_eq!(h.directory.room_fetch_count().await, 1);
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn toggle_persists_and_updates_policy() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();

    let room = RoomRef::new("R1", false);
    assert!(!h.session.toggle_automation(&room, false).await.unwrap());
    assert!(!h.session.room_automation(&room).await);
    assert_eq!(
        h.variables.list("Sales_A_single_disabled_rooms").await,
        vec!["R1"]
    );
    assert!(h.session.take_notices().await.is_empty());
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn failed_toggle_reverts_and_notifies() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();

    h.variables.fail_next_writes(1).await;
    let room = RoomRef::new("R1", false);
    let err = h.session.toggle_automation(&room, false).await.unwrap_err();
    assert!(err.is_transient());
    assert!(h.session.room_automation(&room).await);

    let notices = h.session.take_notices().await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].text.contains("R1"));
    assert!(h.session.take_notices().await.is_empty());
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn global_switch_is_persisted() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();

    h.session
        .set_global_automation(ChatKind::Group, true)
        .await
        .unwrap();
    let view = h.session.view().await;
    assert!(view.global_automation(ChatKind::Group));
    assert!(view.room_automation(&RoomRef::new("G1", true)));
    assert_eq!(
        h.variables.value("Sales_A_group_chat_ai").await.as_deref(),
        Some("true")
    );
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn failed_policy_fetch_is_retried_on_the_next_tick() {
    let h = harness().await;
    h.variables.insert("Sales_A_human_rooms", r#"["R1"]"#).await;
    h.variables.fail_reads(true).await;
    let result = h
        .session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await;
    assert!(result.is_err());
    assert_eq!(h.session.take_notices().await[0].level, NoticeLevel::Warning);

    // Ticks keep failing while the store is down; edits stay refused.
    advance_ticks(1).await;
    let room = RoomRef::new("R1", false);
    assert!(h.session.toggle_automation(&room, false).await.is_err());
    assert!(h.session.release_escalation(&RoomId::from("R1")).await.is_err());
    assert!(!h.session.view().await.policy_loaded);
    assert_eq!(h.variables.write_count().await, 0);

    h.variables.fail_reads(false).await;
    advance_ticks(1).await;
    let view = h.session.view().await;
    assert!(view.policy_loaded);
    assert!(view.policy.single_chat_global_enabled);
    assert!(view.is_escalated(&RoomId::from("R1")));
    // The counter never moved, so recovery came from the tick alone.
    assert_eq!(h.directory.room_fetch_count().await, 1);

    assert!(!h.session.toggle_automation(&room, false).await.unwrap());
    assert_eq!(
        h.variables.list("Sales_A_single_disabled_rooms").await,
        vec!["R1"]
    );
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn manual_reload_still_recovers_the_policy() {
    let h = harness().await;
    h.variables.fail_reads(true).await;
    assert!(
        h.session
            .select_account(account("A", "Sales", "10.0.0.1"))
            .await
            .is_err()
    );
    h.variables.fail_reads(false).await;
    h.session.reload_policy().await.unwrap();
    assert!(h.session.view().await.policy_loaded);
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn queued_toggle_keeps_its_pending_state_when_an_earlier_one_finishes() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    h.variables
        .set_write_delay(Some(Duration::from_millis(200)))
        .await;

    let room = RoomRef::new("R1", false);
    let ((first, shown_after_first), second) = tokio::join!(
        async {
            let result = h.session.toggle_automation(&room, false).await;
            (result, h.session.room_automation(&room).await)
        },
        async {
            advance(Duration::from_millis(10)).await;
            h.session.toggle_automation(&room, true).await
        },
    );

    assert!(!first.unwrap());
    // The second call's optimistic value is still displayed.
    assert!(shown_after_first);
    assert!(second.unwrap());
    assert!(h.session.room_automation(&room).await);
    assert!(
        h.variables
            .list("Sales_A_single_disabled_rooms")
            .await
            .is_empty()
    );
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn operations_need_a_selection() {
    let h = harness().await;
    let err = h
        .session
        .toggle_automation(&RoomRef::new("R1", false), true)
        .await
        .unwrap_err();
    assert!(matches!(err, ParleyError::NotSelected { what: "account" }));

    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    let err = h.session.send_message("hi").await.unwrap_err();
    assert!(matches!(err, ParleyError::NotSelected { what: "room" }));
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn superseded_account_responses_are_discarded() {
    let h = harness().await;
    h.directory
        .set_room_delay(Some(Duration::from_millis(500)))
        .await;

    let (first, second) = tokio::join!(
        h.session.select_account(account("A", "Sales", "10.0.0.1")),
        h.session.select_account(account("B", "Support", "10.0.0.2")),
    );
    first.unwrap();
    second.unwrap();

    let view = h.session.view().await;
    assert_eq!(view.account.as_ref().map(|a| a.id.0.as_str()), Some("B"));
    assert_eq!(view.rooms.len(), 1);
    assert_eq!(view.rooms[0].room_id, RoomId::from("R9"));

    advance_ticks(3).await;
    let a_reads = h
        .directory
        .counter_reads()
        .await
        .iter()
        .filter(|id| **id == AccountId::from("A"))
        .count();
    assert_eq!(a_reads, 1, "no sync loop may run for the superseded account");
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn switching_accounts_stops_previous_loop() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    advance_ticks(1).await;
    h.session
        .select_account(account("B", "Support", "10.0.0.2"))
        .await
        .unwrap();

    let before = h.directory.counter_reads().await;
    h.directory.set_counter("A", 7).await;
    advance_ticks(3).await;
    let after = h.directory.counter_reads().await;
    let a_reads = |reads: &[AccountId]| reads.iter().filter(|id| id.0 == "A").count();
    assert_eq!(a_reads(&before), a_reads(&after));
    assert!(after.len() > before.len());
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn refresh_preserves_and_updates_selection() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    h.session
        .select_room(room_with_preview("R1", false, "old"))
        .await
        .unwrap();
    assert_eq!(h.session.view().await.messages.len(), 1);
    assert_eq!(h.personal.queries().await.len(), 1);

    // R1 missing from one refresh: selection kept as it was.
    h.directory.set_rooms("A", vec![room("G1", true)]).await;
    h.directory.set_counter("A", 2).await;
    advance_ticks(1).await;
    let view = h.session.view().await;
    assert_eq!(view.rooms.len(), 1);
    assert_eq!(
        view.selected_room,
        Some(room_with_preview("R1", false, "old"))
    );

    // R1 back with new content: selection replaced, messages reloaded.
    h.directory
        .set_rooms(
            "A",
            vec![room_with_preview("R1", false, "new"), room("G1", true)],
        )
        .await;
    h.directory.set_counter("A", 3).await;
    advance_ticks(1).await;
    let view = h.session.view().await;
    assert_eq!(
        view.selected_room.map(|r| r.last_message_preview),
        Some("new".to_string())
    );
    assert_eq!(h.personal.queries().await.len(), 2);
    assert!(h.session.sync_refresh_count().await >= 2);
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn send_message_submits_job_and_refetches_later() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    h.session.select_room(room("R1", false)).await.unwrap();

    let run_id = h.session.send_message("on my way").await.unwrap();
    let jobs = h.workflow.jobs().await;
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].run_id, run_id);
    assert_eq!(jobs[0].workflow, "send_message");
    assert_eq!(jobs[0].config["accountId"], "A");
    assert_eq!(jobs[0].config["accountName"], "Sales");
    assert_eq!(jobs[0].config["roomId"], "R1");
    assert_eq!(jobs[0].config["content"], "on my way");

    assert_eq!(h.personal.queries().await.len(), 1);
    advance(Duration::from_millis(2100)).await;
    assert_eq!(h.personal.queries().await.len(), 2);
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn rejected_job_is_an_error() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    h.session.select_room(room("R1", false)).await.unwrap();
    h.workflow.set_reject(true).await;
    let err = h.session.send_message("hi").await.unwrap_err();
    assert!(matches!(err, ParleyError::Workflow { .. }));
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn release_escalation_updates_list() {
    let h = harness().await;
    h.variables
        .insert("Sales_A_human_rooms", r#"["R1","G1"]"#)
        .await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    assert!(h.session.view().await.is_escalated(&RoomId::from("R1")));

    h.session
        .release_escalation(&RoomId::from("R1"))
        .await
        .unwrap();
    assert!(!h.session.view().await.is_escalated(&RoomId::from("R1")));
    assert_eq!(h.variables.list("Sales_A_human_rooms").await, vec!["G1"]);
    h.session.close().await;
}

#[tokio::test(start_paused = true)]
async fn close_stops_the_loop() {
    let h = harness().await;
    h.session
        .select_account(account("A", "Sales", "10.0.0.1"))
        .await
        .unwrap();
    h.session.close().await;
    assert_eq!(h.session.sync_state().await, SyncState::Idle);

    let reads = h.directory.counter_reads().await.len();
    advance_ticks(3).await;
    assert_eq!(h.directory.counter_reads().await.len(), reads);
}

#[tokio::test(start_paused = true)]
async fn accounts_are_filtered_by_scope() {
    let mut config = ParleyConfig::default();
    config.scope.restrict_to_owned = true;
    config.scope.owned_instances = vec!["10.0.0.2".into()];
    let h = harness_with(config).await;

    let accounts = h.session.load_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].display_name, "Support");
    assert_eq!(h.session.view().await.accounts, accounts);
}

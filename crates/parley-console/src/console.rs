// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator console session.
//!
//! All view state lives in one [`ViewState`] behind a mutex that is never
//! held across a remote call. Each account selection bumps a generation
//! number; a response is applied only if the generation it was issued
//! under is still current, so results for a superseded account or room
//! are dropped on arrival. Remote variable writes (toggles, releases) are
//! serialized so each one starts from the policy the previous one left.
//! A policy or escalation fetch that failed is retried on every sync tick
//! until it succeeds.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use parley_config::ParleyConfig;
use parley_core::types::WorkflowJob;
use parley_core::{
    Account, AccountId, AutomationPolicy, ChatKind, ConversationDirectory, DisplayMessage,
    HumanEscalationList, OfficialMessageStore, ParleyError, PersonalMessageStore, Room, RoomId,
    RoomRef, VariableStore, WorkflowTrigger,
};
use parley_messages::{MessageLoader, SourceSchema};
use parley_policy::{resolve, EscalationBook, PolicyStore, Reconciler};

use crate::accounts::{filter_accounts, OperatorScope};
use crate::selection::{reconcile_selection, SelectionUpdate};
use crate::sync::{RoomListSink, SyncLoop, SyncState, SyncSupervisor};

/// Severity of a notice shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A message queued for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Remote services a session talks to.
#[derive(Clone)]
pub struct ConsoleServices {
    pub directory: Arc<dyn ConversationDirectory>,
    pub variables: Arc<dyn VariableStore>,
    pub personal: Arc<dyn PersonalMessageStore>,
    pub official: Arc<dyn OfficialMessageStore>,
    pub workflow: Arc<dyn WorkflowTrigger>,
}

/// Snapshot of everything the console displays.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub accounts: Vec<Account>,
    pub account: Option<Account>,
    pub policy: AutomationPolicy,
    /// False until the policy of the selected account has been fetched.
    pub policy_loaded: bool,
    pub escalations: HumanEscalationList,
    escalations_loaded: bool,
    pub rooms: Vec<Room>,
    pub selected_room: Option<Room>,
    pub messages: Vec<DisplayMessage>,
    pub message_schema: Option<SourceSchema>,
    /// Unconfirmed toggles, tagged with the sequence number of the call
    /// that displayed them.
    pending_rooms: BTreeMap<RoomId, (u64, bool)>,
    pending_globals: BTreeMap<ChatKind, (u64, bool)>,
    pending_seq: u64,
    notices: Vec<Notice>,
    generation: u64,
    room_generation: u64,
}

impl ViewState {
    /// Automation state shown for a room, including an unconfirmed toggle.
    pub fn room_automation(&self, room: &RoomRef) -> bool {
        self.pending_rooms
            .get(&room.room_id)
            .map(|&(_, state)| state)
            .unwrap_or_else(|| resolve(room, &self.policy))
    }

    /// Global toggle shown for a chat kind, including an unconfirmed switch.
    pub fn global_automation(&self, kind: ChatKind) -> bool {
        self.pending_globals
            .get(&kind)
            .map(|&(_, state)| state)
            .unwrap_or_else(|| self.policy.global_enabled(kind))
    }

    pub fn is_escalated(&self, room_id: &RoomId) -> bool {
        self.escalations.contains(room_id)
    }

    fn next_pending_seq(&mut self) -> u64 {
        self.pending_seq += 1;
        self.pending_seq
    }

    fn clear_account(&mut self) {
        self.policy = AutomationPolicy::default();
        self.policy_loaded = false;
        self.escalations = HumanEscalationList::default();
        self.escalations_loaded = false;
        self.rooms.clear();
        self.selected_room = None;
        self.messages.clear();
        self.message_schema = None;
        self.pending_rooms.clear();
        self.pending_globals.clear();
    }
}

struct Shared {
    directory: Arc<dyn ConversationDirectory>,
    workflow: Arc<dyn WorkflowTrigger>,
    policy_store: PolicyStore,
    reconciler: Reconciler,
    escalations: EscalationBook,
    loader: MessageLoader,
    scope: OperatorScope,
    operator: String,
    send_workflow: String,
    poll_interval: Duration,
    resend_delay: Duration,
    state: Mutex<ViewState>,
    sync: Mutex<SyncSupervisor>,
    writes: Mutex<()>,
    cancel: CancellationToken,
}

/// The operator console: one selected account, one selected room.
pub struct ConsoleSession {
    shared: Arc<Shared>,
}

impl ConsoleSession {
    pub fn new(config: &ParleyConfig, services: ConsoleServices) -> Self {
        let policy_store = PolicyStore::new(
            services.variables.clone(),
            config.policy.write_description.clone(),
        );
        let shared = Shared {
            directory: services.directory,
            workflow: services.workflow,
            reconciler: Reconciler::new(policy_store.clone()),
            escalations: EscalationBook::new(policy_store.clone()),
            policy_store,
            loader: MessageLoader::new(services.personal, services.official, config.media.clone()),
            scope: OperatorScope::from_config(&config.scope),
            operator: config.console.operator.clone(),
            send_workflow: config.workflow.send_message_workflow.clone(),
            poll_interval: Duration::from_millis(config.console.poll_interval_ms),
            resend_delay: Duration::from_millis(config.console.resend_poll_delay_ms),
            state: Mutex::new(ViewState::default()),
            sync: Mutex::new(SyncSupervisor::new()),
            writes: Mutex::new(()),
            cancel: CancellationToken::new(),
        };
        Self {
            shared: Arc::new(shared),
        }
    }

    /// A copy of the current view state.
    pub async fn view(&self) -> ViewState {
        self.shared.state.lock().await.clone()
    }

    /// Drain queued notices.
    pub async fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.shared.state.lock().await.notices)
    }

    /// State of the selected account's sync loop.
    pub async fn sync_state(&self) -> SyncState {
        self.shared
            .sync
            .lock()
            .await
            .current()
            .map_or(SyncState::Idle, |handle| handle.state())
    }

    /// Refreshes applied by the current sync loop.
    pub async fn sync_refresh_count(&self) -> u64 {
        self.shared
            .sync
            .lock()
            .await
            .current()
            .map_or(0, |handle| handle.refresh_count())
    }

    /// Fetch the accounts this operator may act as.
    pub async fn load_accounts(&self) -> Result<Vec<Account>, ParleyError> {
        let accounts = self.shared.directory.list_accounts().await?;
        let accounts = filter_accounts(accounts, &self.shared.scope);
        self.shared.state.lock().await.accounts = accounts.clone();
        Ok(accounts)
    }

    /// Switch to `account`.
    ///
    /// Stops the previous account's sync loop, fetches the policy, the
    /// escalation list, the room list and the message counter
    /// concurrently, then starts a sync loop for `account`. Fetch failures
    /// are logged and queued as a notice; the first one is returned after
    /// the loop has been started, so the next tick retries whatever could
    /// not be loaded.
    pub async fn select_account(&self, account: Account) -> Result<(), ParleyError> {
        let shared = &self.shared;
        let generation = {
            let mut state = shared.state.lock().await;
            state.generation += 1;
            state.account = Some(account.clone());
            state.clear_account();
            state.generation
        };
        shared.sync.lock().await.stop().await;
        info!(account_id = %account.id, "account selected");

        let (policy, escalations, rooms, counter) = tokio::join!(
            shared.policy_store.load_policy(&account),
            shared.escalations.load(&account),
            shared.directory.list_rooms(&account.id),
            shared.directory.message_count(&account.id),
        );

        let mut failure = None;
        let baseline = {
            let mut state = shared.state.lock().await;
            if state.generation != generation {
                debug!(account_id = %account.id, "account selection superseded, discarding responses");
                return Ok(());
            }
            match policy {
                Ok(policy) => {
                    state.policy = policy;
                    state.policy_loaded = true;
                }
                Err(e) => {
                    warn!(account_id = %account.id, error = %e, "policy fetch failed");
                    failure.get_or_insert(e);
                }
            }
            match escalations {
                Ok(list) => {
                    state.escalations = list;
                    state.escalations_loaded = true;
                }
                Err(e) => {
                    warn!(account_id = %account.id, error = %e, "escalation list fetch failed");
                    failure.get_or_insert(e);
                }
            }
            let rooms_loaded = match rooms {
                Ok(rooms) => {
                    state.rooms = rooms;
                    true
                }
                Err(e) => {
                    warn!(account_id = %account.id, error = %e, "room list fetch failed");
                    failure.get_or_insert(e);
                    false
                }
            };
            if let Some(e) = &failure {
                state.notices.push(Notice::warning(format!(
                    "Some data for {} could not be loaded: {e}",
                    account.display_name
                )));
            }
            counter.ok().filter(|_| rooms_loaded)
        };

        {
            let mut sync = shared.sync.lock().await;
            if shared.state.lock().await.generation != generation {
                return Ok(());
            }
            let sink = Arc::new(SessionSink {
                shared: Arc::downgrade(shared),
                generation,
            });
            let mut sync_loop = SyncLoop::new(
                account.id.clone(),
                shared.directory.clone(),
                sink,
                shared.poll_interval,
            );
            if let Some(counter) = baseline {
                sync_loop = sync_loop.with_baseline(counter);
            }
            sync.start(sync_loop).await;
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Re-fetch the policy and escalation list of the selected account.
    pub async fn reload_policy(&self) -> Result<(), ParleyError> {
        let (generation, account) = self.current_account().await?;
        let (policy, escalations) = tokio::join!(
            self.shared.policy_store.load_policy(&account),
            self.shared.escalations.load(&account),
        );
        let mut state = self.shared.state.lock().await;
        if state.generation != generation {
            return Ok(());
        }
        state.policy = policy?;
        state.policy_loaded = true;
        state.escalations = escalations?;
        state.escalations_loaded = true;
        Ok(())
    }

    /// Select a room and load its messages.
    pub async fn select_room(&self, room: Room) -> Result<(), ParleyError> {
        let (generation, room_generation, account) = {
            let mut state = self.shared.state.lock().await;
            let account = state
                .account
                .clone()
                .ok_or(ParleyError::NotSelected { what: "account" })?;
            state.selected_room = Some(room.clone());
            state.room_generation += 1;
            state.messages.clear();
            state.message_schema = None;
            (state.generation, state.room_generation, account)
        };
        debug!(account_id = %account.id, room_id = %room.room_id, "room selected");
        self.shared
            .load_messages(generation, room_generation, &account, &room.room_id)
            .await
    }

    /// Reload the messages of the selected room.
    pub async fn refresh_messages(&self) -> Result<(), ParleyError> {
        let (generation, room_generation, account, room_id) = self.current_room().await?;
        self.shared
            .load_messages(generation, room_generation, &account, &room_id)
            .await
    }

    /// Automation state displayed for a room.
    pub async fn room_automation(&self, room: &RoomRef) -> bool {
        self.shared.state.lock().await.room_automation(room)
    }

    /// Turn automated replies on or off for one room.
    ///
    /// The new state is displayed at once. If persisting fails the display
    /// reverts, the session adopts the policy the store now holds, an
    /// error notice is queued and the store error is returned.
    pub async fn toggle_automation(&self, room: &RoomRef, new_state: bool) -> Result<bool, ParleyError> {
        let shared = &self.shared;
        let (generation, seq) = {
            let mut state = shared.state.lock().await;
            Self::require_policy(&state)?;
            let seq = state.next_pending_seq();
            state.pending_rooms.insert(room.room_id.clone(), (seq, new_state));
            (state.generation, seq)
        };

        let _writes = shared.writes.lock().await;
        let (account, policy) = {
            let state = shared.state.lock().await;
            if state.generation != generation {
                return Err(ParleyError::Superseded { what: "account" });
            }
            (Self::require_policy(&state)?, state.policy.clone())
        };
        let result = shared
            .reconciler
            .toggle(&account, room, new_state, &policy)
            .await;

        let mut state = shared.state.lock().await;
        if state.generation != generation {
            return Err(ParleyError::Superseded { what: "account" });
        }
        if state.pending_rooms.get(&room.room_id).is_some_and(|&(owner, _)| owner == seq) {
            state.pending_rooms.remove(&room.room_id);
        }
        match result {
            Ok(next) => {
                state.policy = next;
                Ok(new_state)
            }
            Err(err) => {
                state.policy = err.policy;
                state.notices.push(Notice::error(format!(
                    "Could not turn automation {} for room {}: {}",
                    if new_state { "on" } else { "off" },
                    room.room_id,
                    err.source
                )));
                Err(err.source)
            }
        }
    }

    /// Switch the account-wide default for one chat kind.
    pub async fn set_global_automation(&self, kind: ChatKind, enabled: bool) -> Result<bool, ParleyError> {
        let shared = &self.shared;
        let (generation, seq) = {
            let mut state = shared.state.lock().await;
            Self::require_policy(&state)?;
            let seq = state.next_pending_seq();
            state.pending_globals.insert(kind, (seq, enabled));
            (state.generation, seq)
        };

        let _writes = shared.writes.lock().await;
        let (account, policy) = {
            let state = shared.state.lock().await;
            if state.generation != generation {
                return Err(ParleyError::Superseded { what: "account" });
            }
            (Self::require_policy(&state)?, state.policy.clone())
        };
        let result = shared
            .reconciler
            .set_global(&account, kind, enabled, &policy)
            .await;

        let mut state = shared.state.lock().await;
        if state.generation != generation {
            return Err(ParleyError::Superseded { what: "account" });
        }
        if state.pending_globals.get(&kind).is_some_and(|&(owner, _)| owner == seq) {
            state.pending_globals.remove(&kind);
        }
        match result {
            Ok(next) => {
                state.policy = next;
                Ok(enabled)
            }
            Err(err) => {
                state.policy = err.policy;
                state.notices.push(Notice::error(format!(
                    "Could not change the {kind} chat default: {}",
                    err.source
                )));
                Err(err.source)
            }
        }
    }

    /// Take a room off the human escalation list.
    pub async fn release_escalation(&self, room_id: &RoomId) -> Result<(), ParleyError> {
        let shared = &self.shared;
        let _writes = shared.writes.lock().await;
        let (generation, account, list) = {
            let state = shared.state.lock().await;
            let account = state
                .account
                .clone()
                .ok_or(ParleyError::NotSelected { what: "account" })?;
            if !state.escalations_loaded {
                return Err(ParleyError::VariableStore {
                    message: format!("escalation list for {} has not been loaded", account.id),
                    source: None,
                });
            }
            (state.generation, account, state.escalations.clone())
        };
        let result = shared.escalations.release(&account, &list, room_id).await;

        let mut state = shared.state.lock().await;
        if state.generation != generation {
            return Err(ParleyError::Superseded { what: "account" });
        }
        match result {
            Ok(next) => {
                if list.contains(room_id) {
                    state
                        .notices
                        .push(Notice::info(format!("Room {room_id} handed back to automation")));
                }
                state.escalations = next;
                Ok(())
            }
            Err(e) => {
                state.notices.push(Notice::error(format!(
                    "Could not release room {room_id}: {e}"
                )));
                Err(e)
            }
        }
    }

    /// Submit a message to the selected room through the send workflow.
    ///
    /// Returns the run id once the job is accepted. The room's messages
    /// are re-fetched after the configured delay in the background.
    pub async fn send_message(&self, text: &str) -> Result<String, ParleyError> {
        let shared = &self.shared;
        let (generation, room_generation, account, room_id) = self.current_room().await?;

        let run_id = Uuid::new_v4().to_string();
        let job = WorkflowJob {
            workflow: shared.send_workflow.clone(),
            run_id: run_id.clone(),
            config: json!({
                "accountId": account.id,
                "accountName": account.display_name,
                "roomId": room_id,
                "content": text,
                "operator": shared.operator,
            }),
        };
        let ack = shared.workflow.submit(job).await?;
        if !ack.accepted {
            return Err(ParleyError::Workflow {
                message: format!("job {run_id} was not accepted"),
                source: None,
            });
        }
        info!(account_id = %account.id, room_id = %room_id, run_id = %ack.run_id, "message job accepted");

        let weak = Arc::downgrade(shared);
        let cancel = shared.cancel.clone();
        let delay = shared.resend_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let Some(shared) = weak.upgrade() else { return };
            if let Err(e) = shared
                .load_messages(generation, room_generation, &account, &room_id)
                .await
            {
                warn!(room_id = %room_id, error = %e, "message re-fetch after send failed");
            }
        });

        Ok(ack.run_id)
    }

    /// Stop the sync loop and drop any outstanding responses.
    pub async fn close(&self) {
        self.shared.cancel.cancel();
        self.shared.sync.lock().await.stop().await;
        self.shared.state.lock().await.generation += 1;
        info!("console session closed");
    }

    fn require_policy(state: &ViewState) -> Result<Account, ParleyError> {
        let account = state
            .account
            .clone()
            .ok_or(ParleyError::NotSelected { what: "account" })?;
        if !state.policy_loaded {
            return Err(ParleyError::VariableStore {
                message: format!("automation policy for {} has not been loaded", account.id),
                source: None,
            });
        }
        Ok(account)
    }

    async fn current_account(&self) -> Result<(u64, Account), ParleyError> {
        let state = self.shared.state.lock().await;
        let account = state
            .account
            .clone()
            .ok_or(ParleyError::NotSelected { what: "account" })?;
        Ok((state.generation, account))
    }

    async fn current_room(&self) -> Result<(u64, u64, Account, RoomId), ParleyError> {
        let state = self.shared.state.lock().await;
        let account = state
            .account
            .clone()
            .ok_or(ParleyError::NotSelected { what: "account" })?;
        let room_id = state
            .selected_room
            .as_ref()
            .map(|room| room.room_id.clone())
            .ok_or(ParleyError::NotSelected { what: "room" })?;
        Ok((state.generation, state.room_generation, account, room_id))
    }
}

impl Shared {
    /// Fetch whichever of the policy and escalation list is still missing
    /// for the selection made under `generation`.
    async fn retry_missing_policy(&self, generation: u64) {
        let missing = |state: &ViewState| {
            state.generation == generation && (!state.policy_loaded || !state.escalations_loaded)
        };
        if !missing(&*self.state.lock().await) {
            return;
        }

        let _writes = self.writes.lock().await;
        let (account, want_policy, want_escalations) = {
            let state = self.state.lock().await;
            if !missing(&*state) {
                return;
            }
            let Some(account) = state.account.clone() else {
                return;
            };
            (account, !state.policy_loaded, !state.escalations_loaded)
        };
        debug!(account_id = %account.id, want_policy, want_escalations, "retrying policy fetch");

        let (policy, escalations) = tokio::join!(
            async {
                if want_policy {
                    Some(self.policy_store.load_policy(&account).await)
                } else {
                    None
                }
            },
            async {
                if want_escalations {
                    Some(self.escalations.load(&account).await)
                } else {
                    None
                }
            },
        );

        let mut state = self.state.lock().await;
        if state.generation != generation {
            return;
        }
        match policy {
            Some(Ok(policy)) => {
                state.policy = policy;
                state.policy_loaded = true;
                info!(account_id = %account.id, "policy loaded after retry");
            }
            Some(Err(e)) => {
                warn!(account_id = %account.id, error = %e, "policy fetch failed, retrying next tick");
            }
            None => {}
        }
        match escalations {
            Some(Ok(list)) => {
                state.escalations = list;
                state.escalations_loaded = true;
                info!(account_id = %account.id, "escalation list loaded after retry");
            }
            Some(Err(e)) => {
                warn!(account_id = %account.id, error = %e, "escalation list fetch failed, retrying next tick");
            }
            None => {}
        }
    }

    /// Load messages and apply them if the selection is unchanged.
    async fn load_messages(
        &self,
        generation: u64,
        room_generation: u64,
        account: &Account,
        room_id: &RoomId,
    ) -> Result<(), ParleyError> {
        let loaded = self.loader.load(account, room_id).await;
        let mut state = self.state.lock().await;
        if state.generation != generation || state.room_generation != room_generation {
            debug!(room_id = %room_id, "room selection changed, discarding messages");
            return Ok(());
        }
        match loaded {
            Ok(loaded) => {
                state.messages = loaded.messages;
                state.message_schema = Some(loaded.schema);
                Ok(())
            }
            Err(e) => {
                warn!(room_id = %room_id, error = %e, "message fetch failed");
                Err(e)
            }
        }
    }
}

/// Applies sync loop refreshes to the session that started the loop.
struct SessionSink {
    shared: Weak<Shared>,
    generation: u64,
}

#[async_trait]
impl RoomListSink for SessionSink {
    async fn apply(&self, account_id: &AccountId, rooms: Vec<Room>) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        let reload = {
            let mut state = shared.state.lock().await;
            if state.generation != self.generation {
                debug!(account_id = %account_id, "refresh for a previous selection, discarding");
                return;
            }
            let update = reconcile_selection(&mut state.selected_room, &rooms);
            state.rooms = rooms;
            match update {
                SelectionUpdate::Missing => {
                    debug!(account_id = %account_id, "selected room missing from refresh, keeping selection");
                    None
                }
                SelectionUpdate::Unchanged => None,
                SelectionUpdate::Replaced => match (&state.account, &state.selected_room) {
                    (Some(account), Some(room)) => {
                        Some((state.room_generation, account.clone(), room.room_id.clone()))
                    }
                    _ => None,
                },
            }
        };

        if let Some((room_generation, account, room_id)) = reload {
            if let Err(e) = shared
                .load_messages(self.generation, room_generation, &account, &room_id)
                .await
            {
                warn!(room_id = %room_id, error = %e, "message reload after refresh failed");
            }
        }
    }

    async fn tick(&self, _account_id: &AccountId) {
        if let Some(shared) = self.shared.upgrade() {
            shared.retry_missing_policy(self.generation).await;
        }
    }
}

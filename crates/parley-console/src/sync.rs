// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation sync loop.
//!
//! One loop per selected account. Each tick reads the account's message
//! counter; when it differs from the last committed value the room list is
//! fetched and handed to a [`RoomListSink`]. The refresh is awaited inside
//! the tick, so refreshes never overlap and ticks that fall due while one
//! is in flight are skipped. A counter value is committed only after its
//! refresh succeeds. The sink is also told about every tick before the
//! counter is read, so it can retry its own failed fetches.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parley_core::{AccountId, ConversationDirectory, Room};

/// States of the sync loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Not running.
    Idle,
    /// Waiting for the next tick or reading the counter.
    Polling,
    /// Fetching the room list after a counter change.
    Refreshing,
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncState::Idle => write!(f, "idle"),
            SyncState::Polling => write!(f, "polling"),
            SyncState::Refreshing => write!(f, "refreshing"),
        }
    }
}

/// Receives each freshly fetched room list.
#[async_trait]
pub trait RoomListSink: Send + Sync + 'static {
    async fn apply(&self, account_id: &AccountId, rooms: Vec<Room>);

    /// Called at the start of every tick, before the counter is read.
    async fn tick(&self, _account_id: &AccountId) {}
}

/// A not-yet-started sync loop for one account.
pub struct SyncLoop {
    account_id: AccountId,
    directory: Arc<dyn ConversationDirectory>,
    sink: Arc<dyn RoomListSink>,
    interval: Duration,
    baseline: Option<u64>,
}

impl SyncLoop {
    pub fn new(
        account_id: AccountId,
        directory: Arc<dyn ConversationDirectory>,
        sink: Arc<dyn RoomListSink>,
        interval: Duration,
    ) -> Self {
        Self {
            account_id,
            directory,
            sink,
            interval,
            baseline: None,
        }
    }

    /// Treat `counter` as already refreshed, so the first tick only
    /// refreshes if the counter has moved since.
    pub fn with_baseline(mut self, counter: u64) -> Self {
        self.baseline = Some(counter);
        self
    }

    /// Spawn the loop on the current runtime.
    pub fn spawn(self) -> SyncHandle {
        let cancel = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(SyncState::Polling);
        let refreshes = Arc::new(AtomicU64::new(0));
        let account_id = self.account_id.clone();

        let task = tokio::spawn(self.run(cancel.clone(), state_tx, refreshes.clone()));
        info!(account_id = %account_id, "sync loop started");

        SyncHandle {
            account_id,
            cancel,
            state: state_rx,
            refreshes,
            task: Some(task),
        }
    }

    async fn run(
        self,
        cancel: CancellationToken,
        state: watch::Sender<SyncState>,
        refreshes: Arc<AtomicU64>,
    ) {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut committed = self.baseline;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = self.sink.tick(&self.account_id) => {}
            }

            let counter = tokio::select! {
                _ = cancel.cancelled() => break,
                counter = self.directory.message_count(&self.account_id) => counter,
            };
            let counter = match counter {
                Ok(counter) => counter,
                Err(e) => {
                    warn!(account_id = %self.account_id, error = %e, "message counter fetch failed");
                    continue;
                }
            };
            if committed == Some(counter) {
                debug!(account_id = %self.account_id, counter, "counter unchanged");
                continue;
            }

            state.send_replace(SyncState::Refreshing);
            let rooms = tokio::select! {
                _ = cancel.cancelled() => break,
                rooms = self.directory.list_rooms(&self.account_id) => rooms,
            };
            match rooms {
                Ok(rooms) if !cancel.is_cancelled() => {
                    let count = rooms.len();
                    self.sink.apply(&self.account_id, rooms).await;
                    committed = Some(counter);
                    refreshes.fetch_add(1, Ordering::SeqCst);
                    info!(account_id = %self.account_id, counter, rooms = count, "room list refreshed");
                }
                Ok(_) => break,
                Err(e) => {
                    warn!(account_id = %self.account_id, error = %e, "room list refresh failed, retrying next tick");
                }
            }
            state.send_replace(SyncState::Polling);
        }

        state.send_replace(SyncState::Idle);
        debug!(account_id = %self.account_id, "sync loop stopped");
    }
}

/// Control handle for a running sync loop. Dropping it cancels the loop.
pub struct SyncHandle {
    account_id: AccountId,
    cancel: CancellationToken,
    state: watch::Receiver<SyncState>,
    refreshes: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl SyncHandle {
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn state(&self) -> SyncState {
        *self.state.borrow()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.clone()
    }

    /// Number of refreshes applied since start.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    /// Cancel the loop and wait until it has exited.
    ///
    /// Once this returns the sink receives nothing more from this loop.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(account_id = %self.account_id, error = %e, "sync loop task ended abnormally");
            }
        }
        info!(account_id = %self.account_id, "sync loop stopped");
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Owns at most one running loop.
#[derive(Default)]
pub struct SyncSupervisor {
    current: Option<SyncHandle>,
}

impl SyncSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the running loop, if any, then spawn `sync`.
    pub async fn start(&mut self, sync: SyncLoop) -> &SyncHandle {
        self.stop().await;
        self.current.insert(sync.spawn())
    }

    pub async fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.stop().await;
        }
    }

    pub fn current(&self) -> Option<&SyncHandle> {
        self.current.as_ref()
    }
}

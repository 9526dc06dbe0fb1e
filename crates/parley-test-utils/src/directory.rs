// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted conversation directory.
//!
//! Room lists and message counters are set per account and can be changed
//! between poll ticks. An optional delay on room-list fetches lets tests
//! observe overlapping refreshes; `max_concurrent_room_fetches` reports
//! the highest number that were ever in flight at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::types::{AdapterType, HealthStatus};
use parley_core::{Account, AccountId, ConversationDirectory, ParleyError, Room, ServiceAdapter};

#[derive(Default)]
struct Script {
    accounts: Vec<Account>,
    rooms: HashMap<AccountId, Vec<Room>>,
    counters: HashMap<AccountId, u64>,
    room_delay: Option<Duration>,
    fail_rooms: bool,
    fail_counter: bool,
}

#[derive(Default)]
pub struct MockDirectory {
    script: Mutex<Script>,
    room_fetches: Mutex<Vec<AccountId>>,
    counter_reads: Mutex<Vec<AccountId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_accounts(&self, accounts: Vec<Account>) {
        self.script.lock().await.accounts = accounts;
    }

    pub async fn set_rooms(&self, account: impl Into<String>, rooms: Vec<Room>) {
        self.script
            .lock()
            .await
            .rooms
            .insert(AccountId(account.into()), rooms);
    }

    pub async fn set_counter(&self, account: impl Into<String>, count: u64) {
        self.script
            .lock()
            .await
            .counters
            .insert(AccountId(account.into()), count);
    }

    pub async fn set_room_delay(&self, delay: Option<Duration>) {
        self.script.lock().await.room_delay = delay;
    }

    pub async fn set_fail_rooms(&self, fail: bool) {
        self.script.lock().await.fail_rooms = fail;
    }

    pub async fn set_fail_counter(&self, fail: bool) {
        self.script.lock().await.fail_counter = fail;
    }

    /// Accounts whose room list was fetched, in call order.
    pub async fn room_fetches(&self) -> Vec<AccountId> {
        self.room_fetches.lock().await.clone()
    }

    pub async fn room_fetch_count(&self) -> usize {
        self.room_fetches.lock().await.len()
    }

    pub async fn counter_reads(&self) -> Vec<AccountId> {
        self.counter_reads.lock().await.clone()
    }

    pub fn max_concurrent_room_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ServiceAdapter for MockDirectory {
    fn name(&self) -> &str {
        "mock-directory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ConversationDirectory for MockDirectory {
    async fn list_accounts(&self) -> Result<Vec<Account>, ParleyError> {
        Ok(self.script.lock().await.accounts.clone())
    }

    async fn list_rooms(&self, account_id: &AccountId) -> Result<Vec<Room>, ParleyError> {
        self.room_fetches.lock().await.push(account_id.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        let (delay, fail) = {
            let script = self.script.lock().await;
            (script.room_delay, script.fail_rooms)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(ParleyError::Directory {
                message: "injected room list failure".into(),
                source: None,
            });
        }
        Ok(self
            .script
            .lock()
            .await
            .rooms
            .get(account_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn message_count(&self, account_id: &AccountId) -> Result<u64, ParleyError> {
        self.counter_reads.lock().await.push(account_id.clone());
        let script = self.script.lock().await;
        if script.fail_counter {
            return Err(ParleyError::Directory {
                message: "injected counter failure".into(),
                source: None,
            });
        }
        Ok(script.counters.get(account_id).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test(start_paused = true)]
    async fn tracks_overlapping_room_fetches() {
        let dir = std::sync::Arc::new(MockDirectory::new());
        dir.set_rooms("A", vec![fixtures::room("R1", false)]).await;
        dir.set_room_delay(Some(Duration::from_millis(100))).await;

        let a = AccountId::from("A");
        let (first, second) = tokio::join!(dir.list_rooms(&a), dir.list_rooms(&a));
        assert_eq!(first.unwrap().len(), 1);
        assert_eq!(second.unwrap().len(), 1);
        assert_eq!(dir.max_concurrent_room_fetches(), 2);
        assert_eq!(dir.room_fetch_count().await, 2);
    }

    #[tokio::test]
    async fn unknown_account_has_zero_counter_and_no_rooms() {
        let dir = MockDirectory::new();
        let id = AccountId::from("nobody");
        assert_eq!(dir.message_count(&id).await.unwrap(), 0);
        assert!(dir.list_rooms(&id).await.unwrap().is_empty());
    }
}

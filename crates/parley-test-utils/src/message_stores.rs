// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted message stores for both record schemas.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::types::{AdapterType, Envelope, HealthStatus, OfficialRecord, PersonalRecord};
use parley_core::{AccountId, OfficialMessageStore, ParleyError, PersonalMessageStore, RoomId};
use parley_core::ServiceAdapter;

fn injected(what: &str) -> ParleyError {
    ParleyError::MessageStore {
        message: format!("injected {what} failure"),
        source: None,
    }
}

/// Personal-account store keyed by (account, room). Unknown pairs answer
/// with an empty envelope, the same as the real store.
#[derive(Default)]
pub struct MockPersonalStore {
    envelopes: Mutex<HashMap<(AccountId, RoomId), Envelope<PersonalRecord>>>,
    queries: Mutex<Vec<(AccountId, RoomId)>>,
    fail: Mutex<bool>,
}

impl MockPersonalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores records newest-first, as the backend returns them.
    pub async fn set_records(
        &self,
        account: impl Into<String>,
        room: impl Into<String>,
        records: Vec<PersonalRecord>,
    ) {
        let envelope = Envelope {
            total: records.len() as u64,
            records,
        };
        self.envelopes
            .lock()
            .await
            .insert((AccountId(account.into()), RoomId(room.into())), envelope);
    }

    pub async fn queries(&self) -> Vec<(AccountId, RoomId)> {
        self.queries.lock().await.clone()
    }

    pub async fn set_fail(&self, fail: bool) {
        *self.fail.lock().await = fail;
    }
}

#[async_trait]
impl ServiceAdapter for MockPersonalStore {
    fn name(&self) -> &str {
        "mock-personal-messages"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::PersonalMessages
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl PersonalMessageStore for MockPersonalStore {
    async fn query(
        &self,
        account_id: &AccountId,
        room_id: &RoomId,
    ) -> Result<Envelope<PersonalRecord>, ParleyError> {
        self.queries
            .lock()
            .await
            .push((account_id.clone(), room_id.clone()));
        if *self.fail.lock().await {
            return Err(injected("personal query"));
        }
        Ok(self
            .envelopes
            .lock()
            .await
            .get(&(account_id.clone(), room_id.clone()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Official-account store keyed by account.
#[derive(Default)]
pub struct MockOfficialStore {
    envelopes: Mutex<HashMap<AccountId, Envelope<OfficialRecord>>>,
    queries: Mutex<Vec<AccountId>>,
    fail: Mutex<bool>,
}

impl MockOfficialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_records(&self, account: impl Into<String>, records: Vec<OfficialRecord>) {
        let envelope = Envelope {
            total: records.len() as u64,
            records,
        };
        self.envelopes
            .lock()
            .await
            .insert(AccountId(account.into()), envelope);
    }

    pub async fn queries(&self) -> Vec<AccountId> {
        self.queries.lock().await.clone()
    }

    pub async fn set_fail(&self, fail: bool) {
        *self.fail.lock().await = fail;
    }
}

#[async_trait]
impl ServiceAdapter for MockOfficialStore {
    fn name(&self) -> &str {
        "mock-official-messages"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::OfficialMessages
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl OfficialMessageStore for MockOfficialStore {
    async fn query(&self, account_id: &AccountId) -> Result<Envelope<OfficialRecord>, ParleyError> {
        self.queries.lock().await.push(account_id.clone());
        if *self.fail.lock().await {
            return Err(injected("official query"));
        }
        Ok(self
            .envelopes
            .lock()
            .await
            .get(account_id)
            .cloned()
            .unwrap_or_default())
    }
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The two message stores. Both return newest-first envelopes.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{AccountId, Envelope, OfficialRecord, PersonalRecord, RoomId};

/// Message store for personal accounts, queried per room.
#[async_trait]
pub trait PersonalMessageStore: ServiceAdapter {
    async fn query(
        &self,
        account_id: &AccountId,
        room_id: &RoomId,
    ) -> Result<Envelope<PersonalRecord>, ParleyError>;
}

/// Message store for official accounts, queried per account.
#[async_trait]
pub trait OfficialMessageStore: ServiceAdapter {
    async fn query(&self, account_id: &AccountId) -> Result<Envelope<OfficialRecord>, ParleyError>;
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account, room list, and message counter lookups.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{Account, AccountId, Room};

/// Read-only projection of the accounts and conversations the operator can see.
#[async_trait]
pub trait ConversationDirectory: ServiceAdapter {
    /// All accounts, unfiltered. Scope filtering happens in the console.
    async fn list_accounts(&self) -> Result<Vec<Account>, ParleyError>;

    /// Full conversation list for one account.
    async fn list_rooms(&self, account_id: &AccountId) -> Result<Vec<Room>, ParleyError>;

    /// Per-account message counter. Changes whenever a message arrives.
    async fn message_count(&self, account_id: &AccountId) -> Result<u64, ParleyError>;
}

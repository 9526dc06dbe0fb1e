// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message loading with schema fallback.

use std::sync::Arc;

use tracing::debug;

use parley_config::model::MediaConfig;
use parley_core::{
    Account, DisplayMessage, OfficialMessageStore, ParleyError, PersonalMessageStore, RoomId,
};

use crate::normalizer::{normalize, NormalizeContext};
use crate::schema::{RawRecord, SourceSchema};

/// Messages of one room and the store they were read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedMessages {
    pub schema: SourceSchema,
    pub messages: Vec<DisplayMessage>,
}

/// Reads a room's messages from whichever store holds them.
#[derive(Clone)]
pub struct MessageLoader {
    personal: Arc<dyn PersonalMessageStore>,
    official: Arc<dyn OfficialMessageStore>,
    media: MediaConfig,
}

impl MessageLoader {
    pub fn new(
        personal: Arc<dyn PersonalMessageStore>,
        official: Arc<dyn OfficialMessageStore>,
        media: MediaConfig,
    ) -> Self {
        Self {
            personal,
            official,
            media,
        }
    }

    /// Query the personal store for the room; if it reports no records,
    /// query the official store for the account instead.
    pub async fn load(&self, account: &Account, room_id: &RoomId) -> Result<LoadedMessages, ParleyError> {
        let personal = self.personal.query(&account.id, room_id).await?;
        let (schema, records): (SourceSchema, Vec<RawRecord>) = if personal.total == 0 {
            debug!(
                account_id = %account.id,
                room_id = %room_id,
                "personal store empty, falling back to official store"
            );
            let official = self.official.query(&account.id).await?;
            (
                SourceSchema::Official,
                official.records.into_iter().map(RawRecord::Official).collect(),
            )
        } else {
            (
                SourceSchema::Personal,
                personal.records.into_iter().map(RawRecord::Personal).collect(),
            )
        };

        let ctx = NormalizeContext {
            account,
            room_id,
            media: &self.media,
        };
        let messages = normalize(records, &ctx);
        debug!(
            account_id = %account.id,
            room_id = %room_id,
            schema = %schema,
            count = messages.len(),
            "messages loaded"
        );
        Ok(LoadedMessages { schema, messages })
    }
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Policy persistence on the workflow variable store.
//!
//! Every value lives under `{accountName}_{accountId}_{purpose}`. Lists
//! are JSON arrays of room ids, toggles are JSON booleans, free text is a
//! JSON string. Writes always replace the whole value.
//!
//! Reads are lenient: a missing, empty, or malformed value decodes to an
//! empty list or `false` and is logged, never returned as an error. Only
//! transport failures propagate.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use parley_core::types::VariableWrite;
use parley_core::{
    Account, AutomationPolicy, ChatKind, ListKind, ParleyError, RoomId, VariableStore,
};

/// What a variable holds for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose<'a> {
    /// Global automation toggle for one chat kind.
    Global(ChatKind),
    /// One override list for one chat kind.
    Overrides(ChatKind, ListKind),
    /// Rooms flagged for human handling.
    HumanRooms,
    /// Free-text configuration such as `ai_prompt`.
    Text(&'a str),
}

impl fmt::Display for Purpose<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Purpose::Global(kind) => write!(f, "{kind}_chat_ai"),
            Purpose::Overrides(kind, list) => write!(f, "{kind}_{list}_rooms"),
            Purpose::HumanRooms => f.write_str("human_rooms"),
            Purpose::Text(name) => f.write_str(name),
        }
    }
}

/// Compose the variable key for one account and purpose.
pub fn variable_key(account: &Account, purpose: Purpose<'_>) -> String {
    format!("{}_{}_{}", account.display_name, account.id, purpose)
}

/// Reads and writes policy values for any account.
#[derive(Clone)]
pub struct PolicyStore {
    variables: Arc<dyn VariableStore>,
    description: String,
}

impl PolicyStore {
    /// `description` is attached to every write.
    pub fn new(variables: Arc<dyn VariableStore>, description: impl Into<String>) -> Self {
        Self {
            variables,
            description: description.into(),
        }
    }

    /// Fetch both toggles and all four override lists concurrently.
    pub async fn load_policy(&self, account: &Account) -> Result<AutomationPolicy, ParleyError> {
        let single_key = variable_key(account, Purpose::Global(ChatKind::Single));
        let group_key = variable_key(account, Purpose::Global(ChatKind::Group));
        let list_keys = [
            (ChatKind::Single, ListKind::Enabled),
            (ChatKind::Single, ListKind::Disabled),
            (ChatKind::Group, ListKind::Enabled),
            (ChatKind::Group, ListKind::Disabled),
        ]
        .map(|(kind, list)| (kind, list, variable_key(account, Purpose::Overrides(kind, list))));

        let (single, group, lists) = futures::try_join!(
            self.read_raw(&single_key),
            self.read_raw(&group_key),
            futures::future::try_join_all(list_keys.iter().map(|(_, _, key)| self.read_raw(key))),
        )?;

        let mut policy = AutomationPolicy {
            single_chat_global_enabled: decode_flag(&single_key, single.as_deref()),
            group_chat_global_enabled: decode_flag(&group_key, group.as_deref()),
            ..Default::default()
        };
        for ((kind, list, key), raw) in list_keys.iter().zip(lists) {
            for room_id in decode_room_ids(key, raw.as_deref()) {
                let set = policy.list_mut(*list);
                if let Some(existing) = set.kind_of(&room_id) {
                    warn!(
                        account_id = %account.id,
                        key = %key,
                        room_id = %room_id,
                        listed_as = %existing,
                        "room listed under both chat kinds, keeping first; next write of {key} drops it"
                    );
                    continue;
                }
                set.insert(room_id, *kind);
            }
        }

        let conflicts = policy.conflicts();
        if !conflicts.is_empty() {
            warn!(
                account_id = %account.id,
                rooms = ?conflicts,
                "rooms present in both override lists, next toggle will repair them"
            );
        }
        debug!(
            account_id = %account.id,
            enabled = policy.enabled_rooms.len(),
            disabled = policy.disabled_rooms.len(),
            "policy loaded"
        );
        Ok(policy)
    }

    /// Replace one override list.
    pub async fn write_list(
        &self,
        account: &Account,
        kind: ChatKind,
        list: ListKind,
        rooms: &[RoomId],
    ) -> Result<(), ParleyError> {
        let key = variable_key(account, Purpose::Overrides(kind, list));
        self.write_room_ids(key, rooms).await
    }

    /// Replace one global toggle.
    pub async fn write_global(
        &self,
        account: &Account,
        kind: ChatKind,
        enabled: bool,
    ) -> Result<(), ParleyError> {
        let key = variable_key(account, Purpose::Global(kind));
        self.write_raw(key, Value::Bool(enabled).to_string()).await
    }

    /// Read a free-text value. Absent and empty values are `None`.
    pub async fn load_text(&self, account: &Account, name: &str) -> Result<Option<String>, ParleyError> {
        let key = variable_key(account, Purpose::Text(name));
        let raw = self.read_raw(&key).await?;
        Ok(raw.and_then(|raw| {
            let text = match serde_json::from_str::<Value>(&raw) {
                Ok(Value::String(inner)) => inner,
                _ => raw,
            };
            (!text.is_empty()).then_some(text)
        }))
    }

    pub async fn save_text(&self, account: &Account, name: &str, text: &str) -> Result<(), ParleyError> {
        let key = variable_key(account, Purpose::Text(name));
        self.write_raw(key, Value::String(text.to_string()).to_string())
            .await
    }

    pub(crate) async fn load_room_ids(
        &self,
        account: &Account,
        purpose: Purpose<'_>,
    ) -> Result<Vec<RoomId>, ParleyError> {
        let key = variable_key(account, purpose);
        let raw = self.read_raw(&key).await?;
        Ok(decode_room_ids(&key, raw.as_deref()))
    }

    pub(crate) async fn write_room_ids(&self, key: String, rooms: &[RoomId]) -> Result<(), ParleyError> {
        self.write_raw(key, encode_room_ids(rooms)).await
    }

    async fn read_raw(&self, key: &str) -> Result<Option<String>, ParleyError> {
        Ok(self.variables.get(key).await?.map(|var| var.value))
    }

    async fn write_raw(&self, key: String, value: String) -> Result<(), ParleyError> {
        debug!(key = %key, "writing variable");
        self.variables
            .set(VariableWrite {
                key,
                value,
                description: self.description.clone(),
            })
            .await
    }
}

pub(crate) fn encode_room_ids(rooms: &[RoomId]) -> String {
    Value::from(rooms.iter().map(|id| id.0.clone()).collect::<Vec<_>>()).to_string()
}

/// Parse a stored value, unwrapping one level of string-encoded JSON.
fn parse_value(key: &str, raw: Option<&str>) -> Option<Value> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty())?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(value) => Some(value),
            Err(_) => Some(Value::String(inner)),
        },
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = %key, error = %e, "stored value is not JSON, treating as empty");
            None
        }
    }
}

pub(crate) fn decode_room_ids(key: &str, raw: Option<&str>) -> Vec<RoomId> {
    match parse_value(key, raw) {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(id) if !id.is_empty() => Some(RoomId(id)),
                Value::Number(n) => Some(RoomId(n.to_string())),
                other => {
                    warn!(key = %key, item = %other, "skipping non-string room id");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(key = %key, value = %other, "expected a JSON array of room ids, treating as empty");
            Vec::new()
        }
    }
}

pub(crate) fn decode_flag(key: &str, raw: Option<&str>) -> bool {
    match parse_value(key, raw) {
        None => false,
        Some(Value::Bool(flag)) => flag,
        Some(other) => {
            warn!(key = %key, value = %other, "expected a JSON boolean, treating as false");
            false
        }
    }
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the policy engine, the message normalizer,
//! the sync loop, and the remote-service traits.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identifier of one messaging identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

/// Identifier of one chat thread, stable per account and peer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        RoomId(value.to_string())
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        AccountId(value.to_string())
    }
}

/// Health status reported by service health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Service is fully operational.
    Healthy,
    /// Service answers but reports a problem.
    Degraded(String),
    /// Service is not reachable.
    Unhealthy(String),
}

/// Identifies which remote service an adapter talks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    VariableStore,
    PersonalMessages,
    OfficialMessages,
    Workflow,
    Directory,
}

// --- Accounts and rooms ---

/// One messaging identity the operator can act as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub display_name: String,
    /// Address of the infrastructure instance hosting this account.
    #[serde(default)]
    pub origin_ip: String,
}

/// Kind of chat a room belongs to. Each kind has its own global toggle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChatKind {
    Single,
    Group,
}

impl ChatKind {
    pub fn from_is_group(is_group: bool) -> Self {
        if is_group {
            ChatKind::Group
        } else {
            ChatKind::Single
        }
    }
}

/// Which override list a room sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ListKind {
    Enabled,
    Disabled,
}

/// A chat thread as returned by the room list fetch.
///
/// Two fetched rooms with the same `room_id` are the same logical
/// conversation; `PartialEq` compares by value so a refresh can tell
/// whether the content changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub room_id: RoomId,
    pub display_name: String,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default)]
    pub last_message_preview: String,
    #[serde(default)]
    pub last_message_time: String,
}

impl Room {
    pub fn kind(&self) -> ChatKind {
        ChatKind::from_is_group(self.is_group)
    }

    pub fn room_ref(&self) -> RoomRef {
        RoomRef {
            room_id: self.room_id.clone(),
            is_group: self.is_group,
        }
    }
}

/// The two facts about a room that the policy engine needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomRef {
    pub room_id: RoomId,
    pub is_group: bool,
}

impl RoomRef {
    pub fn new(room_id: impl Into<String>, is_group: bool) -> Self {
        Self {
            room_id: RoomId(room_id.into()),
            is_group,
        }
    }

    pub fn kind(&self) -> ChatKind {
        ChatKind::from_is_group(self.is_group)
    }
}

// --- Automation policy ---

/// A set of room ids that remembers which chat kind each room was listed under.
///
/// Membership is by room id alone. The remembered kind decides which
/// remote list a room is written back to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomSet(BTreeMap<RoomId, ChatKind>);

impl RoomSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.0.contains_key(room_id)
    }

    /// Adds a room. Returns `false` if the room was already present.
    pub fn insert(&mut self, room_id: RoomId, kind: ChatKind) -> bool {
        self.0.insert(room_id, kind).is_none()
    }

    /// Removes a room. Returns `false` if the room was absent.
    pub fn remove(&mut self, room_id: &RoomId) -> bool {
        self.0.remove(room_id).is_some()
    }

    /// The chat kind a room was listed under, if present.
    pub fn kind_of(&self, room_id: &RoomId) -> Option<ChatKind> {
        self.0.get(room_id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RoomId> {
        self.0.keys()
    }

    /// Room ids listed under one chat kind, in sorted order.
    pub fn ids_of(&self, kind: ChatKind) -> Vec<RoomId> {
        self.0
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

impl FromIterator<(RoomId, ChatKind)> for RoomSet {
    fn from_iter<T: IntoIterator<Item = (RoomId, ChatKind)>>(iter: T) -> Self {
        RoomSet(iter.into_iter().collect())
    }
}

/// Per-account automation policy: two global toggles plus two override lists.
///
/// Invariant: a room id is never in both `enabled_rooms` and `disabled_rooms`.
/// Remote state may violate it; [`AutomationPolicy::conflicts`] reports
/// the offending rooms and the reconciler repairs them on the next toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationPolicy {
    pub single_chat_global_enabled: bool,
    pub group_chat_global_enabled: bool,
    pub enabled_rooms: RoomSet,
    pub disabled_rooms: RoomSet,
}

impl AutomationPolicy {
    pub fn global_enabled(&self, kind: ChatKind) -> bool {
        match kind {
            ChatKind::Single => self.single_chat_global_enabled,
            ChatKind::Group => self.group_chat_global_enabled,
        }
    }

    pub fn set_global(&mut self, kind: ChatKind, enabled: bool) {
        match kind {
            ChatKind::Single => self.single_chat_global_enabled = enabled,
            ChatKind::Group => self.group_chat_global_enabled = enabled,
        }
    }

    pub fn list(&self, list: ListKind) -> &RoomSet {
        match list {
            ListKind::Enabled => &self.enabled_rooms,
            ListKind::Disabled => &self.disabled_rooms,
        }
    }

    pub fn list_mut(&mut self, list: ListKind) -> &mut RoomSet {
        match list {
            ListKind::Enabled => &mut self.enabled_rooms,
            ListKind::Disabled => &mut self.disabled_rooms,
        }
    }

    /// Room ids present in both override lists.
    pub fn conflicts(&self) -> Vec<RoomId> {
        self.enabled_rooms
            .ids()
            .filter(|id| self.disabled_rooms.contains(id))
            .cloned()
            .collect()
    }
}

/// Rooms flagged for mandatory human handling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HumanEscalationList(pub BTreeSet<RoomId>);

impl HumanEscalationList {
    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.0.contains(room_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// --- Display messages ---

/// Kind of a normalized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageKind {
    Text,
    Image,
    Voice,
    Video,
    Unknown,
}

/// Where the bytes of an image come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ImageSource {
    /// Thumbnail bytes decoded from an inline base64 reference.
    Inline { data: Vec<u8> },
    /// Object stored in a bucket under a composed key.
    Stored {
        bucket: String,
        key: String,
        url: String,
    },
}

/// Image descriptor attached to image-kind messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub source: ImageSource,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Byte length of the full-size image, when the record states it.
    pub length: Option<u64>,
}

/// Descriptor for voice and video messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub duration_ms: Option<u64>,
    pub length: Option<u64>,
}

/// Payload of a normalized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePayload {
    Text { text: String },
    Image(ImageRef),
    Media(MediaRef),
}

impl MessagePayload {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePayload::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessagePayload::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Unified message view derived from either backend schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub id: String,
    pub timestamp: String,
    pub is_from_operator_side: bool,
    pub sender_name: String,
    pub sender_id: Option<String>,
    pub kind: MessageKind,
    pub payload: MessagePayload,
}

// --- Remote record shapes ---

/// A key/value pair read from the workflow variable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A whole-value replacement written to the workflow variable store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableWrite {
    pub key: String,
    pub value: String,
    pub description: String,
}

/// Response envelope shared by both message stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            total: 0,
            records: Vec::new(),
        }
    }
}

/// Record from the personal-account message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalRecord {
    pub msg_id: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub msg_type: i64,
    #[serde(default)]
    pub msg_datetime: String,
    #[serde(default)]
    pub is_self: bool,
}

/// Record from the official-account message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficialRecord {
    pub msg_id: String,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(rename = "msg_content", default)]
    pub msg_content: String,
    #[serde(default)]
    pub msg_type: String,
    #[serde(default)]
    pub msg_datetime: String,
}

/// A job submitted to the workflow trigger endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowJob {
    pub workflow: String,
    pub run_id: String,
    pub config: serde_json::Value,
}

/// Acknowledgement that a workflow job was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobAck {
    pub accepted: bool,
    pub run_id: String,
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for the records tests keep constructing.

use parley_core::types::{OfficialRecord, PersonalRecord};
use parley_core::{Account, AccountId, Room, RoomId};

pub fn account(id: &str, name: &str, origin_ip: &str) -> Account {
    Account {
        id: AccountId::from(id),
        display_name: name.to_string(),
        origin_ip: origin_ip.to_string(),
    }
}

pub fn room(id: &str, is_group: bool) -> Room {
    Room {
        room_id: RoomId::from(id),
        display_name: format!("room {id}"),
        is_group,
        last_message_preview: String::new(),
        last_message_time: String::new(),
    }
}

/// A room with a specific preview, for tests that need two fetches to differ.
pub fn room_with_preview(id: &str, is_group: bool, preview: &str) -> Room {
    Room {
        last_message_preview: preview.to_string(),
        ..room(id, is_group)
    }
}

pub fn personal_text(msg_id: &str, sender_id: &str, content: &str, datetime: &str) -> PersonalRecord {
    PersonalRecord {
        msg_id: msg_id.to_string(),
        sender_id: sender_id.to_string(),
        sender_name: None,
        content: content.to_string(),
        msg_type: 1,
        msg_datetime: datetime.to_string(),
        is_self: false,
    }
}

pub fn official_text(msg_id: &str, sender_id: &str, content: &str, datetime: &str) -> OfficialRecord {
    OfficialRecord {
        msg_id: msg_id.to_string(),
        sender_id: sender_id.to_string(),
        sender_name: None,
        msg_content: content.to_string(),
        msg_type: "1".to_string(),
        msg_datetime: datetime.to_string(),
    }
}

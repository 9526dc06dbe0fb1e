// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw message records, tagged by the store they came from.

use strum::Display;

use parley_core::types::{OfficialRecord, PersonalRecord};

/// Which message store a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SourceSchema {
    Personal,
    Official,
}

/// A record from either message store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    Personal(PersonalRecord),
    Official(OfficialRecord),
}

impl RawRecord {
    pub fn schema(&self) -> SourceSchema {
        match self {
            RawRecord::Personal(_) => SourceSchema::Personal,
            RawRecord::Official(_) => SourceSchema::Official,
        }
    }

    pub fn msg_id(&self) -> &str {
        match self {
            RawRecord::Personal(r) => &r.msg_id,
            RawRecord::Official(r) => &r.msg_id,
        }
    }

    pub fn sender_id(&self) -> &str {
        match self {
            RawRecord::Personal(r) => &r.sender_id,
            RawRecord::Official(r) => &r.sender_id,
        }
    }

    /// Explicit sender name, ignoring empty values.
    pub fn sender_name(&self) -> Option<&str> {
        let name = match self {
            RawRecord::Personal(r) => r.sender_name.as_deref(),
            RawRecord::Official(r) => r.sender_name.as_deref(),
        };
        name.filter(|n| !n.trim().is_empty())
    }

    pub fn content(&self) -> &str {
        match self {
            RawRecord::Personal(r) => &r.content,
            RawRecord::Official(r) => &r.msg_content,
        }
    }

    /// Numeric message type. The official store sends it as a string;
    /// one that does not parse is `None`.
    pub fn msg_type(&self) -> Option<i64> {
        match self {
            RawRecord::Personal(r) => Some(r.msg_type),
            RawRecord::Official(r) => r.msg_type.trim().parse().ok(),
        }
    }

    pub fn datetime(&self) -> &str {
        match self {
            RawRecord::Personal(r) => &r.msg_datetime,
            RawRecord::Official(r) => &r.msg_datetime,
        }
    }
}

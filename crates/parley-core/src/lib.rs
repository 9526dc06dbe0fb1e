// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parley operator console.
//!
//! This crate provides the domain types (accounts, rooms, automation
//! policy, display messages), the raw record shapes of both message
//! stores, the error type, and the remote-service traits every adapter
//! implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ParleyError;
pub use types::{
    Account, AccountId, AdapterType, AutomationPolicy, ChatKind, DisplayMessage, HealthStatus,
    HumanEscalationList, ListKind, Room, RoomId, RoomRef, RoomSet,
};

pub use traits::{
    ConversationDirectory, OfficialMessageStore, PersonalMessageStore, ServiceAdapter,
    VariableStore, WorkflowTrigger,
};

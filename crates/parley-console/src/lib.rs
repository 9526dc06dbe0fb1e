// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator console core for Parley.
//!
//! [`ConsoleSession`] is the explicit context object a presentation layer
//! drives: it owns the selected account and room, the automation policy,
//! the escalation list, and the running [`SyncLoop`] for the selected
//! account.

pub mod accounts;
pub mod console;
pub mod selection;
pub mod shutdown;
pub mod sync;

pub use accounts::{filter_accounts, OperatorScope};
pub use console::{ConsoleServices, ConsoleSession, Notice, NoticeLevel, ViewState};
pub use selection::{reconcile_selection, SelectionUpdate};
pub use sync::{RoomListSink, SyncHandle, SyncLoop, SyncState, SyncSupervisor};

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automation policy engine for the Parley operator console.
//!
//! - [`resolver`] decides whether automated replies are active for a room.
//! - [`reconciler`] applies an operator toggle to the two override lists,
//!   repairing rooms found in both and persisting whole lists.
//! - [`store`] maps policy values onto workflow variable keys.
//! - [`escalation`] reads and releases the human escalation list.

pub mod escalation;
pub mod reconciler;
pub mod resolver;
pub mod store;

pub use escalation::EscalationBook;
pub use reconciler::{plan_toggle, ListWrite, Reconciler, ToggleError, TogglePlan, ToggleTarget};
pub use resolver::resolve;
pub use store::{variable_key, PolicyStore, Purpose};

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Parley.
//!
//! In-memory fakes of every remote service, each with failure injection,
//! plus small fixture builders. No network, no timers beyond what a test
//! asks for.
//!
//! - [`MemoryVariableStore`] - variable store with write log and failing keys
//! - [`MockPersonalStore`] / [`MockOfficialStore`] - scripted message stores
//! - [`MockWorkflow`] - captures submitted jobs
//! - [`MockDirectory`] - scripted accounts, room lists, and counters

pub mod directory;
pub mod fixtures;
pub mod message_stores;
pub mod variables;
pub mod workflow;

pub use directory::MockDirectory;
pub use message_stores::{MockOfficialStore, MockPersonalStore};
pub use variables::MemoryVariableStore;
pub use workflow::MockWorkflow;

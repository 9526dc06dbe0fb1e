// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Remote-service trait definitions.
//!
//! Every service extends the [`ServiceAdapter`] base trait and uses
//! `#[async_trait]` so the console can hold them as trait objects.

pub mod adapter;
pub mod directory;
pub mod messages;
pub mod variables;
pub mod workflow;

pub use adapter::ServiceAdapter;
pub use directory::ConversationDirectory;
pub use messages::{OfficialMessageStore, PersonalMessageStore};
pub use variables::VariableStore;
pub use workflow::WorkflowTrigger;

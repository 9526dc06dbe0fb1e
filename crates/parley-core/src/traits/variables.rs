// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow variable store: the remote key/value store holding the
//! override lists, global toggles, escalation list, and free-text settings.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{Variable, VariableWrite};

/// Key/value store with whole-value replacement semantics.
#[async_trait]
pub trait VariableStore: ServiceAdapter {
    /// Reads one key. `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<Variable>, ParleyError>;

    /// Replaces the value stored under `write.key`.
    async fn set(&self, write: VariableWrite) -> Result<(), ParleyError>;
}

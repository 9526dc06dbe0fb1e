// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapters for the five remote services the console talks to.
//!
//! Each adapter wraps a `reqwest` client bound to one base URL from
//! `[remote]` and maps non-2xx answers to the matching [`ParleyError`]
//! variant, with the status and body text in the message.

mod http;

pub mod directory;
pub mod messages;
pub mod variables;
pub mod workflow;

use std::sync::Arc;
use std::time::Duration;

use parley_config::model::RemoteConfig;
use parley_core::ParleyError;

pub use directory::HttpDirectory;
pub use messages::{HttpOfficialStore, HttpPersonalStore};
pub use variables::HttpVariableStore;
pub use workflow::HttpWorkflowTrigger;

/// One client per remote service, built from `[remote]`.
#[derive(Debug, Clone)]
pub struct RemoteServices {
    pub directory: Arc<HttpDirectory>,
    pub variables: Arc<HttpVariableStore>,
    pub personal: Arc<HttpPersonalStore>,
    pub official: Arc<HttpOfficialStore>,
    pub workflow: Arc<HttpWorkflowTrigger>,
}

impl RemoteServices {
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ParleyError> {
        let timeout = config.request_timeout_secs.map(Duration::from_secs);
        Ok(Self {
            directory: Arc::new(HttpDirectory::new(&config.directory_url, timeout)?),
            variables: Arc::new(HttpVariableStore::new(&config.variables_url, timeout)?),
            personal: Arc::new(HttpPersonalStore::new(&config.personal_messages_url, timeout)?),
            official: Arc::new(HttpOfficialStore::new(&config.official_messages_url, timeout)?),
            workflow: Arc::new(HttpWorkflowTrigger::new(&config.workflow_url, timeout)?),
        })
    }
}

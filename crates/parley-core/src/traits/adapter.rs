// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base trait that every remote-service adapter implements.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::types::{AdapterType, HealthStatus};

/// Identity and health reporting shared by all remote services.
#[async_trait]
pub trait ServiceAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns which remote service this adapter talks to.
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the service's current status.
    async fn health_check(&self) -> Result<HealthStatus, ParleyError>;
}

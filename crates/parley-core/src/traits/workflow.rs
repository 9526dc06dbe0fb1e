// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget workflow job submission.

use async_trait::async_trait;

use crate::error::ParleyError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{JobAck, WorkflowJob};

/// Submits jobs to the workflow engine.
///
/// Returns once the job is accepted. Completion is never awaited; callers
/// observe the effect by re-polling the message stores.
#[async_trait]
pub trait WorkflowTrigger: ServiceAdapter {
    async fn submit(&self, job: WorkflowJob) -> Result<JobAck, ParleyError>;
}

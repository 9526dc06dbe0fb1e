// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow trigger fake that records submitted jobs.

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::types::{AdapterType, HealthStatus, JobAck, WorkflowJob};
use parley_core::{ParleyError, ServiceAdapter, WorkflowTrigger};

/// Accepts every job unless told to reject, and keeps them for assertions.
#[derive(Default)]
pub struct MockWorkflow {
    jobs: Mutex<Vec<WorkflowJob>>,
    reject: Mutex<bool>,
}

impl MockWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn jobs(&self) -> Vec<WorkflowJob> {
        self.jobs.lock().await.clone()
    }

    pub async fn set_reject(&self, reject: bool) {
        *self.reject.lock().await = reject;
    }
}

#[async_trait]
impl ServiceAdapter for MockWorkflow {
    fn name(&self) -> &str {
        "mock-workflow"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Workflow
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl WorkflowTrigger for MockWorkflow {
    async fn submit(&self, job: WorkflowJob) -> Result<JobAck, ParleyError> {
        if *self.reject.lock().await {
            return Err(ParleyError::Workflow {
                message: format!("job {} rejected", job.run_id),
                source: None,
            });
        }
        let ack = JobAck {
            accepted: true,
            run_id: job.run_id.clone(),
        };
        self.jobs.lock().await.push(job);
        Ok(ack)
    }
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow job submission over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use parley_core::types::{AdapterType, HealthStatus, JobAck, WorkflowJob};
use parley_core::{ParleyError, ServiceAdapter, WorkflowTrigger};
use reqwest::Method;
use serde::Serialize;
use tracing::debug;

use crate::http::{Concern, HttpService};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunRequest<'a> {
    run_id: &'a str,
    config: &'a serde_json::Value,
}

/// `POST {base}/workflows/{workflow}/runs`.
#[derive(Debug, Clone)]
pub struct HttpWorkflowTrigger {
    http: HttpService,
}

impl HttpWorkflowTrigger {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ParleyError> {
        Ok(Self {
            http: HttpService::new(base_url, timeout, Concern::Workflow)?,
        })
    }
}

#[async_trait]
impl ServiceAdapter for HttpWorkflowTrigger {
    fn name(&self) -> &str {
        "http-workflow"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Workflow
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(self.http.health().await)
    }
}

#[async_trait]
impl WorkflowTrigger for HttpWorkflowTrigger {
    async fn submit(&self, job: WorkflowJob) -> Result<JobAck, ParleyError> {
        let url = self.http.url(&["workflows", &job.workflow, "runs"]);
        let body = RunRequest {
            run_id: &job.run_id,
            config: &job.config,
        };
        let response = self
            .http
            .send(self.http.request(Method::POST, url).json(&body))
            .await?;
        let ack: JobAck = self.http.read_json(response).await?;
        debug!(workflow = %job.workflow, run_id = %ack.run_id, accepted = ack.accepted, "job submitted");
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn job() -> WorkflowJob {
        WorkflowJob {
            workflow: "send_message".into(),
            run_id: "run-1".into(),
            config: serde_json::json!({"roomId": "R1", "content": "hi"}),
        }
    }

    #[tokio::test]
    async fn posts_run_id_and_config() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/workflows/send_message/runs"))
            .and(body_json(serde_json::json!({
                "runId": "run-1",
                "config": {"roomId": "R1", "content": "hi"}
            })))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(serde_json::json!({"accepted": true, "runId": "run-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let trigger = HttpWorkflowTrigger::new(&server.uri(), None).unwrap();
        let ack = trigger.submit(job()).await.unwrap();
        assert!(ack.accepted);
        assert_eq!(ack.run_id, "run-1");
    }

    #[tokio::test]
    async fn rejection_status_is_workflow_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown workflow"))
            .mount(&server)
            .await;

        let trigger = HttpWorkflowTrigger::new(&server.uri(), None).unwrap();
        let err = trigger.submit(job()).await.unwrap_err();
        assert!(matches!(err, ParleyError::Workflow { .. }));
        assert!(!err.is_transient());
    }
}

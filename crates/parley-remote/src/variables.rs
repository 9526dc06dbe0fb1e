// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workflow variable store over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use parley_core::types::{AdapterType, HealthStatus, Variable, VariableWrite};
use parley_core::{ParleyError, ServiceAdapter, VariableStore};
use reqwest::Method;
use tracing::debug;

use crate::http::{Concern, HttpService, is_not_found};

/// `GET`/`PUT {base}/variables/{key}`. A 404 on read means the key was
/// never written.
#[derive(Debug, Clone)]
pub struct HttpVariableStore {
    http: HttpService,
}

impl HttpVariableStore {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ParleyError> {
        Ok(Self {
            http: HttpService::new(base_url, timeout, Concern::Variables)?,
        })
    }
}

#[async_trait]
impl ServiceAdapter for HttpVariableStore {
    fn name(&self) -> &str {
        "http-variables"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VariableStore
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(self.http.health().await)
    }
}

#[async_trait]
impl VariableStore for HttpVariableStore {
    async fn get(&self, key: &str) -> Result<Option<Variable>, ParleyError> {
        let url = self.http.url(&["variables", key]);
        let response = self.http.send(self.http.request(Method::GET, url)).await?;
        if is_not_found(&response) {
            debug!(key, "variable not set");
            return Ok(None);
        }
        self.http.read_json(response).await.map(Some)
    }

    async fn set(&self, write: VariableWrite) -> Result<(), ParleyError> {
        let url = self.http.url(&["variables", &write.key]);
        let response = self
            .http
            .send(self.http.request(Method::PUT, url).json(&write))
            .await?;
        self.http.ensure_success(response).await?;
        debug!(key = %write.key, "variable written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_value_and_treats_404_as_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/variables/Sales_A_human_rooms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "key": "Sales_A_human_rooms",
                "value": "[\"R1\"]"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/variables/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpVariableStore::new(&server.uri(), None).unwrap();
        let variable = store.get("Sales_A_human_rooms").await.unwrap().unwrap();
        assert_eq!(variable.value, "[\"R1\"]");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_puts_whole_value() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/variables/Sales_A_group_chat_ai"))
            .and(body_json(serde_json::json!({
                "key": "Sales_A_group_chat_ai",
                "value": "true",
                "description": "console"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpVariableStore::new(&server.uri(), None).unwrap();
        store
            .set(VariableWrite {
                key: "Sales_A_group_chat_ai".into(),
                value: "true".into(),
                description: "console".into(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn server_error_maps_to_variable_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let store = HttpVariableStore::new(&server.uri(), None).unwrap();
        let err = store
            .set(VariableWrite {
                key: "k".into(),
                value: "v".into(),
                description: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ParleyError::VariableStore { .. }));
        let text = err.to_string();
        assert!(text.contains("503") && text.contains("maintenance"), "got: {text}");
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let store = HttpVariableStore::new(&server.uri(), None).unwrap();
        let err = store.get("k").await.unwrap_err();
        assert!(matches!(err, ParleyError::Decode(_)));
    }
}

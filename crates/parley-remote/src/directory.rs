// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account and room directory over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use parley_core::types::{AdapterType, HealthStatus};
use parley_core::{Account, AccountId, ConversationDirectory, ParleyError, Room, ServiceAdapter};
use serde::Deserialize;

use crate::http::{Concern, HttpService};

#[derive(Deserialize)]
struct MessageCount {
    count: u64,
}

/// `GET {base}/accounts`, `/accounts/{id}/rooms` and
/// `/accounts/{id}/message-count`.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    http: HttpService,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ParleyError> {
        Ok(Self {
            http: HttpService::new(base_url, timeout, Concern::Directory)?,
        })
    }
}

#[async_trait]
impl ServiceAdapter for HttpDirectory {
    fn name(&self) -> &str {
        "http-directory"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Directory
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(self.http.health().await)
    }
}

#[async_trait]
impl ConversationDirectory for HttpDirectory {
    async fn list_accounts(&self) -> Result<Vec<Account>, ParleyError> {
        self.http.get_json(self.http.url(&["accounts"])).await
    }

    async fn list_rooms(&self, account_id: &AccountId) -> Result<Vec<Room>, ParleyError> {
        self.http
            .get_json(self.http.url(&["accounts", &account_id.0, "rooms"]))
            .await
    }

    async fn message_count(&self, account_id: &AccountId) -> Result<u64, ParleyError> {
        let count: MessageCount = self
            .http
            .get_json(self.http.url(&["accounts", &account_id.0, "message-count"]))
            .await?;
        Ok(count.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn lists_accounts_and_rooms() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "A", "displayName": "Sales", "originIp": "10.0.0.1"},
                {"id": "B", "displayName": "Support"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/accounts/A/rooms"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"roomId": "R1", "displayName": "Alice", "lastMessagePreview": "hi"},
                {"roomId": "G1", "displayName": "Team", "isGroup": true}
            ])))
            .mount(&server)
            .await;

        let directory = HttpDirectory::new(&server.uri(), None).unwrap();
        let accounts = directory.list_accounts().await.unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].origin_ip, "10.0.0.1");
        assert!(accounts[1].origin_ip.is_empty());

        let rooms = directory.list_rooms(&AccountId::from("A")).await.unwrap();
        assert!(!rooms[0].is_group);
        assert!(rooms[1].is_group);
        assert_eq!(rooms[0].last_message_preview, "hi");
    }

    #[tokio::test]
    async fn reads_message_counter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts/A/message-count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"count": 42})))
            .mount(&server)
            .await;

        let directory = HttpDirectory::new(&server.uri(), None).unwrap();
        assert_eq!(directory.message_count(&AccountId::from("A")).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn health_check_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let directory = HttpDirectory::new(&server.uri(), None).unwrap();
        assert!(matches!(
            directory.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));

        let unreachable = HttpDirectory::new("http://127.0.0.1:9", None).unwrap();
        assert!(matches!(
            unreachable.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}

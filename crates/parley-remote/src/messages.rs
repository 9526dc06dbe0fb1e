// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Personal and official message stores over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use parley_core::types::{AdapterType, Envelope, HealthStatus, OfficialRecord, PersonalRecord};
use parley_core::{
    AccountId, OfficialMessageStore, ParleyError, PersonalMessageStore, RoomId, ServiceAdapter,
};

use crate::http::{Concern, HttpService};

/// `GET {base}/messages?accountId=&roomId=`.
#[derive(Debug, Clone)]
pub struct HttpPersonalStore {
    http: HttpService,
}

impl HttpPersonalStore {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ParleyError> {
        Ok(Self {
            http: HttpService::new(base_url, timeout, Concern::Messages)?,
        })
    }
}

#[async_trait]
impl ServiceAdapter for HttpPersonalStore {
    fn name(&self) -> &str {
        "http-personal-messages"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::PersonalMessages
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(self.http.health().await)
    }
}

#[async_trait]
impl PersonalMessageStore for HttpPersonalStore {
    async fn query(
        &self,
        account_id: &AccountId,
        room_id: &RoomId,
    ) -> Result<Envelope<PersonalRecord>, ParleyError> {
        let mut url = self.http.url(&["messages"]);
        url.query_pairs_mut()
            .append_pair("accountId", &account_id.0)
            .append_pair("roomId", &room_id.0);
        self.http.get_json(url).await
    }
}

/// `GET {base}/messages?accountId=`. The official store has no room filter.
#[derive(Debug, Clone)]
pub struct HttpOfficialStore {
    http: HttpService,
}

impl HttpOfficialStore {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ParleyError> {
        Ok(Self {
            http: HttpService::new(base_url, timeout, Concern::Messages)?,
        })
    }
}

#[async_trait]
impl ServiceAdapter for HttpOfficialStore {
    fn name(&self) -> &str {
        "http-official-messages"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::OfficialMessages
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(self.http.health().await)
    }
}

#[async_trait]
impl OfficialMessageStore for HttpOfficialStore {
    async fn query(&self, account_id: &AccountId) -> Result<Envelope<OfficialRecord>, ParleyError> {
        let mut url = self.http.url(&["messages"]);
        url.query_pairs_mut().append_pair("accountId", &account_id.0);
        self.http.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn personal_query_filters_by_account_and_room() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .and(query_param("accountId", "A"))
            .and(query_param("roomId", "R 1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": 1,
                "records": [{
                    "msgId": "m1", "senderId": "peer", "content": "hi",
                    "msgType": 1, "msgDatetime": "2026-01-02 10:00:00"
                }]
            })))
            .mount(&server)
            .await;

        let store = HttpPersonalStore::new(&server.uri(), None).unwrap();
        let envelope = store
            .query(&AccountId::from("A"), &RoomId::from("R 1"))
            .await
            .unwrap();
        assert_eq!(envelope.total, 1);
        assert_eq!(envelope.records[0].content, "hi");
    }

    #[tokio::test]
    async fn official_query_reads_snake_case_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .and(query_param("accountId", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total": 1,
                "records": [{
                    "msgId": "ai_1", "senderId": "u1", "msg_content": "hello",
                    "msgType": "1", "msgDatetime": "2026-01-02 10:00:00"
                }]
            })))
            .mount(&server)
            .await;

        let store = HttpOfficialStore::new(&server.uri(), None).unwrap();
        let envelope = store.query(&AccountId::from("A")).await.unwrap();
        assert_eq!(envelope.records[0].msg_content, "hello");
    }

    #[tokio::test]
    async fn store_failure_maps_to_message_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = HttpOfficialStore::new(&server.uri(), None).unwrap();
        let err = store.query(&AccountId::from("A")).await.unwrap_err();
        assert!(matches!(err, ParleyError::MessageStore { .. }));
        assert!(err.is_transient());
    }
}

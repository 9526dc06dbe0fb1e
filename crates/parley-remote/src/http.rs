// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request plumbing shared by every adapter: URL building, transport error
//! mapping, status checks and JSON decoding.

use std::time::Duration;

use parley_core::ParleyError;
use parley_core::error::BoxError;
use parley_core::types::HealthStatus;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Which remote concern a request belongs to. Selects the error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Concern {
    Variables,
    Messages,
    Workflow,
    Directory,
}

impl Concern {
    pub(crate) fn error(self, message: String, source: Option<BoxError>) -> ParleyError {
        match self {
            Concern::Variables => ParleyError::VariableStore { message, source },
            Concern::Messages => ParleyError::MessageStore { message, source },
            Concern::Workflow => ParleyError::Workflow { message, source },
            Concern::Directory => ParleyError::Directory { message, source },
        }
    }
}

/// A `reqwest` client bound to one service base URL.
#[derive(Debug, Clone)]
pub(crate) struct HttpService {
    client: reqwest::Client,
    base_url: Url,
    concern: Concern,
    timeout: Option<Duration>,
}

impl HttpService {
    pub(crate) fn new(
        base_url: &str,
        timeout: Option<Duration>,
        concern: Concern,
    ) -> Result<Self, ParleyError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ParleyError::Config(format!("invalid service URL `{base_url}`: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ParleyError::Config(format!(
                "service URL `{base_url}` cannot carry a path"
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            concern.error(
                format!("failed to build HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            base_url,
            concern,
            timeout,
        })
    }

    /// Base URL extended with percent-encoded path segments.
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Send a request, mapping transport failures to this concern.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ParleyError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        debug!(status = %response.status(), url = %response.url(), "response received");
        Ok(response)
    }

    /// Fail with this concern's error unless the status is 2xx.
    pub(crate) async fn ensure_success(&self, response: Response) -> Result<Response, ParleyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        Err(self.concern.error(
            format!("{url} returned {status}: {}", body.trim()),
            None,
        ))
    }

    /// Check the status and decode a JSON body.
    pub(crate) async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ParleyError> {
        let response = self.ensure_success(response).await?;
        let url = response.url().clone();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_str(&body)
            .map_err(|e| ParleyError::Decode(format!("unexpected response from {url}: {e}")))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ParleyError> {
        let response = self.send(self.request(Method::GET, url)).await?;
        self.read_json(response).await
    }

    /// `GET {base}/health`: 2xx is healthy, any other status degraded,
    /// no answer unhealthy.
    pub(crate) async fn health(&self) -> HealthStatus {
        match self.request(Method::GET, self.url(&["health"])).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::Healthy,
            Ok(response) => HealthStatus::Degraded(format!("health endpoint returned {}", response.status())),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> ParleyError {
        if e.is_timeout() {
            if let Some(duration) = self.timeout {
                return ParleyError::Timeout { duration };
            }
        }
        self.concern
            .error(format!("HTTP request failed: {e}"), Some(Box::new(e)))
    }
}

/// Whether a response means "no such key".
pub(crate) fn is_not_found(response: &Response) -> bool {
    response.status() == StatusCode::NOT_FOUND
}

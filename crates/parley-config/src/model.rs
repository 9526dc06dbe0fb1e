// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parley operator console.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! reported at startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Parley configuration.
///
/// Every section is optional and defaults to values suitable for a
/// single local deployment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParleyConfig {
    /// Operator identity, logging, and timing.
    #[serde(default)]
    pub console: ConsoleConfig,

    /// Base URLs of the remote services.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Automation policy persistence settings.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Image payload resolution settings.
    #[serde(default)]
    pub media: MediaConfig,

    /// Which accounts the operator may see.
    #[serde(default)]
    pub scope: ScopeConfig,

    /// Workflow names used for operator actions.
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Operator console behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Operator name, recorded in workflow job payloads.
    #[serde(default = "default_operator")]
    pub operator: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Sync loop tick interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Delay before re-fetching messages after a send job is accepted.
    #[serde(default = "default_resend_poll_delay_ms")]
    pub resend_poll_delay_ms: u64,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            operator: default_operator(),
            log_level: default_log_level(),
            poll_interval_ms: default_poll_interval_ms(),
            resend_poll_delay_ms: default_resend_poll_delay_ms(),
        }
    }
}

fn default_operator() -> String {
    "operator".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_ms() -> u64 {
    3000
}

fn default_resend_poll_delay_ms() -> u64 {
    2000
}

/// Remote service endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Workflow variable store base URL.
    #[serde(default = "default_service_url")]
    pub variables_url: String,

    /// Personal-account message store base URL.
    #[serde(default = "default_service_url")]
    pub personal_messages_url: String,

    /// Official-account message store base URL.
    #[serde(default = "default_service_url")]
    pub official_messages_url: String,

    /// Workflow trigger endpoint base URL.
    #[serde(default = "default_service_url")]
    pub workflow_url: String,

    /// Account and room directory base URL.
    #[serde(default = "default_service_url")]
    pub directory_url: String,

    /// Per-request timeout. `None` keeps the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            variables_url: default_service_url(),
            personal_messages_url: default_service_url(),
            official_messages_url: default_service_url(),
            workflow_url: default_service_url(),
            directory_url: default_service_url(),
            request_timeout_secs: None,
        }
    }
}

fn default_service_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

/// Automation policy persistence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Description attached to every variable store write.
    #[serde(default = "default_write_description")]
    pub write_description: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            write_description: default_write_description(),
        }
    }
}

fn default_write_description() -> String {
    "managed by parley console".to_string()
}

/// Image payload resolution.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Object storage endpoint used to build image URLs.
    #[serde(default = "default_storage_endpoint")]
    pub storage_endpoint: String,

    /// Bucket holding images sent from the operator side.
    #[serde(default = "default_operator_bucket")]
    pub operator_bucket: String,

    /// Bucket holding images from the automated side.
    #[serde(default = "default_automation_bucket")]
    pub automation_bucket: String,

    /// Leading token of official-store message ids written by the automation.
    #[serde(default = "default_automation_sender_marker")]
    pub automation_sender_marker: String,

    /// Delimiter separating the leading token of an official-store message id.
    #[serde(default = "default_sender_token_delimiter")]
    pub sender_token_delimiter: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            storage_endpoint: default_storage_endpoint(),
            operator_bucket: default_operator_bucket(),
            automation_bucket: default_automation_bucket(),
            automation_sender_marker: default_automation_sender_marker(),
            sender_token_delimiter: default_sender_token_delimiter(),
        }
    }
}

fn default_storage_endpoint() -> String {
    "http://127.0.0.1:9000".to_string()
}

fn default_operator_bucket() -> String {
    "operator-media".to_string()
}

fn default_automation_bucket() -> String {
    "automation-media".to_string()
}

fn default_automation_sender_marker() -> String {
    "ai".to_string()
}

fn default_sender_token_delimiter() -> String {
    "_".to_string()
}

/// Operator permission scope.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeConfig {
    /// Only show accounts hosted on `owned_instances`.
    #[serde(default)]
    pub restrict_to_owned: bool,

    /// Origin IPs of the infrastructure instances the operator owns.
    #[serde(default)]
    pub owned_instances: Vec<String>,
}

/// Workflow names.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Workflow that delivers an operator-typed message.
    #[serde(default = "default_send_message_workflow")]
    pub send_message_workflow: String,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            send_message_workflow: default_send_message_workflow(),
        }
    }
}

fn default_send_message_workflow() -> String {
    "send_message".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_timings() {
        let config = ParleyConfig::default();
        assert_eq!(config.console.poll_interval_ms, 3000);
        assert_eq!(config.console.resend_poll_delay_ms, 2000);
        assert!(config.remote.request_timeout_secs.is_none());
    }

    #[test]
    fn scope_section_deserializes() {
        let toml_str = r#"
[scope]
restrict_to_owned = true
owned_instances = ["10.0.0.5", "10.0.0.6"]
"#;
        let config: ParleyConfig = toml::from_str(toml_str).unwrap();
        assert!(config.scope.restrict_to_owned);
        assert_eq!(config.scope.owned_instances.len(), 2);
    }

    #[test]
    fn media_deny_unknown_fields() {
        let toml_str = r#"
[media]
operator_bukket = "x"
"#;
        assert!(toml::from_str::<ParleyConfig>(toml_str).is_err());
    }
}

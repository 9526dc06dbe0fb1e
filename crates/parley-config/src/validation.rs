// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks that serde attributes cannot express.

use crate::diagnostic::ConfigError;
use crate::model::ParleyConfig;

/// Validate a deserialized configuration, collecting every problem found.
pub fn validate_config(config: &ParleyConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.console.poll_interval_ms == 0 {
        errors.push(ConfigError::invalid(
            "console.poll_interval_ms",
            "must be greater than zero",
        ));
    }

    if config.console.operator.trim().is_empty() {
        errors.push(ConfigError::invalid("console.operator", "must not be empty"));
    }

    let urls = [
        ("remote.variables_url", &config.remote.variables_url),
        (
            "remote.personal_messages_url",
            &config.remote.personal_messages_url,
        ),
        (
            "remote.official_messages_url",
            &config.remote.official_messages_url,
        ),
        ("remote.workflow_url", &config.remote.workflow_url),
        ("remote.directory_url", &config.remote.directory_url),
        ("media.storage_endpoint", &config.media.storage_endpoint),
    ];
    for (field, url) in urls {
        if !is_http_url(url) {
            errors.push(ConfigError::invalid(
                field,
                format!("`{url}` is not an http(s) URL"),
            ));
        }
    }

    if config.remote.request_timeout_secs == Some(0) {
        errors.push(ConfigError::invalid(
            "remote.request_timeout_secs",
            "must be greater than zero when set",
        ));
    }

    for (field, value) in [
        ("media.operator_bucket", &config.media.operator_bucket),
        ("media.automation_bucket", &config.media.automation_bucket),
        (
            "media.automation_sender_marker",
            &config.media.automation_sender_marker,
        ),
        (
            "media.sender_token_delimiter",
            &config.media.sender_token_delimiter,
        ),
        (
            "workflow.send_message_workflow",
            &config.workflow.send_message_workflow,
        ),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::invalid(field, "must not be empty"));
        }
    }

    if config.scope.restrict_to_owned && config.scope.owned_instances.is_empty() {
        errors.push(ConfigError::invalid(
            "scope.owned_instances",
            "must list at least one instance when restrict_to_owned is set",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.starts_with('/'))
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley doctor`: health-check every remote service.

use std::io::Write;
use std::time::{Duration, Instant};

use parley_console::ConsoleServices;
use parley_core::types::HealthStatus;
use parley_core::{ParleyError, ServiceAdapter};

use crate::inspect::io_error;

/// Status of one service check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single service check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

async fn check<A: ServiceAdapter + ?Sized>(adapter: &A) -> CheckResult {
    let start = Instant::now();
    let (status, message) = match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => (CheckStatus::Pass, "healthy".to_string()),
        Ok(HealthStatus::Degraded(reason)) => (CheckStatus::Warn, reason),
        Ok(HealthStatus::Unhealthy(reason)) => (CheckStatus::Fail, reason),
        Err(e) => (CheckStatus::Fail, e.to_string()),
    };
    CheckResult {
        name: adapter.adapter_type().to_string(),
        status,
        message,
        duration: start.elapsed(),
    }
}

/// Check all five services concurrently and print one line each.
///
/// Returns the number of services that are not healthy.
pub async fn run_doctor(services: &ConsoleServices, out: &mut impl Write) -> Result<usize, ParleyError> {
    let (directory, variables, personal, official, workflow) = tokio::join!(
        check(services.directory.as_ref()),
        check(services.variables.as_ref()),
        check(services.personal.as_ref()),
        check(services.official.as_ref()),
        check(services.workflow.as_ref()),
    );
    let results = [directory, variables, personal, official, workflow];

    let mut issues = 0;
    for result in &results {
        let label = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        if result.status != CheckStatus::Pass {
            issues += 1;
        }
        writeln!(
            out,
            "{label} {:<18} {} ({}ms)",
            result.name,
            result.message,
            result.duration.as_millis()
        )
        .map_err(io_error)?;
    }

    if issues > 0 {
        let word = if issues == 1 { "issue" } else { "issues" };
        writeln!(out, "{issues} {word} found.").map_err(io_error)?;
    }
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::services;

    #[tokio::test]
    async fn all_mock_services_pass() {
        let s = services().await;
        let mut buf = Vec::new();
        let issues = run_doctor(&s.console, &mut buf).await.unwrap();
        assert_eq!(issues, 0);

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 5);
        assert!(text.lines().all(|line| line.starts_with("[OK]")));
        for name in ["Directory", "VariableStore", "PersonalMessages", "OfficialMessages", "Workflow"] {
            assert!(text.contains(name), "missing {name} in {text}");
        }
    }
}

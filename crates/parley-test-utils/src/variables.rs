// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory variable store.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use parley_core::types::{AdapterType, HealthStatus, Variable, VariableWrite};
use parley_core::{ParleyError, ServiceAdapter, VariableStore};

#[derive(Default)]
struct Failures {
    keys: HashSet<String>,
    next_writes: usize,
    reads: bool,
    write_delay: Option<Duration>,
}

/// A variable store backed by a `HashMap`.
///
/// Every successful `set` is appended to a write log. Writes can be made
/// to fail for specific keys or for the next N calls; failed writes leave
/// the stored value untouched and are not logged. An optional delay on
/// writes lets tests queue several writers behind one another.
#[derive(Default)]
pub struct MemoryVariableStore {
    values: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<VariableWrite>>,
    failures: Mutex<Failures>,
}

impl MemoryVariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value.
    pub async fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.lock().await.insert(key.into(), value.into());
    }

    /// Current raw value of a key.
    pub async fn value(&self, key: &str) -> Option<String> {
        self.values.lock().await.get(key).cloned()
    }

    /// Current value of a key decoded as a JSON array of strings.
    pub async fn list(&self, key: &str) -> Vec<String> {
        self.value(key)
            .await
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// All successful writes, oldest first.
    pub async fn writes(&self) -> Vec<VariableWrite> {
        self.writes.lock().await.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.writes.lock().await.len()
    }

    /// Make every write to `key` fail until failures are cleared.
    pub async fn fail_writes_to(&self, key: impl Into<String>) {
        self.failures.lock().await.keys.insert(key.into());
    }

    /// Make the next `n` writes fail regardless of key.
    pub async fn fail_next_writes(&self, n: usize) {
        self.failures.lock().await.next_writes = n;
    }

    pub async fn fail_reads(&self, fail: bool) {
        self.failures.lock().await.reads = fail;
    }

    pub async fn set_write_delay(&self, delay: Option<Duration>) {
        self.failures.lock().await.write_delay = delay;
    }

    pub async fn clear_failures(&self) {
        *self.failures.lock().await = Failures::default();
    }
}

#[async_trait]
impl ServiceAdapter for MemoryVariableStore {
    fn name(&self) -> &str {
        "memory-variables"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VariableStore
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VariableStore for MemoryVariableStore {
    async fn get(&self, key: &str) -> Result<Option<Variable>, ParleyError> {
        if self.failures.lock().await.reads {
            return Err(ParleyError::VariableStore {
                message: format!("injected read failure for {key}"),
                source: None,
            });
        }
        Ok(self.values.lock().await.get(key).map(|value| Variable {
            key: key.to_string(),
            value: value.clone(),
        }))
    }

    async fn set(&self, write: VariableWrite) -> Result<(), ParleyError> {
        let delay = self.failures.lock().await.write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        {
            let mut failures = self.failures.lock().await;
            if failures.next_writes > 0 {
                failures.next_writes -= 1;
                return Err(ParleyError::VariableStore {
                    message: format!("injected write failure for {}", write.key),
                    source: None,
                });
            }
            if failures.keys.contains(&write.key) {
                return Err(ParleyError::VariableStore {
                    message: format!("injected write failure for {}", write.key),
                    source: None,
                });
            }
        }
        self.values
            .lock()
            .await
            .insert(write.key.clone(), write.value.clone());
        self.writes.lock().await.push(write);
        Ok(())
    }
}

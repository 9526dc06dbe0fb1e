// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley watch`: run the sync loop for one account and log every
//! refresh until shutdown is requested.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parley_console::{ConsoleServices, RoomListSink, SyncLoop};
use parley_core::{Account, AccountId, Room};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Logs each refreshed room list.
struct LoggingSink {
    display_name: String,
}

#[async_trait]
impl RoomListSink for LoggingSink {
    async fn apply(&self, account_id: &AccountId, rooms: Vec<Room>) {
        let latest = rooms
            .iter()
            .find(|room| !room.last_message_time.is_empty())
            .map(|room| room.display_name.as_str())
            .unwrap_or("-");
        info!(
            account_id = %account_id,
            account = %self.display_name,
            rooms = rooms.len(),
            latest,
            "room list refreshed"
        );
    }
}

/// Poll until `shutdown` is cancelled. Returns the number of refreshes.
pub async fn run_watch(
    services: &ConsoleServices,
    account: &Account,
    interval: Duration,
    shutdown: CancellationToken,
) -> u64 {
    let sink = Arc::new(LoggingSink {
        display_name: account.display_name.clone(),
    });
    let handle = SyncLoop::new(
        account.id.clone(),
        services.directory.clone(),
        sink,
        interval,
    )
    .spawn();
    info!(account_id = %account.id, interval_ms = interval.as_millis() as u64, "watching for new messages");

    shutdown.cancelled().await;
    let refreshes = handle.refresh_count();
    handle.stop().await;
    info!(account_id = %account.id, refreshes, "watch stopped");
    refreshes
}

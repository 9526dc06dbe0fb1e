// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only commands: `parley accounts`, `parley rooms` and
//! `parley messages`.

use std::io::Write;

use parley_config::model::MediaConfig;
use parley_console::{ConsoleServices, OperatorScope, filter_accounts};
use parley_core::types::MessagePayload;
use parley_core::{Account, AccountId, DisplayMessage, ParleyError, RoomId};
use parley_messages::MessageLoader;
use parley_policy::{EscalationBook, PolicyStore, resolve};

/// Look up an account the operator is allowed to act as.
pub async fn find_account(
    services: &ConsoleServices,
    scope: &OperatorScope,
    account_id: &str,
) -> Result<Account, ParleyError> {
    let accounts = filter_accounts(services.directory.list_accounts().await?, scope);
    accounts
        .into_iter()
        .find(|account| account.id.0 == account_id)
        .ok_or_else(|| ParleyError::Directory {
            message: format!("account {account_id} not found or outside operator scope"),
            source: None,
        })
}

pub async fn run_accounts(
    services: &ConsoleServices,
    scope: &OperatorScope,
    out: &mut impl Write,
) -> Result<(), ParleyError> {
    let accounts = filter_accounts(services.directory.list_accounts().await?, scope);
    for account in &accounts {
        writeln!(
            out,
            "{:<16} {:<24} {}",
            account.id.0, account.display_name, account.origin_ip
        )
        .map_err(io_error)?;
    }
    Ok(())
}

/// One line per room with its resolved automation state.
pub async fn run_rooms(
    services: &ConsoleServices,
    policy_store: &PolicyStore,
    account: &Account,
    out: &mut impl Write,
) -> Result<(), ParleyError> {
    let escalations = EscalationBook::new(policy_store.clone());
    let (policy, escalated, rooms) = futures::try_join!(
        policy_store.load_policy(account),
        escalations.load(account),
        services.directory.list_rooms(&account.id),
    )?;

    for room in &rooms {
        let automation = if resolve(&room.room_ref(), &policy) { "ai:on" } else { "ai:off" };
        let human = if escalated.contains(&room.room_id) { "human" } else { "" };
        writeln!(
            out,
            "{:<16} {:<6} {:<6} {:<5} {:<24} {}",
            room.room_id.0,
            room.kind().to_string(),
            automation,
            human,
            room.display_name,
            room.last_message_preview
        )
        .map_err(io_error)?;
    }
    Ok(())
}

pub async fn run_messages(
    services: &ConsoleServices,
    media: &MediaConfig,
    account: &Account,
    room_id: &RoomId,
    out: &mut impl Write,
) -> Result<(), ParleyError> {
    let loader = MessageLoader::new(
        services.personal.clone(),
        services.official.clone(),
        media.clone(),
    );
    let loaded = loader.load(account, room_id).await?;
    writeln!(out, "# {} messages from the {} store", loaded.messages.len(), loaded.schema)
        .map_err(io_error)?;
    for message in &loaded.messages {
        writeln!(out, "{}", render_message(message, &account.id)).map_err(io_error)?;
    }
    Ok(())
}

fn render_message(message: &DisplayMessage, account_id: &AccountId) -> String {
    let who = if message.is_from_operator_side {
        format!("{account_id} >")
    } else {
        format!("{} <", message.sender_name)
    };
    let body = match &message.payload {
        MessagePayload::Text { text } => text.clone(),
        MessagePayload::Image(image) => match (image.width, image.height) {
            (Some(w), Some(h)) => format!("[image {w}x{h}]"),
            _ => "[image]".to_string(),
        },
        MessagePayload::Media(media) => match media.duration_ms {
            Some(ms) => format!("[{} {}s]", message.kind, ms / 1000),
            None => format!("[{}]", message.kind),
        },
    };
    format!("{} {who} {body}", message.timestamp)
}

pub(crate) fn io_error(e: std::io::Error) -> ParleyError {
    ParleyError::Internal(format!("failed to write output: {e}"))
}

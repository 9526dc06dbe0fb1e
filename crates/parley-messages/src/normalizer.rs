// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw record to display message mapping.

use tracing::{debug, warn};

use parley_config::model::MediaConfig;
use parley_core::types::{MessageKind, MessagePayload};
use parley_core::{Account, DisplayMessage, RoomId};

use crate::media;
use crate::schema::RawRecord;
use crate::structured::{self, Structured};

/// Shown in place of an image whose thumbnail cannot be decoded.
pub const IMAGE_UNAVAILABLE: &str = "[image unavailable]";
/// Shown in place of structured content that does not parse.
pub const UNREADABLE_CONTENT: &str = "[unreadable message]";

/// Everything about the current view that record mapping depends on.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    pub account: &'a Account,
    pub room_id: &'a RoomId,
    pub media: &'a MediaConfig,
}

/// Map records, received newest-first, to display messages oldest-first.
///
/// Never fails: content that cannot be read becomes a placeholder and the
/// rest of the batch is still mapped.
pub fn normalize(records: Vec<RawRecord>, ctx: &NormalizeContext<'_>) -> Vec<DisplayMessage> {
    records
        .into_iter()
        .rev()
        .map(|record| normalize_record(&record, ctx))
        .collect()
}

/// Whether a record was sent from the account's side of the conversation.
///
/// Personal records are ours when the sender is the account itself.
/// Official records are ours when the message id's leading token is the
/// automation sender marker.
pub fn is_from_operator_side(record: &RawRecord, ctx: &NormalizeContext<'_>) -> bool {
    match record {
        RawRecord::Personal(r) => r.sender_id == ctx.account.id.0,
        RawRecord::Official(r) => r
            .msg_id
            .split(ctx.media.sender_token_delimiter.as_str())
            .next()
            .is_some_and(|token| token == ctx.media.automation_sender_marker),
    }
}

fn normalize_record(record: &RawRecord, ctx: &NormalizeContext<'_>) -> DisplayMessage {
    let from_operator_side = is_from_operator_side(record, ctx);
    let (kind, payload) = classify(record, from_operator_side, ctx);
    let sender_id = record.sender_id();

    DisplayMessage {
        id: record.msg_id().to_string(),
        timestamp: record.datetime().to_string(),
        is_from_operator_side: from_operator_side,
        sender_name: record.sender_name().unwrap_or(sender_id).to_string(),
        sender_id: (!sender_id.is_empty()).then(|| sender_id.to_string()),
        kind,
        payload,
    }
}

fn classify(
    record: &RawRecord,
    from_operator_side: bool,
    ctx: &NormalizeContext<'_>,
) -> (MessageKind, MessagePayload) {
    let content = record.content();

    if structured::is_structured(content) {
        return match structured::parse(content) {
            Ok(Structured::Image(element)) => match media::image_from_element(&element) {
                Some(image) => (MessageKind::Image, MessagePayload::Image(image)),
                None => {
                    warn!(msg_id = record.msg_id(), "image thumbnail missing or undecodable");
                    (MessageKind::Image, MessagePayload::text(IMAGE_UNAVAILABLE))
                }
            },
            Ok(Structured::Voice(element)) => (
                MessageKind::Voice,
                MessagePayload::Media(media::voice_from_element(&element)),
            ),
            Ok(Structured::Video(element)) => (
                MessageKind::Video,
                MessagePayload::Media(media::video_from_element(&element)),
            ),
            Ok(Structured::Other { root }) => {
                debug!(msg_id = record.msg_id(), root = %root, "unrecognized structured content");
                (MessageKind::Unknown, MessagePayload::text(content))
            }
            Err(e) => {
                warn!(msg_id = record.msg_id(), schema = %record.schema(), error = %e, "structured content replaced by placeholder");
                (MessageKind::Unknown, MessagePayload::text(UNREADABLE_CONTENT))
            }
        };
    }

    if record
        .msg_type()
        .is_some_and(|t| media::IMAGE_MESSAGE_TYPES.contains(&t))
    {
        if let Some(image) =
            media::stored_image(content, ctx.account, ctx.room_id, from_operator_side, ctx.media)
        {
            return (MessageKind::Image, MessagePayload::Image(image));
        }
    }

    (MessageKind::Text, MessagePayload::text(content))
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media descriptors for image, voice and video messages.
//!
//! Images arrive either as an XML element carrying a base64 thumbnail, or
//! as a plain message of an image type whose content is a file path. The
//! path form is mapped onto object storage:
//! `{endpoint}/{bucket}/{accountName}/{accountId}/{roomId}/{filename}`.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use tracing::debug;

use parley_config::model::MediaConfig;
use parley_core::types::{ImageRef, ImageSource, MediaRef};
use parley_core::{Account, RoomId};

use crate::structured::Element;

/// Message types the stores use for image-class content.
pub const IMAGE_MESSAGE_TYPES: [i64; 2] = [3, 34];

/// Decode a base64 thumbnail, accepting padded, unpadded and URL-safe
/// alphabets. Empty results count as failures.
pub fn decode_thumbnail(encoded: &str) -> Option<Vec<u8>> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    [STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(&compact).ok())
        .filter(|bytes| !bytes.is_empty())
}

/// Image descriptor from an `<img>` element. `None` when the thumbnail is
/// missing or does not decode.
pub fn image_from_element(element: &Element) -> Option<ImageRef> {
    let data = decode_thumbnail(element.attr("cdnthumburl")?)?;
    debug!(bytes = data.len(), "decoded inline thumbnail");
    Some(ImageRef {
        source: ImageSource::Inline { data },
        width: element.attr_u32("cdnthumbwidth"),
        height: element.attr_u32("cdnthumbheight"),
        length: element.attr_u64("length"),
    })
}

/// `<voicemsg voicelength="ms" length="bytes">`.
pub fn voice_from_element(element: &Element) -> MediaRef {
    MediaRef {
        duration_ms: element.attr_u64("voicelength"),
        length: element.attr_u64("length"),
    }
}

/// `<videomsg playlength="seconds" length="bytes">`.
pub fn video_from_element(element: &Element) -> MediaRef {
    MediaRef {
        duration_ms: element
            .attr_u64("playlength")
            .map(|secs| secs.saturating_mul(1000)),
        length: element.attr_u64("length"),
    }
}

/// The filename of a path-like content value, if it has one.
pub fn path_file_name(content: &str) -> Option<&str> {
    let content = content.trim();
    if !content.contains(['/', '\\']) {
        return None;
    }
    content
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Map a path-referenced image to its object-storage location.
///
/// Images sent from the operator side live in the operator bucket; images
/// captured from the counterpart by the automation pipeline live in the
/// automation bucket.
pub fn stored_image(
    content: &str,
    account: &Account,
    room_id: &RoomId,
    from_operator_side: bool,
    media: &MediaConfig,
) -> Option<ImageRef> {
    let file_name = path_file_name(content)?;
    let bucket = if from_operator_side {
        &media.operator_bucket
    } else {
        &media.automation_bucket
    };
    let key = format!(
        "{}/{}/{}/{}",
        account.display_name, account.id, room_id, file_name
    );
    let url = format!(
        "{}/{}/{}",
        media.storage_endpoint.trim_end_matches('/'),
        bucket,
        key
    );
    Some(ImageRef {
        source: ImageSource::Stored {
            bucket: bucket.clone(),
            key,
            url,
        },
        width: None,
        height: None,
        length: None,
    })
}

// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message normalization for the Parley operator console.
//!
//! Raw records from the personal-account and official-account message
//! stores are wrapped in [`RawRecord`] once at fetch time, then mapped to
//! [`DisplayMessage`](parley_core::DisplayMessage) by [`normalize`].
//! [`MessageLoader`] picks the store: personal first, official when the
//! personal store has no records for the room.

pub mod loader;
pub mod media;
pub mod normalizer;
pub mod schema;
pub mod structured;

pub use loader::{LoadedMessages, MessageLoader};
pub use normalizer::{normalize, NormalizeContext, IMAGE_UNAVAILABLE, UNREADABLE_CONTENT};
pub use schema::{RawRecord, SourceSchema};

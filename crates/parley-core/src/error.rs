// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parley operator console.

use thiserror::Error;

/// Boxed source error carried by the remote-service variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used across all Parley service traits and core operations.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// Configuration errors (invalid TOML, missing required fields, bad URLs).
    #[error("configuration error: {0}")]
    Config(String),

    /// Workflow variable store errors (policy lists, escalation list, free text).
    #[error("variable store error: {message}")]
    VariableStore {
        message: String,
        source: Option<BoxError>,
    },

    /// Personal-account or official-account message store errors.
    #[error("message store error: {message}")]
    MessageStore {
        message: String,
        source: Option<BoxError>,
    },

    /// Workflow trigger endpoint rejected or failed to acknowledge a job.
    #[error("workflow error: {message}")]
    Workflow {
        message: String,
        source: Option<BoxError>,
    },

    /// Account, room list, or message counter lookups failed.
    #[error("directory error: {message}")]
    Directory {
        message: String,
        source: Option<BoxError>,
    },

    /// A remote response body could not be decoded into the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// An operation needed an account or room selection that is not present.
    #[error("no {what} selected")]
    NotSelected { what: &'static str },

    /// The selection an operation was issued for changed before it completed.
    #[error("{what} selection changed before the operation completed")]
    Superseded { what: &'static str },

    /// Operation timed out at the transport.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// True for failures of a remote fetch that the next poll tick will retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ParleyError::VariableStore { .. }
                | ParleyError::MessageStore { .. }
                | ParleyError::Directory { .. }
                | ParleyError::Timeout { .. }
        )
    }
}

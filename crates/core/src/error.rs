// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tether-core operations.

use thiserror::Error;

/// Errors raised while encoding or decoding frames and payload values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame has no message type")]
    MissingType,

    #[error("unknown message type: '{0}'")]
    UnknownMessageType(String),
}

impl Error {
    /// True when the frame was well-formed JSON carrying a tag this client
    /// does not understand.
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Error::UnknownMessageType(_))
    }
}

/// A specialized Result type for tether-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

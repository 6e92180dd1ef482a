// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use tether::ConfigError;

/// Errors surfaced by the command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no namespace given\n  hint: pass --namespace or set 'name' in the config file")]
    MissingNamespace,

    #[error("invalid JSON value: {0}\n  hint: quote strings, e.g. '\"text\"', or use --raw")]
    InvalidValue(#[from] serde_json::Error),

    #[error("timed out after {ms} ms waiting for {waiting_for}")]
    Timeout { ms: u128, waiting_for: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

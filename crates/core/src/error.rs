// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for gw-core operations.

use thiserror::Error;

/// All possible errors that can occur in gw-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid session key: '{0}'\n  hint: agent session keys look like agent:<agent-id>:<key>")]
    InvalidSessionKey(String),
}

/// A specialized Result type for gw-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors raised while configuring or starting the gateway client.
///
/// Runtime failures of the gateway connection are not errors: they surface
/// as [`HostState::last_error`](crate::HostState::last_error) text.
#[derive(Debug, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid gateway URL '{0}'\n  hint: use ws://host:port or wss://host:port")]
    InvalidUrl(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for gwclient operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

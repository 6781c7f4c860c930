// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration management.
//!
//! Configuration is read from a TOML file and includes:
//! - `url`: WebSocket address of the gateway (e.g. `ws://127.0.0.1:18789`)
//! - `session_key`: session the client starts on before the handshake resolves one
//! - `reconnect_delay_ms`: pause before `gw-tail` reconnects after a close
//! - `[log] filter`: tracing filter used when `RUST_LOG` is unset

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::gateway::HostSettings;

/// Gateway client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Gateway URL (`ws://...` or `wss://...`).
    #[serde(default = "default_url")]
    pub url: String,
    /// Initial session key; replaced by the canonical key on handshake.
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Delay before reconnecting after the gateway closes (default: 1000).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Logging options.
    #[serde(default)]
    pub log: LogConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Tracing filter directive (e.g. `gwclient=debug`). `RUST_LOG` wins when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

fn default_url() -> String {
    "ws://127.0.0.1:18789".to_string()
}

fn default_session_key() -> String {
    "main".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    1_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: default_url(),
            session_key: default_session_key(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            log: LogConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Validates that the URL is a WebSocket address.
    pub fn validate_url(&self) -> Result<()> {
        let rest = self
            .url
            .strip_prefix("ws://")
            .or_else(|| self.url.strip_prefix("wss://"));
        match rest {
            Some(host) if !host.is_empty() => Ok(()),
            _ => Err(Error::InvalidUrl(self.url.clone())),
        }
    }

    /// Settings the host state starts from.
    pub fn host_settings(&self) -> HostSettings {
        HostSettings {
            gateway_url: self.url.clone(),
            session_key: self.session_key.clone(),
            last_active_session_key: self.session_key.clone(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

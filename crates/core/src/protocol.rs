// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol frames for gateway-client communication.
//!
//! The gateway speaks first:
//! - A `hello-ok` frame completes the handshake and carries the snapshot
//! - `event` frames follow, each optionally stamped with a sequence number
//!
//! Close and gap notifications are not frames on the wire; transports derive
//! them from the socket lifecycle and the sequence numbers respectively.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// Session defaults declared by the gateway at handshake time.
///
/// Every field is optional. A later handshake replaces the whole value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDefaults {
    /// Agent that owns the main session when none is named explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_agent_id: Option<String>,
    /// Configured name of the main conversation (e.g. "heartbeat").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_key: Option<String>,
    /// Fully qualified main session key; wins over everything else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_session_key: Option<String>,
    /// Session scope; "global" collapses every agent into one session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Point-in-time configuration delivered with `hello-ok`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_defaults: Option<SessionDefaults>,
    /// Remaining snapshot sections (presence, health, ...), kept opaque.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Successful handshake payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HelloOk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Snapshot>,
}

/// A single event pushed by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventFrame {
    /// Event name (e.g. "presence", "chat").
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Gateway sequence number; consecutive within one connection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

/// Why a connection ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    #[serde(default)]
    pub reason: String,
}

/// A discontinuity between the expected and received sequence numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GapInfo {
    pub expected: u64,
    pub received: u64,
}

/// Frames sent from the gateway to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum GatewayFrame {
    /// Handshake accepted.
    HelloOk(HelloOk),
    /// Pushed event.
    Event(EventFrame),
}

impl HelloOk {
    /// Creates a hello carrying only session defaults.
    pub fn with_session_defaults(defaults: SessionDefaults) -> Self {
        HelloOk {
            snapshot: Some(Snapshot {
                session_defaults: Some(defaults),
                extra: Map::new(),
            }),
        }
    }

    /// Returns the session defaults, if the snapshot carried any.
    pub fn session_defaults(&self) -> Option<&SessionDefaults> {
        self.snapshot.as_ref()?.session_defaults.as_ref()
    }
}

impl EventFrame {
    /// Creates an event without a sequence number.
    pub fn new(event: impl Into<String>, payload: Option<Value>) -> Self {
        EventFrame {
            event: event.into(),
            payload,
            seq: None,
        }
    }

    /// Stamps the event with a sequence number.
    pub fn with_seq(mut self, seq: u64) -> Self {
        self.seq = Some(seq);
        self
    }
}

impl CloseInfo {
    pub fn new(code: u16, reason: impl Into<String>) -> Self {
        CloseInfo {
            code,
            reason: reason.into(),
        }
    }

    /// User-visible description, e.g. `disconnected (1006): no reason`.
    pub fn describe(&self) -> String {
        let reason = if self.reason.is_empty() {
            "no reason"
        } else {
            self.reason.as_str()
        };
        format!("disconnected ({}): {}", self.code, reason)
    }
}

impl GapInfo {
    pub fn new(expected: u64, received: u64) -> Self {
        GapInfo { expected, received }
    }

    /// User-visible description of the gap.
    pub fn describe(&self) -> String {
        format!(
            "event gap detected (expected seq {}, got {}); refresh recommended",
            self.expected, self.received
        )
    }
}

impl GatewayFrame {
    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes the frame from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;

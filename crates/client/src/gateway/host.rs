// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Host state: the client's view of gateway connectivity and event history.
//!
//! The host is created once and lives as long as the client. Reconnects reset
//! fields in place; the event log is never truncated, so history from earlier
//! connections stays visible. Only the orchestrator mutates it, and only on
//! behalf of the current generation.

use std::collections::BTreeMap;

use gw_core::{
    is_main_session_alias, resolve_canonical_main_session_key, AgentSessionKey, CloseInfo,
    EventFrame, GapInfo, HelloOk,
};
use serde_json::Value;

/// User-facing settings mirrored from the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSettings {
    pub gateway_url: String,
    pub session_key: String,
    pub last_active_session_key: String,
}

/// Mutable record of the gateway connection.
#[derive(Debug, Clone, Default)]
pub struct HostState {
    /// True between an accepted handshake and the next close.
    pub connected: bool,
    /// Last user-visible connection problem (close or sequence gap).
    pub last_error: Option<String>,
    /// Session the client is looking at.
    pub session_key: String,
    /// Events in arrival order, across all connections.
    pub event_log: Vec<EventFrame>,
    pub settings: HostSettings,
    /// Last accepted handshake.
    pub hello: Option<HelloOk>,
    /// Loader output keyed by loader name.
    pub panels: BTreeMap<String, Value>,
}

impl HostState {
    /// Creates a disconnected host starting on the configured session.
    pub fn new(settings: HostSettings) -> Self {
        HostState {
            session_key: settings.session_key.clone(),
            settings,
            ..Default::default()
        }
    }

    /// Applies an accepted handshake.
    ///
    /// Returns the new session key when the gateway defaults moved it.
    pub(crate) fn apply_hello(&mut self, hello: HelloOk) -> Option<String> {
        self.connected = true;
        self.last_error = None;

        let resolved = resolve_canonical_main_session_key(hello.session_defaults());
        self.hello = Some(hello);

        let key = resolved.filter(|key| *key != self.session_key)?;
        self.session_key = key.clone();
        self.settings.session_key = key.clone();
        self.settings.last_active_session_key = key.clone();
        Some(key)
    }

    pub(crate) fn apply_close(&mut self, info: &CloseInfo) {
        self.connected = false;
        self.last_error = Some(info.describe());
    }

    pub(crate) fn apply_gap(&mut self, gap: &GapInfo) {
        self.last_error = Some(gap.describe());
    }

    pub(crate) fn append_event(&mut self, event: EventFrame) {
        self.event_log.push(event);
    }

    pub(crate) fn apply_panel(&mut self, name: &str, value: Value) {
        self.panels.insert(name.to_string(), value);
    }

    pub fn event_count(&self) -> usize {
        self.event_log.len()
    }

    pub fn last_event(&self) -> Option<&EventFrame> {
        self.event_log.last()
    }

    /// Whether the current session is the gateway's main session, under any of
    /// its aliases. False before the first handshake.
    pub fn is_main_session(&self) -> bool {
        let defaults = self.hello.as_ref().and_then(HelloOk::session_defaults);
        is_main_session_alias(&self.session_key, defaults)
    }

    /// Agent owning the current session, for `agent:<id>:...` keys.
    pub fn session_agent_id(&self) -> Option<String> {
        AgentSessionKey::parse(&self.session_key).map(|key| key.agent_id)
    }
}

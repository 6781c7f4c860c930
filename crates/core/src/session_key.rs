// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical main-session resolution.
//!
//! The gateway names its "main" conversation through [`SessionDefaults`]. The
//! canonical key is derived with the following precedence:
//! 1. An explicit `mainSessionKey`
//! 2. `scope = "global"` collapses everything into `global`
//! 3. `agent:<defaultAgentId>:<mainKey>`, both parts normalized
//!
//! Clients also accept a handful of aliases for the canonical key so that the
//! gateway does not have to spell out every variant (a gateway may rename
//! `main` to `heartbeat` for an agent, and `main` must keep working).
//!
//! Every function here is total: insufficient input yields `None` or `false`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::protocol::SessionDefaults;

/// Agent used when the gateway does not name one.
pub const DEFAULT_AGENT_ID: &str = "main";
/// Main key used when the gateway does not configure one.
pub const DEFAULT_MAIN_KEY: &str = "main";
/// Canonical key of a globally scoped gateway.
pub const GLOBAL_SESSION_KEY: &str = "global";

const AGENT_PREFIX: &str = "agent";
const MAX_AGENT_ID_LEN: usize = 64;

/// Canonicalizes an agent identifier.
///
/// Blank input falls back to [`DEFAULT_AGENT_ID`]. Valid ids are lowercased;
/// anything else has runs of unsupported characters collapsed into `-`,
/// surrounding dashes stripped, and is capped at 64 characters.
pub fn normalize_agent_id(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return DEFAULT_AGENT_ID.to_string();
    }
    if is_valid_agent_id(trimmed) {
        return trimmed.to_ascii_lowercase();
    }

    let mut cleaned = String::with_capacity(trimmed.len());
    let mut in_invalid_run = false;
    for ch in trimmed.to_lowercase().chars() {
        if is_agent_id_char(ch) {
            cleaned.push(ch);
            in_invalid_run = false;
        } else if !in_invalid_run {
            cleaned.push('-');
            in_invalid_run = true;
        }
    }

    let cleaned: String = cleaned
        .trim_matches('-')
        .chars()
        .take(MAX_AGENT_ID_LEN)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_AGENT_ID.to_string()
    } else {
        cleaned
    }
}

/// Canonicalizes a main key: trimmed, lowercased, [`DEFAULT_MAIN_KEY`] when blank.
pub fn normalize_main_key(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        DEFAULT_MAIN_KEY.to_string()
    } else {
        trimmed.to_lowercase()
    }
}

fn is_agent_id_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-'
}

fn is_valid_agent_id(id: &str) -> bool {
    let mut chars = id.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    id.len() <= MAX_AGENT_ID_LEN
        && first.is_ascii_alphanumeric()
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn same_key(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Builds `agent:<agent_id>:<main_key>` from already-normalized parts.
pub fn agent_session_key(agent_id: &str, key: &str) -> String {
    format!("{AGENT_PREFIX}:{agent_id}:{key}")
}

/// Derives the canonical main session key from the gateway defaults.
///
/// Returns `None` only when no defaults were received.
pub fn resolve_canonical_main_session_key(defaults: Option<&SessionDefaults>) -> Option<String> {
    let defaults = defaults?;

    if let Some(explicit) = defaults.main_session_key.as_deref() {
        if !explicit.trim().is_empty() {
            return Some(explicit.to_string());
        }
    }

    let is_global = defaults
        .scope
        .as_deref()
        .is_some_and(|scope| scope.trim().eq_ignore_ascii_case(GLOBAL_SESSION_KEY));
    if is_global {
        return Some(GLOBAL_SESSION_KEY.to_string());
    }

    Some(agent_session_key(
        &normalize_agent_id(defaults.default_agent_id.as_deref()),
        &normalize_main_key(defaults.main_key.as_deref()),
    ))
}

/// Returns true if `value` names the main session described by `defaults`.
///
/// Matching is case-insensitive. Besides the canonical key itself, the bare
/// `main`, the bare configured main key, `agent:<id>:main` and
/// `agent:<id>:<mainKey>` are accepted, unless the gateway is globally scoped.
pub fn is_main_session_alias(value: &str, defaults: Option<&SessionDefaults>) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    let (Some(defaults), Some(canonical)) = (defaults, resolve_canonical_main_session_key(defaults))
    else {
        return false;
    };

    let canonical = canonical.trim();
    if same_key(value, canonical) {
        return true;
    }
    if canonical.eq_ignore_ascii_case(GLOBAL_SESSION_KEY) {
        return false;
    }

    let agent_id = normalize_agent_id(defaults.default_agent_id.as_deref());
    let main_key = normalize_main_key(defaults.main_key.as_deref());
    [
        DEFAULT_MAIN_KEY.to_string(),
        main_key.clone(),
        agent_session_key(&agent_id, DEFAULT_MAIN_KEY),
        agent_session_key(&agent_id, &main_key),
    ]
    .iter()
    .any(|alias| same_key(value, alias))
}

/// An `agent:<agent_id>:<rest>` session key split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentSessionKey {
    pub agent_id: String,
    /// Everything after the agent id, e.g. `main` or `discord:group:dev`.
    pub rest: String,
}

impl AgentSessionKey {
    /// Splits an agent-qualified key; returns `None` for other shapes.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.trim().splitn(3, ':');
        let prefix = parts.next()?;
        let agent_id = parts.next()?;
        let rest = parts.next()?;
        if !prefix.eq_ignore_ascii_case(AGENT_PREFIX) || agent_id.is_empty() || rest.is_empty() {
            return None;
        }
        Some(AgentSessionKey {
            agent_id: agent_id.to_string(),
            rest: rest.to_string(),
        })
    }
}

impl FromStr for AgentSessionKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidSessionKey(s.to_string()))
    }
}

impl fmt::Display for AgentSessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&agent_session_key(&self.agent_id, &self.rest))
    }
}

#[cfg(test)]
#[path = "session_key_tests.rs"]
mod tests;

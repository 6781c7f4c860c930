// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gw-core: Shared primitives for the gateway sync client.
//!
//! This crate provides the wire protocol types, session key resolution, and
//! sequence tracking used by the gateway client and its transports. Everything
//! here is pure and free of I/O.

pub mod error;
pub mod protocol;
pub mod seq;
pub mod session_key;

pub use error::{Error, Result};
pub use protocol::{
    CloseInfo, EventFrame, GapInfo, GatewayFrame, HelloOk, SessionDefaults, Snapshot,
};
pub use seq::SeqTracker;
pub use session_key::{
    is_main_session_alias, normalize_agent_id, normalize_main_key,
    resolve_canonical_main_session_key, AgentSessionKey,
};

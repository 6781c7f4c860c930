// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway connection module.
//!
//! Keeps the local host state in step with a remote gateway across reconnects.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐ create  ┌─────────────┐     ┌─────────────┐
//! │ Orchestrator │────────►│  Transport  │◄───►│   Gateway   │
//! │ (connect)    │         │   (trait)   │     │   Server    │
//! └──────────────┘         └─────────────┘     └─────────────┘
//!     ▲      │                    │ callbacks (tagged with generation)
//!     │      ▼                    ▼
//!     │ ┌──────────────┐   ┌─────────────┐
//!     │ │  HostState   │   │ Notice queue│
//!     │ └──────────────┘   └─────────────┘
//!     └── GenerationGuard ◄───────┘
//! ```
//!
//! # Features
//!
//! - One generation per connection attempt; callbacks of older attempts are dropped
//! - Handshake seeds the canonical session key from the gateway defaults
//! - Sequence gaps and closes surface as `last_error` text
//! - Snapshot loaders run independently; one failing loader never blocks the rest
//! - Injectable transport factory for testing

mod generation;
mod host;
mod loaders;
mod orchestrator;
mod transport;

pub use generation::{Generation, GenerationGuard, Notice, NoticeKind};
pub use host::{HostSettings, HostState};
pub use loaders::{
    LoaderError, LoaderFuture, SnapshotLoader, SnapshotSectionLoader, AGENTS, ASSISTANT_IDENTITY,
    CRON, DEVICES, NODES,
};
pub use orchestrator::{Applied, Orchestrator};
pub use transport::{
    GatewayCallbacks, TransportClient, TransportFactory, WebSocketFactory, WebSocketTransport,
};

#[cfg(test)]
mod test_helpers;




#[cfg(test)]
mod orchestrator_tests;

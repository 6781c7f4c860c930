// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gwclient - Client-side view of an event-sourced gateway.
//!
//! Keeps a local [`HostState`] consistent with a remote gateway across
//! reconnects.
//!
//! # Main Components
//!
//! - [`Orchestrator`] - owns the connection generation, the active transport and the host state
//! - [`HostState`] - connection flag, last error, session key and event log
//! - [`ClientConfig`] - gateway URL and client defaults loaded from TOML
//! - [`Error`] - Error types for configuration and startup
//!
//! # Usage
//!
//! ```rust,ignore
//! use gwclient::{ClientConfig, Orchestrator};
//!
//! let config = ClientConfig::load(Path::new("gateway.toml"))?;
//! let mut orchestrator = Orchestrator::from_config(&config);
//! orchestrator.connect();
//! loop {
//!     if let Some(applied) = orchestrator.process_next().await {
//!         println!("{:?} -> {:?}", applied, orchestrator.host().last_error);
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod gateway;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use gateway::{HostSettings, HostState, Orchestrator};

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot loaders triggered by a successful handshake.
//!
//! Loaders populate the panels derived from a gateway (assistant identity,
//! agents, nodes, devices, cron). Their bodies live outside this crate; the
//! orchestrator only starts them and stores what they return. Each loader runs
//! on its own task, so a failure or panic in one never affects the others.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use gw_core::HelloOk;
use serde_json::Value;

/// Panel name of the assistant identity loader.
pub const ASSISTANT_IDENTITY: &str = "assistant-identity";
/// Panel name of the agents list loader.
pub const AGENTS: &str = "agents";
/// Panel name of the nodes loader.
pub const NODES: &str = "nodes";
/// Panel name of the devices loader.
pub const DEVICES: &str = "devices";
/// Panel name of the cron loader.
pub const CRON: &str = "cron";

/// Error reported by a snapshot loader.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    /// The loader ran and failed.
    #[error("{loader} loader failed: {message}")]
    Failed { loader: String, message: String },
}

impl LoaderError {
    pub fn failed(loader: impl Into<String>, message: impl Into<String>) -> Self {
        LoaderError::Failed {
            loader: loader.into(),
            message: message.into(),
        }
    }
}

/// Future returned by [`SnapshotLoader::load`].
pub type LoaderFuture = Pin<Box<dyn Future<Output = Result<Value, LoaderError>> + Send>>;

/// Populates one panel after a handshake.
pub trait SnapshotLoader: Send + Sync {
    /// Panel name; the loader's output is stored under it.
    fn name(&self) -> &str;

    /// Loads the panel for the given handshake.
    fn load(&self, hello: Arc<HelloOk>) -> LoaderFuture;
}

/// Copies one opaque section of the handshake snapshot into a panel.
///
/// Fails when the snapshot does not carry the section.
#[derive(Debug, Clone)]
pub struct SnapshotSectionLoader {
    panel: String,
    section: String,
}

impl SnapshotSectionLoader {
    pub fn new(panel: impl Into<String>, section: impl Into<String>) -> Self {
        SnapshotSectionLoader {
            panel: panel.into(),
            section: section.into(),
        }
    }
}

impl SnapshotLoader for SnapshotSectionLoader {
    fn name(&self) -> &str {
        &self.panel
    }

    fn load(&self, hello: Arc<HelloOk>) -> LoaderFuture {
        let found = hello
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.extra.get(&self.section))
            .cloned();
        let result = found.ok_or_else(|| {
            LoaderError::failed(
                self.panel.clone(),
                format!("snapshot has no '{}' section", self.section),
            )
        });
        Box::pin(async move { result })
    }
}

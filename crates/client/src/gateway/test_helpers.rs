// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for gateway module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use gw_core::HelloOk;
use serde_json::Value;

use super::host::{HostSettings, HostState};
use super::loaders::{LoaderError, LoaderFuture, SnapshotLoader};
use super::transport::{GatewayCallbacks, TransportClient, TransportFactory};

/// Handle on one transport client created by [`MockTransportFactory`].
#[derive(Clone)]
pub struct MockClient {
    pub url: String,
    pub callbacks: GatewayCallbacks,
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl MockClient {
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct MockTransport {
    client: MockClient,
}

impl TransportClient for MockTransport {
    fn start(&mut self) {
        self.client.started.store(true, Ordering::SeqCst);
    }

    fn stop(&mut self) {
        self.client.stopped.store(true, Ordering::SeqCst);
    }
}

/// Factory recording every client it creates, so tests can fire callbacks.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    created: Arc<Mutex<Vec<MockClient>>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `index`-th client created (0 = first connect).
    pub fn client(&self, index: usize) -> MockClient {
        self.created.lock().unwrap()[index].clone()
    }

    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&mut self, url: &str, callbacks: GatewayCallbacks) -> Box<dyn TransportClient> {
        let client = MockClient {
            url: url.to_string(),
            callbacks,
            started: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
        };
        self.created.lock().unwrap().push(client.clone());
        Box::new(MockTransport { client })
    }
}

/// Host starting on the given session, pointed at a local gateway.
pub fn make_host(session_key: &str) -> HostState {
    HostState::new(HostSettings {
        gateway_url: "ws://127.0.0.1:18789".to_string(),
        session_key: session_key.to_string(),
        last_active_session_key: session_key.to_string(),
    })
}

/// Loader that always returns the same value.
pub struct StaticLoader {
    pub name: String,
    pub value: Value,
}

impl StaticLoader {
    pub fn arc(name: &str, value: Value) -> Arc<dyn SnapshotLoader> {
        Arc::new(StaticLoader {
            name: name.to_string(),
            value,
        })
    }
}

impl SnapshotLoader for StaticLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, _hello: Arc<HelloOk>) -> LoaderFuture {
        let value = self.value.clone();
        Box::pin(async move { Ok(value) })
    }
}

/// Loader that always fails.
pub struct FailingLoader {
    pub name: String,
}

impl FailingLoader {
    pub fn arc(name: &str) -> Arc<dyn SnapshotLoader> {
        Arc::new(FailingLoader {
            name: name.to_string(),
        })
    }
}

impl SnapshotLoader for FailingLoader {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self, _hello: Arc<HelloOk>) -> LoaderFuture {
        let err = LoaderError::failed(self.name.clone(), "gateway rejected request");
        Box::pin(async move { Err(err) })
    }
}

/// Loader that panics before producing its future.
pub struct PanickingLoader;

impl SnapshotLoader for PanickingLoader {
    fn name(&self) -> &str {
        "assistant-identity"
    }

    fn load(&self, _hello: Arc<HelloOk>) -> LoaderFuture {
        panic!("identity loader crashed");
    }
}

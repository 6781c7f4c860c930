// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect orchestration.
//!
//! The orchestrator is the single consumer of the notice queue and the only
//! writer of the host state. `connect` opens a new generation, stops the
//! previous transport client and starts a fresh one. Reports from earlier
//! clients keep arriving on the same queue; the generation guard turns them
//! into no-ops, so no lock or listener bookkeeping is needed.
//!
//! Reconnecting after a close is the caller's decision; `run_until` is the
//! stock policy of reconnecting after a fixed delay.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use gw_core::HelloOk;
use tokio::sync::mpsc;
use tokio::time::Sleep;

use super::generation::{Generation, GenerationGuard, Notice, NoticeKind};
use super::host::HostState;
use super::loaders::SnapshotLoader;
use super::transport::{GatewayCallbacks, TransportClient, TransportFactory, WebSocketFactory};
use crate::config::ClientConfig;

/// What an admitted notice did to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Handshake accepted; carries the new session key if it moved.
    Hello { session_key: Option<String> },
    Closed,
    Gap,
    Event,
    /// A loader stored its panel.
    Panel(String),
    /// A loader failed; the host is unchanged.
    LoaderFailed(String),
}

/// Owns the connection generation, the active transport and the host state.
pub struct Orchestrator<F: TransportFactory = WebSocketFactory> {
    factory: F,
    guard: GenerationGuard,
    active: Option<Box<dyn TransportClient>>,
    host: HostState,
    loaders: Vec<Arc<dyn SnapshotLoader>>,
    tx: mpsc::UnboundedSender<Notice>,
    rx: mpsc::UnboundedReceiver<Notice>,
}

impl Orchestrator<WebSocketFactory> {
    /// Create an orchestrator connecting over WebSocket.
    pub fn from_config(config: &ClientConfig) -> Self {
        Orchestrator::new(WebSocketFactory, HostState::new(config.host_settings()))
    }
}

impl<F: TransportFactory> Orchestrator<F> {
    /// Create an orchestrator with a custom transport factory (for testing).
    pub fn new(factory: F, host: HostState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Orchestrator {
            factory,
            guard: GenerationGuard::new(),
            active: None,
            host,
            loaders: Vec::new(),
            tx,
            rx,
        }
    }

    /// Registers a loader to run after every accepted handshake.
    pub fn add_loader(&mut self, loader: Arc<dyn SnapshotLoader>) {
        self.loaders.push(loader);
    }

    pub fn with_loader(mut self, loader: Arc<dyn SnapshotLoader>) -> Self {
        self.add_loader(loader);
        self
    }

    pub fn host(&self) -> &HostState {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostState {
        &mut self.host
    }

    /// The live generation.
    pub fn generation(&self) -> Generation {
        self.guard.current()
    }

    /// Check if a transport client is active.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Starts a new connection attempt, superseding the previous one.
    pub fn connect(&mut self) -> Generation {
        let generation = self.guard.advance();

        if let Some(mut previous) = self.active.take() {
            previous.stop();
        }

        let callbacks = GatewayCallbacks::new(generation, self.tx.clone());
        let url = self.host.settings.gateway_url.clone();
        let mut client = self.factory.create(&url, callbacks);
        tracing::info!(url = %url, generation = %generation, "connecting to gateway");
        client.start();
        self.active = Some(client);
        generation
    }

    /// Stops the active client and invalidates its pending reports.
    pub fn disconnect(&mut self) {
        if let Some(mut client) = self.active.take() {
            client.stop();
        }
        let generation = self.guard.advance();
        self.host.connected = false;
        tracing::info!(generation = %generation, "disconnected from gateway");
    }

    /// Applies a notice if it belongs to the live generation.
    ///
    /// Stale notices are dropped and return `None`.
    pub fn dispatch(&mut self, notice: Notice) -> Option<Applied> {
        let generation = notice.generation;
        let Some(kind) = self.guard.admit(notice) else {
            tracing::trace!(
                generation = %generation,
                current = %self.guard.current(),
                "dropping stale gateway notice"
            );
            return None;
        };

        let applied = match kind {
            NoticeKind::Hello(hello) => {
                let hello = Arc::new(hello);
                self.start_loaders(generation, &hello);
                let session_key = self.host.apply_hello(Arc::unwrap_or_clone(hello));
                tracing::info!(
                    generation = %generation,
                    session_key = %self.host.session_key,
                    "gateway handshake accepted"
                );
                Applied::Hello { session_key }
            }
            NoticeKind::Close(info) => {
                self.host.apply_close(&info);
                tracing::warn!(code = info.code, reason = %info.reason, "gateway closed");
                Applied::Closed
            }
            NoticeKind::Gap(gap) => {
                self.host.apply_gap(&gap);
                tracing::warn!(
                    expected = gap.expected,
                    received = gap.received,
                    "gateway event gap"
                );
                Applied::Gap
            }
            NoticeKind::Event(event) => {
                tracing::debug!(event = %event.event, seq = ?event.seq, "gateway event");
                self.host.append_event(event);
                Applied::Event
            }
            NoticeKind::Loaded { loader, outcome } => match outcome {
                Ok(value) => {
                    self.host.apply_panel(&loader, value);
                    Applied::Panel(loader)
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                    Applied::LoaderFailed(loader)
                }
            },
        };
        Some(applied)
    }

    /// Applies every notice already queued, returning how many were admitted.
    pub fn process_pending(&mut self) -> usize {
        let mut admitted = 0;
        while let Ok(notice) = self.rx.try_recv() {
            if self.dispatch(notice).is_some() {
                admitted += 1;
            }
        }
        admitted
    }

    /// Waits for the next notice and applies it.
    ///
    /// Returns `None` when the notice was stale.
    pub async fn process_next(&mut self) -> Option<Applied> {
        // The orchestrator holds a sender, so the queue never closes.
        let notice = self.rx.recv().await?;
        self.dispatch(notice)
    }

    /// Applies notices until `shutdown` resolves, reconnecting
    /// `reconnect_delay` after every close.
    ///
    /// `on_applied` sees each admitted notice after the host was updated.
    /// `shutdown` is polled throughout, including while a reconnect is pending.
    pub async fn run_until<S, H>(
        &mut self,
        reconnect_delay: Duration,
        shutdown: S,
        mut on_applied: H,
    ) where
        S: Future,
        H: FnMut(&HostState, &Applied),
    {
        tokio::pin!(shutdown);
        let mut reconnect: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                () = async {
                    if let Some(delay) = reconnect.as_mut() {
                        delay.await;
                    }
                }, if reconnect.is_some() => {
                    reconnect = None;
                    self.connect();
                }
                applied = self.process_next() => {
                    let Some(applied) = applied else { continue };
                    if applied == Applied::Closed {
                        tracing::debug!(delay = ?reconnect_delay, "reconnect scheduled");
                        reconnect = Some(Box::pin(tokio::time::sleep(reconnect_delay)));
                    }
                    on_applied(&self.host, &applied);
                }
            }
        }
    }

    /// Spawns every loader for this handshake; each reports back as a notice.
    fn start_loaders(&self, generation: Generation, hello: &Arc<HelloOk>) {
        if self.loaders.is_empty() {
            return;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!("snapshot loaders skipped: {}", e);
                return;
            }
        };
        for loader in &self.loaders {
            let callbacks = GatewayCallbacks::new(generation, self.tx.clone());
            let loader = Arc::clone(loader);
            let hello = Arc::clone(hello);
            // A panicking loader takes down only its own task.
            handle.spawn(async move {
                let outcome = loader.load(hello).await;
                callbacks.on_loaded(loader.name().to_string(), outcome);
            });
        }
    }
}

impl<F: TransportFactory> Drop for Orchestrator<F> {
    fn drop(&mut self) {
        if let Some(mut client) = self.active.take() {
            client.stop();
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the gateway connection.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! A transport never touches the host state. It reports through the
//! [`GatewayCallbacks`] it was created with, which stamp every report with the
//! generation of the connection attempt and queue it for the orchestrator.

use gw_core::{CloseInfo, EventFrame, GapInfo, GatewayFrame, HelloOk, SeqTracker};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::generation::{Generation, Notice, NoticeKind};
use super::loaders::LoaderError;

/// Close code used when the peer sent no status.
pub const CLOSE_NO_STATUS: u16 = 1005;
/// Close code used when the connection failed or dropped without a close frame.
pub const CLOSE_ABNORMAL: u16 = 1006;

/// Callback entry points handed to one transport client.
///
/// Cloning keeps the generation binding. None of the methods fail: once the
/// orchestrator is gone, reports are discarded.
#[derive(Debug, Clone)]
pub struct GatewayCallbacks {
    generation: Generation,
    tx: mpsc::UnboundedSender<Notice>,
}

impl GatewayCallbacks {
    pub(crate) fn new(generation: Generation, tx: mpsc::UnboundedSender<Notice>) -> Self {
        GatewayCallbacks { generation, tx }
    }

    /// Generation these callbacks are bound to.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn on_hello(&self, hello: HelloOk) {
        self.send(NoticeKind::Hello(hello));
    }

    pub fn on_close(&self, info: CloseInfo) {
        self.send(NoticeKind::Close(info));
    }

    pub fn on_gap(&self, gap: GapInfo) {
        self.send(NoticeKind::Gap(gap));
    }

    pub fn on_event(&self, event: EventFrame) {
        self.send(NoticeKind::Event(event));
    }

    pub(crate) fn on_loaded(&self, loader: String, outcome: Result<Value, LoaderError>) {
        self.send(NoticeKind::Loaded { loader, outcome });
    }

    fn send(&self, kind: NoticeKind) {
        let notice = Notice {
            generation: self.generation,
            kind,
        };
        if self.tx.send(notice).is_err() {
            tracing::trace!(generation = %self.generation, "orchestrator gone, report discarded");
        }
    }
}

/// One connection attempt to the gateway.
///
/// `start` and `stop` return immediately; any I/O happens in the background.
pub trait TransportClient: Send {
    /// Begins connecting and reporting.
    fn start(&mut self);

    /// Stops reporting. Best-effort; does not wait for network teardown.
    fn stop(&mut self);
}

/// Builds a transport client per connection attempt.
pub trait TransportFactory {
    fn create(&mut self, url: &str, callbacks: GatewayCallbacks) -> Box<dyn TransportClient>;
}

/// WebSocket transport implementation using tokio-tungstenite.
///
/// The gateway speaks first: a `hello-ok` frame, then `event` frames. Sequence
/// numbers are checked per connection and gaps are reported before the event
/// that revealed them.
pub struct WebSocketTransport {
    url: String,
    callbacks: GatewayCallbacks,
    /// Reader task, while started.
    task: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new(url: impl Into<String>, callbacks: GatewayCallbacks) -> Self {
        WebSocketTransport {
            url: url.into(),
            callbacks,
            task: None,
        }
    }
}

impl TransportClient for WebSocketTransport {
    fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let reader = read_gateway(self.url.clone(), self.callbacks.clone());
                self.task = Some(handle.spawn(reader));
            }
            Err(e) => {
                tracing::warn!("cannot start gateway transport: {}", e);
                self.callbacks
                    .on_close(CloseInfo::new(CLOSE_ABNORMAL, "no async runtime"));
            }
        }
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Creates [`WebSocketTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketFactory;

impl TransportFactory for WebSocketFactory {
    fn create(&mut self, url: &str, callbacks: GatewayCallbacks) -> Box<dyn TransportClient> {
        Box::new(WebSocketTransport::new(url, callbacks))
    }
}

/// Reads frames until the socket ends, reporting everything through `callbacks`.
async fn read_gateway(url: String, callbacks: GatewayCallbacks) {
    use futures_util::StreamExt;
    use tokio_tungstenite::tungstenite::Message;

    let mut ws = match tokio_tungstenite::connect_async(&url).await {
        Ok((ws, _)) => ws,
        Err(e) => {
            tracing::debug!(url = %url, "gateway connect failed: {}", e);
            callbacks.on_close(CloseInfo::new(CLOSE_ABNORMAL, e.to_string()));
            return;
        }
    };
    tracing::debug!(url = %url, generation = %callbacks.generation(), "gateway socket open");

    let mut seq = SeqTracker::new();
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => match GatewayFrame::from_json(&text) {
                Ok(GatewayFrame::HelloOk(hello)) => callbacks.on_hello(hello),
                Ok(GatewayFrame::Event(event)) => {
                    if let Some(gap) = seq.observe(event.seq) {
                        callbacks.on_gap(gap);
                    }
                    callbacks.on_event(event);
                }
                Err(e) => {
                    // Responses and frame types this client does not consume
                    tracing::trace!("skipping gateway frame: {}", e);
                }
            },
            Some(Ok(Message::Close(frame))) => {
                let info = frame
                    .map(|f| CloseInfo::new(u16::from(f.code), f.reason.as_str()))
                    .unwrap_or_else(|| CloseInfo::new(CLOSE_NO_STATUS, ""));
                callbacks.on_close(info);
                return;
            }
            Some(Ok(_)) => {
                // Ignore ping/pong and binary frames
                continue;
            }
            Some(Err(e)) => {
                callbacks.on_close(CloseInfo::new(CLOSE_ABNORMAL, e.to_string()));
                return;
            }
            None => {
                callbacks.on_close(CloseInfo::new(CLOSE_NO_STATUS, ""));
                return;
            }
        }
    }
}

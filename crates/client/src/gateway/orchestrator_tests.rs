// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the reconnect orchestrator.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::generation::{Generation, Notice, NoticeKind};
use super::orchestrator::{Applied, Orchestrator};
use super::test_helpers::{
    make_host, FailingLoader, MockTransportFactory, PanickingLoader, StaticLoader,
};
use gw_core::{CloseInfo, EventFrame, GapInfo, HelloOk, SessionDefaults};
use serde_json::json;
use std::time::Duration;

fn connect_twice() -> (Orchestrator<MockTransportFactory>, MockTransportFactory) {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"));
    orchestrator.connect();
    orchestrator.connect();
    (orchestrator, factory)
}

fn denver_hello() -> HelloOk {
    HelloOk::with_session_defaults(SessionDefaults {
        default_agent_id: Some("denver-move".to_string()),
        main_key: Some("heartbeat".to_string()),
        ..Default::default()
    })
}

#[test]
fn test_connect_bumps_generation_and_starts_client() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"));
    assert_eq!(orchestrator.generation(), Generation::INITIAL);
    assert!(!orchestrator.is_active());

    let generation = orchestrator.connect();
    assert_eq!(generation.get(), 1);
    assert!(orchestrator.is_active());

    let client = factory.client(0);
    assert_eq!(client.url, "ws://127.0.0.1:18789");
    assert_eq!(client.callbacks.generation(), generation);
    assert!(client.is_started());
    assert!(!client.is_stopped());
}

#[test]
fn test_reconnect_stops_previous_client() {
    let (orchestrator, factory) = connect_twice();
    assert_eq!(factory.created_count(), 2);
    assert_eq!(orchestrator.generation().get(), 2);

    let first = factory.client(0);
    let second = factory.client(1);
    assert!(first.is_stopped());
    assert!(second.is_started());
    assert!(!second.is_stopped());
}

#[test]
fn test_stale_gap_is_ignored_active_gap_applies() {
    let (mut orchestrator, factory) = connect_twice();

    factory.client(0).callbacks.on_gap(GapInfo::new(10, 13));
    assert_eq!(orchestrator.process_pending(), 0);
    assert_eq!(orchestrator.host().last_error, None);

    factory.client(1).callbacks.on_gap(GapInfo::new(20, 24));
    assert_eq!(orchestrator.process_pending(), 1);
    assert_eq!(
        orchestrator.host().last_error.as_deref(),
        Some("event gap detected (expected seq 20, got 24); refresh recommended")
    );
}

#[test]
fn test_stale_close_is_ignored_active_close_applies() {
    let (mut orchestrator, factory) = connect_twice();

    factory.client(0).callbacks.on_close(CloseInfo::new(1005, ""));
    orchestrator.process_pending();
    assert_eq!(orchestrator.host().last_error, None);

    factory.client(1).callbacks.on_close(CloseInfo::new(1005, ""));
    orchestrator.process_pending();
    assert_eq!(
        orchestrator.host().last_error.as_deref(),
        Some("disconnected (1005): no reason")
    );
}

#[test]
fn test_stale_event_is_ignored_active_event_applies() {
    let (mut orchestrator, factory) = connect_twice();
    let event = EventFrame::new("presence", Some(json!({"presence": [{"host": "gw"}]})));

    factory.client(0).callbacks.on_event(event.clone());
    orchestrator.process_pending();
    assert_eq!(orchestrator.host().event_count(), 0);

    factory.client(1).callbacks.on_event(event.clone());
    orchestrator.process_pending();
    assert_eq!(orchestrator.host().event_count(), 1);
    assert_eq!(orchestrator.host().event_log[0].payload, event.payload);
}

#[test]
fn test_stale_hello_leaves_host_untouched() {
    let (mut orchestrator, factory) = connect_twice();

    factory.client(0).callbacks.on_hello(denver_hello());
    orchestrator.process_pending();
    assert!(!orchestrator.host().connected);
    assert_eq!(orchestrator.host().session_key, "main");
    assert!(orchestrator.host().hello.is_none());
}

#[test]
fn test_hello_normalizes_session_key() {
    let factory = MockTransportFactory::new();
    let mut orchestrator =
        Orchestrator::new(factory.clone(), make_host("agent:denver-move:main"));
    orchestrator.connect();

    factory.client(0).callbacks.on_hello(denver_hello());
    orchestrator.process_pending();

    let host = orchestrator.host();
    assert!(host.connected);
    assert_eq!(host.session_key, "agent:denver-move:heartbeat");
    assert_eq!(host.settings.session_key, "agent:denver-move:heartbeat");
    assert_eq!(
        host.settings.last_active_session_key,
        "agent:denver-move:heartbeat"
    );
}

#[test]
fn test_dispatch_reports_what_was_applied() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory, make_host("main"));
    let generation = orchestrator.connect();

    let applied = orchestrator.dispatch(Notice {
        generation,
        kind: NoticeKind::Hello(denver_hello()),
    });
    assert_eq!(
        applied,
        Some(Applied::Hello {
            session_key: Some("agent:denver-move:heartbeat".to_string())
        })
    );

    let stale = orchestrator.dispatch(Notice {
        generation: Generation::INITIAL,
        kind: NoticeKind::Gap(GapInfo::new(1, 2)),
    });
    assert_eq!(stale, None);
    assert_eq!(orchestrator.host().last_error, None);
}

#[test]
fn test_events_keep_arriving_after_gap() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"));
    orchestrator.connect();
    let callbacks = factory.client(0).callbacks;

    callbacks.on_event(EventFrame::new("tick", None).with_seq(1));
    callbacks.on_gap(GapInfo::new(2, 5));
    callbacks.on_event(EventFrame::new("tick", None).with_seq(5));
    callbacks.on_event(EventFrame::new("tick", None).with_seq(6));
    assert_eq!(orchestrator.process_pending(), 4);

    let seqs: Vec<_> = orchestrator.host().event_log.iter().map(|e| e.seq).collect();
    assert_eq!(seqs, vec![Some(1), Some(5), Some(6)]);
    assert!(orchestrator
        .host()
        .last_error
        .as_deref()
        .unwrap()
        .starts_with("event gap detected"));
}

#[test]
fn test_history_survives_reconnect() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"));
    orchestrator.connect();
    factory.client(0).callbacks.on_event(EventFrame::new("chat", None));
    orchestrator.process_pending();

    orchestrator.connect();
    factory.client(0).callbacks.on_event(EventFrame::new("late", None));
    factory.client(1).callbacks.on_event(EventFrame::new("chat", None));
    orchestrator.process_pending();

    let names: Vec<_> = orchestrator
        .host()
        .event_log
        .iter()
        .map(|e| e.event.as_str())
        .collect();
    assert_eq!(names, vec!["chat", "chat"]);
}

#[test]
fn test_disconnect_invalidates_active_client() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"));
    orchestrator.connect();
    let client = factory.client(0);
    client.callbacks.on_hello(HelloOk::default());
    orchestrator.process_pending();
    assert!(orchestrator.host().connected);

    orchestrator.disconnect();
    assert!(client.is_stopped());
    assert!(!orchestrator.is_active());
    assert!(!orchestrator.host().connected);

    client.callbacks.on_close(CloseInfo::new(1000, "bye"));
    assert_eq!(orchestrator.process_pending(), 0);
    assert_eq!(orchestrator.host().last_error, None);
}

#[tokio::test]
async fn test_loaders_populate_panels() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"))
        .with_loader(StaticLoader::arc("agents", json!(["denver-move"])))
        .with_loader(StaticLoader::arc("nodes", json!([])));
    orchestrator.connect();

    factory.client(0).callbacks.on_hello(HelloOk::default());
    assert!(matches!(
        orchestrator.process_next().await,
        Some(Applied::Hello { .. })
    ));

    let mut panels = Vec::new();
    for _ in 0..2 {
        match orchestrator.process_next().await {
            Some(Applied::Panel(name)) => panels.push(name),
            other => panic!("expected panel, got {:?}", other),
        }
    }
    panels.sort();
    assert_eq!(panels, vec!["agents", "nodes"]);
    assert_eq!(orchestrator.host().panels["agents"], json!(["denver-move"]));
}

#[tokio::test]
async fn test_failing_loader_is_isolated() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"))
        .with_loader(FailingLoader::arc("devices"))
        .with_loader(StaticLoader::arc("cron", json!({"jobs": 3})));
    orchestrator.connect();

    factory.client(0).callbacks.on_hello(HelloOk::default());
    orchestrator.process_next().await;

    let mut outcomes = vec![
        orchestrator.process_next().await.unwrap(),
        orchestrator.process_next().await.unwrap(),
    ];
    outcomes.sort_by_key(|applied| format!("{:?}", applied));
    assert_eq!(
        outcomes,
        vec![
            Applied::LoaderFailed("devices".to_string()),
            Applied::Panel("cron".to_string()),
        ]
    );

    let host = orchestrator.host();
    assert!(host.connected);
    assert_eq!(host.last_error, None);
    assert_eq!(host.panels.get("cron"), Some(&json!({"jobs": 3})));
    assert!(!host.panels.contains_key("devices"));
}

#[tokio::test]
async fn test_panicking_loader_is_isolated() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"))
        .with_loader(std::sync::Arc::new(PanickingLoader))
        .with_loader(StaticLoader::arc("nodes", json!(["mac-mini"])));
    orchestrator.connect();

    factory.client(0).callbacks.on_hello(HelloOk::default());
    assert!(matches!(
        orchestrator.process_next().await,
        Some(Applied::Hello { .. })
    ));
    assert_eq!(
        orchestrator.process_next().await,
        Some(Applied::Panel("nodes".to_string()))
    );
    assert!(orchestrator.host().connected);
    assert!(!orchestrator.host().panels.contains_key("assistant-identity"));
}

#[tokio::test]
async fn test_loader_output_of_stale_generation_is_dropped() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"))
        .with_loader(StaticLoader::arc("agents", json!(["old"])));
    orchestrator.connect();

    factory.client(0).callbacks.on_hello(HelloOk::default());
    orchestrator.process_next().await;

    // Reconnect before the loader reports back
    orchestrator.connect();
    assert_eq!(orchestrator.process_next().await, None);
    assert!(orchestrator.host().panels.is_empty());
}

#[tokio::test]
async fn test_run_until_stops_while_reconnect_is_pending() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"));
    orchestrator.connect();
    factory
        .client(0)
        .callbacks
        .on_close(CloseInfo::new(1006, "connection refused"));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut stop_tx = Some(stop_tx);
    let run = orchestrator.run_until(
        Duration::from_secs(60),
        async {
            let _ = stop_rx.await;
        },
        |_, applied| {
            // Ask to stop only once the reconnect delay has started
            if *applied == Applied::Closed {
                if let Some(tx) = stop_tx.take() {
                    let _ = tx.send(());
                }
            }
        },
    );
    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("shutdown ignored during reconnect delay");

    assert_eq!(factory.created_count(), 1);
    assert!(!orchestrator.host().connected);
}

#[tokio::test]
async fn test_run_until_reconnects_after_close() {
    let factory = MockTransportFactory::new();
    let mut orchestrator = Orchestrator::new(factory.clone(), make_host("main"));
    orchestrator.connect();
    factory
        .client(0)
        .callbacks
        .on_close(CloseInfo::new(1000, "restart"));

    let watched = factory.clone();
    let mut closes = 0;
    let run = orchestrator.run_until(
        Duration::from_millis(10),
        async move {
            while watched.created_count() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        },
        |_, applied| {
            if *applied == Applied::Closed {
                closes += 1;
            }
        },
    );
    tokio::time::timeout(Duration::from_secs(5), run)
        .await
        .expect("no reconnect after close");

    assert_eq!(closes, 1);
    assert!(factory.client(0).is_stopped());
    assert!(factory.client(1).is_started());
    assert_eq!(orchestrator.generation().get(), 2);
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! gw-tail - Follow a gateway's event stream.
//!
//! Connects to the configured gateway, logs every admitted event and
//! reconnects after each close.
//!
//! Usage:
//!   gw-tail [config.toml]

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use gwclient::gateway::{Applied, SnapshotSectionLoader, NODES};
use gwclient::{ClientConfig, HostState, Orchestrator};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config(std::env::args().nth(1).as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gw-tail: {}", e);
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&config);
    tracing::info!("gw-tail starting, gateway={}", config.url);

    let mut orchestrator = Orchestrator::from_config(&config)
        .with_loader(Arc::new(SnapshotSectionLoader::new(NODES, "presence")));
    orchestrator.connect();

    let reconnect_delay = Duration::from_millis(config.reconnect_delay_ms);
    orchestrator
        .run_until(reconnect_delay, shutdown_signal(), report)
        .await;

    orchestrator.disconnect();
    tracing::info!("gw-tail stopped");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("cannot listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

fn report(host: &HostState, applied: &Applied) {
    match applied {
        Applied::Event => {
            if let Some(event) = host.last_event() {
                match &event.payload {
                    Some(payload) => println!("{} {}", event.event, payload),
                    None => println!("{}", event.event),
                }
            }
        }
        Applied::Hello { session_key } => {
            if let Some(key) = session_key {
                tracing::info!("session key is now {}", key);
            }
            tracing::info!(
                agent = ?host.session_agent_id(),
                main = host.is_main_session(),
                "following session {}",
                host.session_key
            );
        }
        _ => {}
    }
}

fn load_config(path: Option<&str>) -> gwclient::Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load(Path::new(path))?,
        None => ClientConfig::default(),
    };
    config.validate_url()?;
    Ok(config)
}

fn setup_logging(config: &ClientConfig) {
    use tracing_subscriber::EnvFilter;

    let fallback = config.log.filter.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

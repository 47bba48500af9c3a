// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use vaultline_node::config::NodeConfig;
use vaultline_node::server::{build_router, AppState};
use vaultline_node::telemetry;
use vaultline_persistence::EventLedger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("VAULTLINE_CONFIG").ok())
        .map(PathBuf::from);
    let cfg = NodeConfig::load(config_path.as_deref()).context("loading configuration")?;

    tracing::info!("Initializing Vaultline node with config: {:?}", cfg);

    let ledger = EventLedger::open(&cfg.ledger_path)
        .with_context(|| format!("opening ledger {}", cfg.ledger_path.display()))?;

    let app = build_router(AppState {
        ledger: Arc::new(ledger),
        tail_limit: cfg.events_tail_limit,
    });

    let addr = cfg.bind_addr;
    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("server stopped")?;
    Ok(())
}

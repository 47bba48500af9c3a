// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const DEFAULT_FILTER: &str = "vaultline_node=info,tower_http=info";

/// Initialize logs only. Safe to call more than once.
pub fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Initialize telemetry (logs + metrics)
pub fn init_telemetry() {
    // 1. Logs
    init_logging(DEFAULT_FILTER);

    // 2. Metrics (Prometheus)
    if PROM_HANDLE.get().is_some() {
        tracing::warn!("Telemetry already initialized");
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = PROM_HANDLE.set(handle);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed");
            return;
        }
    }

    metrics::describe_counter!("vaultline_backups_total", "Artifacts written, per codec");
    metrics::describe_counter!("vaultline_backup_errors_total", "Failed (file, codec) backups");
    metrics::describe_counter!("vaultline_restores_total", "Artifacts restored and verified");
    metrics::describe_counter!(
        "vaultline_integrity_mismatch_total",
        "Restored artifacts whose hash did not match the original"
    );
    metrics::describe_histogram!("vaultline_encode_duration_ms", "Encode phase duration per artifact");

    // Ensure at least one metric exists on startup
    metrics::gauge!("vaultline_node_up", 1.0);
}

/// Get the Prometheus handle to render metrics
pub fn get_metrics() -> String {
    if let Some(handle) = PROM_HANDLE.get() {
        handle.render()
    } else {
        "# metrics not initialized".to_string()
    }
}

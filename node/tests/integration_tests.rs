// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;
use vaultline_node::config::NodeConfig;
use vaultline_node::engine::Engine;
use vaultline_node::mover::DirectoryMirror;
use vaultline_node::server::{build_router, AppState};
use vaultline_persistence::fixtures::generate_test_scenario;
use vaultline_persistence::EventLedger;

async fn get_json(app: axum::Router, uri: &str) -> Value {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn engine_in(dir: &Path) -> Engine {
    let cfg = NodeConfig {
        ledger_path: dir.join("events.jsonl"),
        source_root: dir.join("src"),
        artifact_root: dir.join("backup"),
        restore_root: dir.join("restore"),
        mirror_root: dir.join("airgap"),
        codecs: vec!["lz4".into(), "brotli".into()],
        ..NodeConfig::default()
    };
    Engine::open(cfg).unwrap()
}

#[tokio::test]
async fn test_routes_over_engine_run() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());
    let src = engine.config().source_root.clone();
    fs::create_dir_all(src.join("d")).unwrap();
    fs::write(src.join("d/a.txt"), "abc".repeat(1000)).unwrap();

    engine.backup_tree(&src).unwrap();
    engine.restore_tree().unwrap();
    engine
        .ledger()
        .append_json("hdr_corrupt_start", json!({"total": 2, "mode": "zero"}))
        .unwrap();

    let app = build_router(AppState {
        ledger: engine.ledger().clone(),
        tail_limit: 200,
    });

    let summary = get_json(app.clone(), "/api/summary").await;
    assert_eq!(summary["global"]["total_files"], 1);
    assert_eq!(summary["global"]["total_backup_pairs"], 2);
    assert_eq!(summary["global"]["total_restore_ok"], 2);
    assert_eq!(summary["files"][0]["file"], "d/a.txt");
    assert_eq!(summary["files"][0]["algos"], json!(["brotli", "lz4"]));

    let header = get_json(app.clone(), "/api/header_status").await;
    assert_eq!(header["status"], "Running");
    assert_eq!(header["mode"], "zero");

    let eval = get_json(app.clone(), "/api/evaluation").await;
    assert_eq!(eval["lz4"]["count"], 1);

    let corrupt = get_json(app.clone(), "/api/corrupt_status").await;
    assert_eq!(corrupt["status"], "Idle");
    assert_eq!(corrupt["mode"], "corrupt_simulation");

    let first = get_json(app.clone(), "/status").await;
    let second = get_json(app, "/status").await;
    assert_eq!(first["fingerprint"], second["fingerprint"]);
    assert_eq!(first["fingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_routes_over_fixture_ledger() {
    let dir = tempdir().unwrap();
    let paths = generate_test_scenario(dir.path()).unwrap();
    let ledger = Arc::new(EventLedger::open(&paths.ledger).unwrap());
    let app = build_router(AppState { ledger, tail_limit: 200 });

    let ransom = get_json(app.clone(), "/api/ransom_status").await;
    assert_eq!(ransom["status"], "Running");
    assert_eq!(ransom["encrypted"], 2);
    assert_eq!(ransom["total"], 5);

    let summary = get_json(app, "/api/summary").await;
    assert_eq!(summary["global"]["errors"], 2);
    let b = &summary["files"][1];
    assert_eq!(b["file"], "img/b.bin");
    assert_eq!(b["restore_ok"], 0);
    assert_eq!(b["restore_ok_pct"], 0.0);
}

#[test]
fn test_transfer_mirrors_and_logs() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());
    let src = engine.config().source_root.clone();
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), b"payload").unwrap();
    engine.backup_tree(&src).unwrap();

    let mirror = DirectoryMirror::new(&engine.config().mirror_root);
    let report = engine.transfer(&mirror).unwrap();
    // 2 artifacts, 2 sidecars, 1 original copy
    assert_eq!(report.count, 5);
    assert!(engine.config().mirror_root.join("LZ4/a.txt.lz4").exists());

    let last = engine.ledger().tail(1).unwrap();
    assert_eq!(last[0].kind, "transfer_done");
    assert_eq!(last[0].payload["count"], json!(5));
}

#[test]
fn test_failed_transfer_is_logged() {
    let dir = tempdir().unwrap();
    let engine = engine_in(dir.path());
    fs::create_dir_all(engine.store().root()).unwrap();

    let inside = DirectoryMirror::new(engine.store().root().join("nested"));
    assert!(engine.transfer(&inside).is_err());

    let views = engine.views().unwrap();
    assert_eq!(views.summary().global.errors, 1);
}

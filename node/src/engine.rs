// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Run orchestration.
//!
//! The engine is the only writer of pipeline events. Every (file, codec)
//! backup and every artifact restore ends in exactly one event: a result
//! or an `*_error`. One failure never stops the run; only cancellation does.

use crate::codec::CodecRegistry;
use crate::config::NodeConfig;
use crate::errors::EngineError;
use crate::hasher::hash_file;
use crate::mover::{ArtifactMover, TransferReport};
use crate::pipeline::{
    compression_ratio, verify, BackupArtifact, BackupPipeline, PipelineError, RestorePipeline,
};
use crate::store::{rel_key, walk_files, ArtifactStore};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use vaultline_kernel::codec::CodecId;
use vaultline_kernel::view::Views;
use vaultline_persistence::EventLedger;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub files: usize,
    pub artifacts: usize,
    pub errors: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub artifacts: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub errors: usize,
    pub cancelled: bool,
}

pub struct Engine {
    cfg: NodeConfig,
    ledger: Arc<EventLedger>,
    store: ArtifactStore,
    codecs: CodecRegistry,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(cfg: NodeConfig, ledger: Arc<EventLedger>) -> Result<Self, EngineError> {
        let ids = cfg.codec_ids()?;
        Ok(Self {
            store: ArtifactStore::new(&cfg.artifact_root),
            codecs: CodecRegistry::select(&ids),
            cfg,
            ledger,
            cancel: CancellationToken::new(),
        })
    }

    /// Open the configured ledger and build an engine on it.
    pub fn open(cfg: NodeConfig) -> Result<Self, EngineError> {
        let ledger = Arc::new(EventLedger::open(&cfg.ledger_path)?);
        Self::new(cfg, ledger)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.cfg
    }

    pub fn ledger(&self) -> &Arc<EventLedger> {
        &self.ledger
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Token observed by every running pipeline.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replay the ledger into fresh views.
    pub fn views(&self) -> Result<Views, EngineError> {
        Ok(vaultline_kernel::replay(self.ledger.read_all()?))
    }

    /// Back up every file below `source_root` with every configured codec.
    ///
    /// Files are processed in sorted order; codecs for one file run in
    /// parallel and their events are appended in configured codec order.
    pub fn backup_tree(&self, source_root: &Path) -> Result<BackupReport, EngineError> {
        if !source_root.is_dir() {
            return Err(EngineError::InvalidInput(format!(
                "source root {} is not a directory",
                source_root.display()
            )));
        }

        let stage = self.ledger.stage(
            "backup",
            meta(json!({
                "source": source_root.display().to_string(),
                "codecs": self.codecs.ids().iter().map(|c| c.name()).collect::<Vec<_>>(),
            })),
        )?;

        self.sweep_partials()?;
        let files = walk_files(source_root)?;
        let pipeline = BackupPipeline::new(&self.store, &self.codecs, self.cfg.chunk_size);
        let ids = self.codecs.ids();
        let mut report = BackupReport::default();

        info!(files = files.len(), codecs = ids.len(), "backup started");

        'files: for file in &files {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            let Ok(rel) = file.strip_prefix(source_root) else {
                continue;
            };
            let key = rel_key(rel);
            report.files += 1;

            let (size, sha) = match hash_file(file).and_then(|h| Ok((file.metadata()?.len(), h))) {
                Ok(v) => v,
                Err(e) => {
                    warn!(file = %key, error = %e, "cannot hash source file");
                    report.errors += 1;
                    self.ledger.append_json(
                        "backup_error",
                        json!({"file": key, "error": e.to_string()}),
                    )?;
                    continue;
                }
            };
            self.ledger.append_json(
                "hash_original",
                json!({"file": key, "size": size, "sha256": sha}),
            )?;

            let outcomes: Vec<(CodecId, Result<BackupArtifact, PipelineError>)> = ids
                .par_iter()
                .map(|id| {
                    let res = pipeline.backup(file, id.name(), source_root, &sha, &self.cancel);
                    (*id, res)
                })
                .collect();

            for (id, outcome) in outcomes {
                match outcome {
                    Ok(art) => {
                        report.artifacts += 1;
                        let ratio = compression_ratio(art.compressed_size, size);
                        metrics::counter!("vaultline_backups_total", 1, "codec" => id.name());
                        metrics::histogram!("vaultline_encode_duration_ms", art.duration_ms, "codec" => id.name());
                        self.ledger.append_json(
                            "backup_result",
                            json!({
                                "file": key,
                                "algo": id.name(),
                                "size_in": size,
                                "size_out": art.compressed_size,
                                "ratio": ratio,
                                "duration_ms": art.duration_ms,
                            }),
                        )?;
                    }
                    Err(e) => {
                        report.errors += 1;
                        metrics::counter!("vaultline_backup_errors_total", 1, "codec" => id.name());
                        warn!(file = %key, codec = %id, error = %e, "backup failed");
                        self.ledger.append_json(
                            "backup_error",
                            json!({"file": key, "algo": id.name(), "error": e.to_string()}),
                        )?;
                        if matches!(e, PipelineError::Cancelled) {
                            report.cancelled = true;
                        }
                    }
                }
            }
            if report.cancelled {
                break 'files;
            }
        }

        info!(
            files = report.files,
            artifacts = report.artifacts,
            errors = report.errors,
            cancelled = report.cancelled,
            "backup finished"
        );
        stage.finish(report.errors == 0 && !report.cancelled)?;
        Ok(report)
    }

    /// Restore and verify every artifact under the artifact root into the
    /// configured restore root.
    pub fn restore_tree(&self) -> Result<RestoreReport, EngineError> {
        let stage = self.ledger.stage(
            "restore",
            meta(json!({
                "artifacts": self.store.root().display().to_string(),
                "target": self.cfg.restore_root.display().to_string(),
            })),
        )?;

        self.sweep_partials()?;
        let artifacts = self.store.list_artifacts()?;
        // Fallback hashes for artifacts whose sidecar is missing.
        let history = self.views()?;
        let pipeline = RestorePipeline::new(&self.codecs, self.cfg.chunk_size);
        let mut report = RestoreReport::default();

        info!(artifacts = artifacts.len(), "restore started");

        for artifact in &artifacts {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }
            report.artifacts += 1;

            let (folder, rel) = self
                .store
                .locate(artifact)
                .unwrap_or_else(|| (String::new(), artifact.display().to_string()));
            let file = format!("{folder}/{rel}");

            let result = pipeline
                .restore(artifact, &self.cfg.restore_root, &self.cancel)
                .and_then(|restored| {
                    let expected = self.store.read_sidecar(artifact).or_else(|| {
                        history
                            .summary_view()
                            .file(&rel)
                            .map(|r| r.original_hash.clone())
                            .filter(|h| !h.is_empty())
                    });
                    let v = verify(&restored.path, expected.as_deref())?;
                    Ok((restored, v))
                });

            match result {
                Ok((restored, v)) => {
                    metrics::counter!("vaultline_restores_total", 1, "codec" => restored.codec.name());
                    if v.matched {
                        report.matched += 1;
                    } else {
                        report.mismatched += 1;
                        metrics::counter!("vaultline_integrity_mismatch_total", 1, "codec" => restored.codec.name());
                        warn!(file = %file, "integrity mismatch");
                    }
                    self.ledger.append_json(
                        "restore_validated",
                        json!({
                            "file": file,
                            "algo": restored.codec.display_name(),
                            "ok": v.matched,
                            "sha_in": v.hash_in,
                            "sha_out": v.hash_out,
                        }),
                    )?;
                }
                Err(e) => {
                    report.errors += 1;
                    warn!(file = %file, error = %e, "restore failed");
                    self.ledger.append_json(
                        "restore_error",
                        json!({"file": file, "artifact": artifact.display().to_string(), "error": e.to_string()}),
                    )?;
                    if matches!(e, PipelineError::Cancelled) {
                        report.cancelled = true;
                        break;
                    }
                }
            }
        }

        info!(
            artifacts = report.artifacts,
            matched = report.matched,
            mismatched = report.mismatched,
            errors = report.errors,
            "restore finished"
        );
        stage.finish(report.errors == 0 && !report.cancelled)?;
        Ok(report)
    }

    /// Hand the artifact root to `mover`.
    pub fn transfer(&self, mover: &dyn ArtifactMover) -> Result<TransferReport, EngineError> {
        match mover.transfer(self.store.root()) {
            Ok(report) => {
                self.ledger.append_json(
                    "transfer_done",
                    json!({
                        "mover": mover.name(),
                        "dst": report.dst.display().to_string(),
                        "count": report.count,
                    }),
                )?;
                Ok(report)
            }
            Err(e) => {
                warn!(mover = mover.name(), error = %e, "transfer failed");
                self.ledger.append_json(
                    "transfer_error",
                    json!({"mover": mover.name(), "error": e.to_string()}),
                )?;
                Err(e.into())
            }
        }
    }

    /// Cancel running pipelines once `signal` resolves.
    ///
    /// The future is driven on its own current-thread runtime, so
    /// synchronous callers can use it without a surrounding executor.
    pub fn cancel_when<F>(&self, signal: F) -> Result<JoinHandle<()>, EngineError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let token = self.cancel.clone();
        Ok(std::thread::spawn(move || {
            rt.block_on(signal);
            token.cancel();
        }))
    }

    /// Ctrl-C stops the run between chunks instead of killing the process.
    pub fn cancel_on_interrupt(&self) -> Result<JoinHandle<()>, EngineError> {
        self.cancel_when(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => warn!("interrupt received, cancelling run"),
                Err(e) => {
                    warn!(error = %e, "cannot listen for interrupts");
                    std::future::pending::<()>().await;
                }
            }
        })
    }

    fn sweep_partials(&self) -> Result<(), EngineError> {
        let removed = self.store.remove_stale_partials()?;
        if removed > 0 {
            info!(removed, "stale partial artifacts removed");
        }
        Ok(())
    }

    /// Append `system_start`, returning every attack view to Idle.
    pub fn reset(&self) -> Result<(), EngineError> {
        self.ledger.append_json("system_start", json!({}))?;
        info!("attack views reset");
        Ok(())
    }
}

fn meta(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use vaultline_kernel::view::AttackPhase;

    fn engine_in(dir: &Path, codecs: &[&str]) -> Engine {
        let cfg = NodeConfig {
            ledger_path: dir.join("events.jsonl"),
            source_root: dir.join("src"),
            artifact_root: dir.join("backup"),
            restore_root: dir.join("restore"),
            mirror_root: dir.join("airgap"),
            chunk_size: 512,
            codecs: codecs.iter().map(|s| s.to_string()).collect(),
            ..NodeConfig::default()
        };
        Engine::open(cfg).unwrap()
    }

    #[test]
    fn test_reset_returns_attack_views_to_idle() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path(), &["lz4"]);
        engine
            .ledger()
            .append_json("ransom_scan_start", json!({"total": 3}))
            .unwrap();
        assert_eq!(engine.views().unwrap().ransom().status, AttackPhase::Running);

        engine.reset().unwrap();
        assert_eq!(engine.views().unwrap().ransom().status, AttackPhase::Idle);
    }

    #[test]
    fn test_backup_requires_existing_source() {
        let dir = tempdir().unwrap();
        let engine = engine_in(dir.path(), &["lz4"]);
        let err = engine.backup_tree(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_cancel_when_signal_resolves() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), b"payload").unwrap();
        let engine = engine_in(dir.path(), &["lz4"]);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let watcher = engine
            .cancel_when(async move {
                let _ = rx.await;
            })
            .unwrap();
        assert!(!engine.cancel_token().is_cancelled());

        tx.send(()).unwrap();
        watcher.join().unwrap();
        assert!(engine.cancel_token().is_cancelled());

        let report = engine.backup_tree(&src).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.artifacts, 0);
    }

    #[test]
    fn test_runs_sweep_stale_partials() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), b"payload").unwrap();
        let engine = engine_in(dir.path(), &["lz4"]);

        let stale = dir.path().join("backup/LZ4/killed.bin.lz4.partial");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, b"half").unwrap();
        engine.backup_tree(&src).unwrap();
        assert!(!stale.exists());

        fs::write(&stale, b"half").unwrap();
        let report = engine.restore_tree().unwrap();
        assert!(!stale.exists());
        assert_eq!(report.artifacts, 1);
        assert_eq!(report.matched, 1);
    }

    #[test]
    fn test_backup_events_follow_codec_order() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("a.txt"), b"aaaaaaaaaaaaaaaa").unwrap();

        let engine = engine_in(dir.path(), &["snappy", "gzip", "lz4"]);
        let report = engine.backup_tree(&src).unwrap();
        assert_eq!(report.artifacts, 3);

        let algos: Vec<String> = engine
            .ledger()
            .read_all()
            .unwrap()
            .filter(|e| e.kind == "backup_result")
            .filter_map(|e| e.payload.get("algo").and_then(|v| v.as_str()).map(String::from))
            .collect();
        assert_eq!(algos, vec!["snappy", "gzip", "lz4"]);
    }
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Global and per-file summary accumulator.

use super::ordered::OrderedMap;
use crate::event::LedgerEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub struct FileRecord {
    pub size: u64,
    pub original_hash: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackupOutcome {
    pub ratio: Option<f64>,
    pub duration_ms: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestoreOutcome {
    pub algo: String,
    pub ok: bool,
    pub sha_in: Option<String>,
    pub sha_out: Option<String>,
}

/// Folds `hash_original`, `backup_result`, `restore_validated` and the
/// `*_error` suffix into the summary state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SummaryView {
    files: OrderedMap<FileRecord>,
    backups: BTreeMap<(String, String), BackupOutcome>,
    restores: OrderedMap<OrderedMap<RestoreOutcome>>,
    errors: u64,
}

impl SummaryView {
    pub fn apply(&mut self, event: &LedgerEvent) {
        match event {
            LedgerEvent::HashOriginal { file, size, sha256 } => {
                self.files.insert(
                    file.clone(),
                    FileRecord {
                        size: *size,
                        original_hash: sha256.clone(),
                    },
                );
            }
            LedgerEvent::BackupResult {
                file,
                algo,
                ratio,
                duration_ms,
            } => {
                self.backups.insert(
                    (file.clone(), algo.clone()),
                    BackupOutcome {
                        ratio: *ratio,
                        duration_ms: *duration_ms,
                    },
                );
            }
            LedgerEvent::RestoreValidated {
                file,
                algo,
                ok,
                sha_in,
                sha_out,
            } => {
                self.restores.get_or_insert_with(file, OrderedMap::new).insert(
                    algo.clone(),
                    RestoreOutcome {
                        algo: algo.clone(),
                        ok: *ok,
                        sha_in: sha_in.clone(),
                        sha_out: sha_out.clone(),
                    },
                );
            }
            LedgerEvent::Dropped { .. } | LedgerEvent::Other { .. } => {}
        }
    }

    pub fn count_error(&mut self) {
        self.errors += 1;
    }

    pub fn file(&self, key: &str) -> Option<&FileRecord> {
        self.files.get(key)
    }

    pub fn backups(&self) -> impl Iterator<Item = (&(String, String), &BackupOutcome)> {
        self.backups.iter()
    }

    pub fn report(&self) -> Summary {
        let total_restore = self.restores.values().map(|r| r.len()).sum();
        let total_restore_ok = self
            .restores
            .values()
            .flat_map(|r| r.values())
            .filter(|o| o.ok)
            .count();

        let files = self
            .files
            .iter()
            .map(|(file, record)| self.file_detail(file, record))
            .collect();

        Summary {
            global: GlobalCounters {
                total_files: self.files.len(),
                total_backup_pairs: self.backups.len(),
                total_restore,
                total_restore_ok,
                errors: self.errors,
            },
            files,
        }
    }

    fn file_detail(&self, file: &str, record: &FileRecord) -> FileDetail {
        let mut algos = Vec::new();
        let mut ratios = BTreeMap::new();
        let mut durations = BTreeMap::new();
        for ((f, algo), outcome) in &self.backups {
            if f == file {
                algos.push(algo.clone());
                ratios.insert(algo.clone(), outcome.ratio);
                durations.insert(algo.clone(), outcome.duration_ms);
            }
        }

        let restore: Vec<RestoreOutcome> = self
            .restores
            .get(file)
            .map(|r| r.values().cloned().collect())
            .unwrap_or_default();
        let restore_ok = restore.iter().filter(|o| o.ok).count();
        let restore_total = restore.len();
        let restore_ok_pct = (restore_total > 0)
            .then(|| restore_ok as f64 / restore_total as f64 * 100.0);

        FileDetail {
            file: file.to_string(),
            size: record.size,
            sha: record.original_hash.clone(),
            algos,
            ratios,
            durations,
            restore,
            restore_ok,
            restore_total,
            restore_ok_pct,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub global: GlobalCounters,
    pub files: Vec<FileDetail>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalCounters {
    pub total_files: usize,
    pub total_backup_pairs: usize,
    pub total_restore: usize,
    pub total_restore_ok: usize,
    pub errors: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileDetail {
    pub file: String,
    pub size: u64,
    pub sha: String,
    /// Codecs backed up, sorted by name.
    pub algos: Vec<String>,
    pub ratios: BTreeMap<String, Option<f64>>,
    pub durations: BTreeMap<String, Option<f64>>,
    pub restore: Vec<RestoreOutcome>,
    pub restore_ok: usize,
    pub restore_total: usize,
    /// Absent when no restore was attempted for this file.
    pub restore_ok_pct: Option<f64>,
}

//! Ready-made ledgers for tests and demos.

use crate::error::Result;
use crate::ledger::EventLedger;
use serde_json::json;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct TestPaths {
    pub ledger: PathBuf,
}

/// Writes a ledger covering one full backup/restore cycle, an interrupted
/// ransomware run, a header corruption run and a handful of malformed lines.
///
/// Expected views after replay:
/// - 2 files, 4 backup pairs, 3 restores (2 ok), 2 errors
/// - ransomware Running with 2 encrypted of 5
/// - header corruption Done (3 ok, 1 failed, mode `zero`)
/// - byte corruption Idle
pub fn generate_test_scenario(dir: &Path) -> Result<TestPaths> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join("events.jsonl");
    let ledger = EventLedger::open(&path)?;

    ledger.append_json("system_start", json!({}))?;

    for (file, size, sha) in [("docs/a.txt", 1200, "aa11"), ("img/b.bin", 4096, "bb22")] {
        ledger.append_json("hash_original", json!({"file": file, "size": size, "sha256": sha}))?;
    }
    ledger.append_json(
        "backup_result",
        json!({"file": "docs/a.txt", "algo": "lz4", "size_in": 1200, "size_out": 600, "ratio": 0.5, "duration_ms": 2.0}),
    )?;
    ledger.append_json(
        "backup_result",
        json!({"file": "docs/a.txt", "algo": "zstd", "size_in": 1200, "size_out": 300, "ratio": 0.25, "duration_ms": 6.0}),
    )?;
    ledger.append_json(
        "backup_result",
        json!({"file": "img/b.bin", "algo": "lz4", "size_in": 4096, "size_out": 4000, "ratio": 0.9765625, "duration_ms": 1.0}),
    )?;
    ledger.append_json(
        "backup_result",
        json!({"file": "img/b.bin", "algo": "zstd", "size_in": 4096, "size_out": 3900, "ratio": 0.9521484375, "duration_ms": 4.0}),
    )?;
    ledger.append_json("backup_error", json!({"file": "img/b.bin", "algo": "gzip", "error": "disk full"}))?;

    ledger.append_json(
        "restore_validated",
        json!({"file": "LZ4/docs/a.txt", "algo": "LZ4", "ok": true, "sha_in": "aa11", "sha_out": "aa11"}),
    )?;
    ledger.append_json(
        "restore_validated",
        json!({"file": "ZSTD/docs/a.txt", "ok": true, "sha_in": "aa11", "sha_out": "aa11"}),
    )?;
    ledger.append_json(
        "restore_validated",
        json!({"file": "LZ4/img/b.bin", "algo": "LZ4", "ok": false, "sha_in": "bb22", "sha_out": "ffff"}),
    )?;
    ledger.append_json("restore_error", json!({"file": "ZSTD/img/b.bin.zst", "error": "corrupt frame"}))?;

    ledger.append_json("ransom_scan_start", json!({"total": 5}))?;
    ledger.append_json("ransom_encrypt_done", json!({"file": "docs/a.txt"}))?;
    ledger.append_json("ransom_encrypt_done", json!({"file": "img/b.bin"}))?;

    ledger.append_json("hdr_corrupt_start", json!({"total": 4, "mode": "zero"}))?;
    for status in ["ok", "ok", "ok", "error"] {
        ledger.append_json("hdr_file", json!({"status": status}))?;
    }
    ledger.append_json("hdr_done", json!({"success": 3, "fail": 1, "mode": "zero"}))?;

    append_raw(&path, "not json at all")?;
    append_raw(&path, "[\"array\", \"line\"]")?;

    Ok(TestPaths { ledger: path })
}

/// Appends a raw line, bypassing serialization. Used to inject malformed
/// records.
pub fn append_raw(path: &Path, line: &str) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

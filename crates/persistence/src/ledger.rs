// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Append-Only Event Ledger
//!
//! The single source of truth for every derived view.
//! - One JSON object per line, newline terminated
//! - Every append is written, flushed and fsync'd under one lock
//! - No truncation, rewriting or compaction
//!
//! # Line Format
//! ```text
//! {"ts": 1718000000.25, "event": "backup_result", "data": {"file": "a.txt", ...}}
//! ```
//!
//! Readers take no lock. A line still being written by a concurrent
//! appender fails to parse and is skipped.

use crate::error::Result;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use vaultline_kernel::event::{parse_line, Payload, RawEvent};

/// Largest ring reserved up front by [`EventLedger::tail`].
const TAIL_PREALLOC: usize = 1024;

pub struct EventLedger {
    path: PathBuf,
    file: Mutex<File>,
    appended: AtomicU64,
}

impl EventLedger {
    /// Open or create a ledger file, creating parent directories.
    ///
    /// If the existing file ends in a partial line (crash mid-append), a
    /// newline is written first so the next record starts on its own line.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(&path)?;

        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                warn!(path = %path.display(), "ledger ends mid-line; terminating it");
                file.write_all(b"\n")?;
                file.sync_data()?;
            }
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
            appended: AtomicU64::new(0),
        })
    }

    /// Append one event stamped with the current wall-clock time.
    ///
    /// Returns only after the line is written and flushed. A failed fsync is
    /// logged; the line itself has already reached the OS.
    pub fn append(&self, kind: &str, payload: Payload) -> Result<RawEvent> {
        let record = RawEvent::new(now_secs(), kind, payload);
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');

        {
            let mut file = self.file.lock();
            file.write_all(&line)?;
            file.flush()?;
            if let Err(e) = file.sync_data() {
                warn!(kind, error = %e, "ledger fsync failed");
            }
        }

        self.appended.fetch_add(1, Ordering::Relaxed);
        debug!(kind, bytes = line.len(), "ledger append");
        Ok(record)
    }

    /// Append with a `serde_json::json!` payload.
    ///
    /// Objects are used as-is, `null` is an empty payload and any other value
    /// is wrapped as `{"value": v}`.
    pub fn append_json(&self, kind: &str, data: Value) -> Result<RawEvent> {
        let payload = match data {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        self.append(kind, payload)
    }

    /// Lazy iterator over every parsed record, in append order.
    pub fn read_all(&self) -> Result<LedgerIter> {
        read_ledger(&self.path)
    }

    /// The last `n` parsed records, oldest first.
    pub fn tail(&self, n: usize) -> Result<Vec<RawEvent>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        // `n` is caller-controlled; let the ring grow instead of reserving it.
        let mut ring = VecDeque::with_capacity(n.min(TAIL_PREALLOC));
        for ev in self.read_all()? {
            if ring.len() == n {
                ring.pop_front();
            }
            ring.push_back(ev);
        }
        Ok(ring.into())
    }

    /// Records appended through this handle since it was opened.
    pub fn appended(&self) -> u64 {
        self.appended.load(Ordering::Relaxed)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Open a ledger file for reading without taking the append lock.
///
/// A missing file reads as an empty ledger.
pub fn read_ledger(path: impl AsRef<Path>) -> Result<LedgerIter> {
    match File::open(path.as_ref()) {
        Ok(file) => Ok(LedgerIter {
            reader: Some(BufReader::new(file)),
            buf: Vec::new(),
            skipped: 0,
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LedgerIter::empty()),
        Err(e) => Err(e.into()),
    }
}

/// Tolerant line reader: blank, non-UTF-8, non-JSON and non-object lines
/// are skipped.
pub struct LedgerIter {
    reader: Option<BufReader<File>>,
    buf: Vec<u8>,
    skipped: u64,
}

impl LedgerIter {
    fn empty() -> Self {
        Self {
            reader: None,
            buf: Vec::new(),
            skipped: 0,
        }
    }

    /// Non-blank lines skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl Iterator for LedgerIter {
    type Item = RawEvent;

    fn next(&mut self) -> Option<RawEvent> {
        let reader = self.reader.as_mut()?;
        loop {
            self.buf.clear();
            match reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "ledger read failed; stopping");
                    self.reader = None;
                    return None;
                }
            }

            let Ok(line) = std::str::from_utf8(&self.buf) else {
                self.skipped += 1;
                continue;
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some(ev) => return Some(ev),
                None => self.skipped += 1,
            }
        }
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Timed stage brackets: `<name>_start` ... `<name>_end`.

use crate::error::Result;
use crate::ledger::EventLedger;
use serde_json::Value;
use std::time::Instant;
use tracing::warn;
use vaultline_kernel::event::{Payload, RawEvent};

/// Guard for a running stage.
///
/// Dropping an unfinished guard records `ok = false`, so an early return
/// or panic still closes the bracket.
pub struct Stage<'a> {
    ledger: &'a EventLedger,
    name: String,
    meta: Payload,
    started: Instant,
    finished: bool,
}

impl EventLedger {
    /// Append `<name>_start` with `meta` and return the guard that will
    /// append `<name>_end`.
    pub fn stage(&self, name: &str, meta: Payload) -> Result<Stage<'_>> {
        self.append(&format!("{name}_start"), meta.clone())?;
        Ok(Stage {
            ledger: self,
            name: name.to_string(),
            meta,
            started: Instant::now(),
            finished: false,
        })
    }
}

impl Stage<'_> {
    pub fn finish(mut self, ok: bool) -> Result<RawEvent> {
        self.finished = true;
        self.emit_end(ok)
    }

    fn emit_end(&self, ok: bool) -> Result<RawEvent> {
        let elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut data = self.meta.clone();
        data.insert("duration_ms".to_string(), Value::from(round3(elapsed_ms)));
        data.insert("ok".to_string(), Value::Bool(ok));
        self.ledger.append(&format!("{}_end", self.name), data)
    }
}

impl Drop for Stage<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.emit_end(false) {
            warn!(stage = %self.name, error = %e, "failed to close stage");
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

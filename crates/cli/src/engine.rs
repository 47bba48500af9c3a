use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use vaultline_kernel::Replayer;
use vaultline_kernel::view::Views;
use vaultline_persistence::read_ledger;

/// One full pass over a ledger file.
pub struct ReplaySession {
    pub ledger_path: PathBuf,
    pub views: Views,
    pub events: u64,
    /// Non-blank lines that did not parse.
    pub skipped: u64,
    pub first_ts: Option<f64>,
    pub last_ts: Option<f64>,
}

impl ReplaySession {
    pub fn open(ledger_path: &Path) -> Result<Self> {
        let mut iter = read_ledger(ledger_path)
            .with_context(|| format!("Failed to open ledger {}", ledger_path.display()))?;

        let mut replayer = Replayer::default();
        let mut events = 0;
        let mut first_ts = None;
        let mut last_ts = None;

        for ev in iter.by_ref() {
            first_ts.get_or_insert(ev.ts);
            last_ts = Some(ev.ts);
            replayer.apply(&ev);
            events += 1;
        }

        Ok(Self {
            ledger_path: ledger_path.to_path_buf(),
            views: replayer.finish(),
            events,
            skipped: iter.skipped(),
            first_ts,
            last_ts,
        })
    }
}

/// Seconds since the epoch as RFC 3339, or `-` when unknown.
pub fn format_ts(ts: Option<f64>) -> String {
    ts.and_then(|t| {
        let secs = t.floor() as i64;
        let nanos = ((t - t.floor()) * 1e9) as u32;
        chrono::DateTime::from_timestamp(secs, nanos)
    })
    .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    .unwrap_or_else(|| "-".to_string())
}

pub fn format_opt(v: Option<f64>, digits: usize) -> String {
    v.map(|x| format!("{x:.digits$}")).unwrap_or_else(|| "-".to_string())
}

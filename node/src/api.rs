// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub ledger: String,
    /// Events folded by this replay.
    pub events: u64,
    pub last_event_ts: Option<f64>,
    /// BLAKE3 of every derived view, hex.
    pub fingerprint: String,
}

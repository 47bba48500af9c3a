// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Ledger Event Language
//!
//! Every line of the ledger is one JSON object:
//! ```text
//! {"ts": <f64 seconds>, "event": "<kind>", "data": {<free-form fields>}}
//! ```
//!
//! Kinds are free-form strings. Writers never validate them, so readers
//! decode through a kind -> schema lookup ([`LedgerEvent::decode`]) and
//! map anything they do not recognize to [`LedgerEvent::Other`].
//!
//! # Tolerance
//! - Non-JSON, non-object and truncated lines parse to `None`
//! - A missing or non-object `data` is an empty payload
//! - Wrong-typed fields read as absent

use crate::codec::CodecNames;
use crate::config::FILE_KEY_ALIASES;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type Payload = Map<String, Value>;

/// One parsed ledger record, exactly as it was written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub ts: f64,
    #[serde(rename = "event")]
    pub kind: String,
    #[serde(rename = "data", default)]
    pub payload: Payload,
}

impl RawEvent {
    pub fn new(ts: f64, kind: impl Into<String>, payload: Payload) -> Self {
        Self {
            ts,
            kind: kind.into(),
            payload,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind.ends_with(crate::config::ERROR_SUFFIX)
    }

    /// Normalized file identifier (first non-empty legacy alias).
    pub fn file_key(&self) -> Option<&str> {
        FILE_KEY_ALIASES
            .iter()
            .find_map(|key| str_field(&self.payload, key))
    }
}

/// Parses one ledger line.
///
/// The kind is read from `event`, falling back to the legacy `type` key.
/// Returns `None` for anything that is not a JSON object.
pub fn parse_line(line: &str) -> Option<RawEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let value: Value = serde_json::from_str(line).ok()?;
    let Value::Object(mut obj) = value else {
        return None;
    };

    let kind = ["event", "type"]
        .iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str).filter(|s| !s.trim().is_empty()))
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let ts = obj.get("ts").and_then(Value::as_f64).unwrap_or(0.0);

    let payload = match obj.remove("data") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    Some(RawEvent { ts, kind, payload })
}

/// Non-empty string field.
pub fn str_field<'a>(payload: &'a Payload, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Unsigned integer field. Floats are truncated; numeric strings are parsed.
pub fn u64_field(payload: &Payload, key: &str) -> Option<u64> {
    match payload.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float field. Numeric strings are parsed.
pub fn f64_field(payload: &Payload, key: &str) -> Option<f64> {
    match payload.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Truthiness of a flag field. Absent or wrong-typed is `false`.
pub fn bool_field(payload: &Payload, key: &str) -> bool {
    match payload.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    }
}

/// Outcome of a per-unit progress event: `status` absent or `"ok"` is a success.
pub fn unit_ok(payload: &Payload) -> bool {
    match payload.get("status") {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s == "ok",
        Some(Value::Bool(b)) => *b,
        Some(_) => false,
    }
}

/// Typed view of the kinds the summary accumulator understands.
#[derive(Clone, Debug, PartialEq)]
pub enum LedgerEvent {
    HashOriginal {
        file: String,
        size: u64,
        sha256: String,
    },
    BackupResult {
        file: String,
        algo: String,
        ratio: Option<f64>,
        duration_ms: Option<f64>,
    },
    RestoreValidated {
        file: String,
        algo: String,
        ok: bool,
        sha_in: Option<String>,
        sha_out: Option<String>,
    },
    /// Recognized kind whose payload lacks a required field.
    Dropped { kind: String },
    /// Any kind the summary does not model.
    Other { kind: String },
}

impl LedgerEvent {
    pub fn decode(raw: &RawEvent, codecs: &CodecNames) -> Self {
        let p = &raw.payload;
        let dropped = || LedgerEvent::Dropped {
            kind: raw.kind.clone(),
        };

        match raw.kind.as_str() {
            "hash_original" => match raw.file_key() {
                Some(file) => LedgerEvent::HashOriginal {
                    file: file.to_string(),
                    size: u64_field(p, "size").unwrap_or(0),
                    sha256: str_field(p, "sha256").unwrap_or_default().to_string(),
                },
                None => dropped(),
            },
            "backup_result" => match (raw.file_key(), str_field(p, "algo")) {
                (Some(file), Some(algo)) => LedgerEvent::BackupResult {
                    file: file.to_string(),
                    algo: algo.to_string(),
                    ratio: f64_field(p, "ratio"),
                    duration_ms: f64_field(p, "duration_ms"),
                },
                _ => dropped(),
            },
            "restore_validated" => {
                let Some(raw_file) = raw.file_key() else {
                    return dropped();
                };
                let Some((file, folder_codec)) = split_codec_folder(raw_file, codecs) else {
                    return dropped();
                };
                let algo = str_field(p, "algo").map(str::to_string).or(folder_codec);
                match algo {
                    Some(algo) => LedgerEvent::RestoreValidated {
                        file,
                        algo,
                        ok: bool_field(p, "ok"),
                        sha_in: str_field(p, "sha_in").map(str::to_string),
                        sha_out: str_field(p, "sha_out").map(str::to_string),
                    },
                    None => dropped(),
                }
            }
            _ => LedgerEvent::Other {
                kind: raw.kind.clone(),
            },
        }
    }
}

/// Splits `<CodecFolder>/<rest>` into `(rest, Some(CodecFolder))` when the
/// first segment names a known codec; otherwise returns the path unchanged.
///
/// Both `/` and `\` separate segments. Returns `None` when nothing remains.
fn split_codec_folder(path: &str, codecs: &CodecNames) -> Option<(String, Option<String>)> {
    let segments: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect();

    match segments.as_slice() {
        [] => None,
        [first, rest @ ..] if !rest.is_empty() && codecs.contains(first) => {
            Some((rest.join("/"), Some(first.to_string())))
        }
        _ => Some((path.to_string(), None)),
    }
}

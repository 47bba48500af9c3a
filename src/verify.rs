//! Deterministic Hashing of Derived Views.

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::view::Views;
use serde::Serialize;

/// Computes a BLAKE3 fingerprint of every report the views expose.
///
/// **Scope**: summary, the three attack reports and the codec evaluation,
/// each in its serialized JSON form. Two replays of the same ledger prefix
/// must produce the same fingerprint.
pub fn view_fingerprint(views: &Views) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();

    update_section(&mut hasher, b"summary", &views.summary());
    update_section(&mut hasher, b"ransom", &views.ransom());
    update_section(&mut hasher, b"header", &views.header());
    update_section(&mut hasher, b"corrupt", &views.corrupt());
    update_section(&mut hasher, b"evaluation", &views.evaluation());

    *hasher.finalize().as_bytes()
}

pub fn fingerprint_hex(views: &Views) -> String {
    blake3::Hash::from(view_fingerprint(views)).to_hex().to_string()
}

fn update_section<T: Serialize>(hasher: &mut blake3::Hasher, tag: &[u8], value: &T) {
    // Reports are plain data; serialization cannot fail for them.
    let bytes = serde_json::to_vec(value).unwrap_or_default();
    hasher.update(&(tag.len() as u32).to_le_bytes());
    hasher.update(tag);
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(&bytes);
}

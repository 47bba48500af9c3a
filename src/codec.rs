// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Codec identity table.
//!
//! The kernel only knows codec *names*: the stable short id used in events
//! and configuration, the display name used for artifact folders, and the
//! artifact extension. The byte transforms live in the node crate.

use crate::error::{KernelError, KernelResult};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecId {
    Lz4,
    Zstd,
    Gzip,
    Brotli,
    Snappy,
}

impl CodecId {
    pub const ALL: [CodecId; 5] = [
        CodecId::Lz4,
        CodecId::Zstd,
        CodecId::Gzip,
        CodecId::Brotli,
        CodecId::Snappy,
    ];

    /// Stable short name used in events and configuration.
    pub fn name(self) -> &'static str {
        match self {
            CodecId::Lz4 => "lz4",
            CodecId::Zstd => "zstd",
            CodecId::Gzip => "gzip",
            CodecId::Brotli => "brotli",
            CodecId::Snappy => "snappy",
        }
    }

    /// Folder name under the artifact and restore roots.
    pub fn display_name(self) -> &'static str {
        match self {
            CodecId::Lz4 => "LZ4",
            CodecId::Zstd => "ZSTD",
            CodecId::Gzip => "GZIP",
            CodecId::Brotli => "Brotli",
            CodecId::Snappy => "Snappy",
        }
    }

    /// Artifact extension, including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            CodecId::Lz4 => ".lz4",
            CodecId::Zstd => ".zst",
            CodecId::Gzip => ".gz",
            CodecId::Brotli => ".br",
            CodecId::Snappy => ".snappy",
        }
    }

    /// Maps an artifact extension (with or without the dot) to its codec.
    pub fn from_extension(ext: &str) -> KernelResult<Self> {
        let bare = ext.trim_start_matches('.').to_ascii_lowercase();
        CodecId::ALL
            .into_iter()
            .find(|c| &c.extension()[1..] == bare)
            .ok_or_else(|| KernelError::UnknownExtension(ext.to_string()))
    }

    /// Case-insensitive lookup by display name.
    pub fn from_display_name(name: &str) -> Option<Self> {
        CodecId::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(name))
    }
}

impl FromStr for CodecId {
    type Err = KernelError;

    /// Accepts the short name or the common aliases (`zst`, `gz`, `br`),
    /// case-insensitively.
    fn from_str(s: &str) -> KernelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lz4" => Ok(CodecId::Lz4),
            "zstd" | "zst" => Ok(CodecId::Zstd),
            "gzip" | "gz" => Ok(CodecId::Gzip),
            "brotli" | "br" => Ok(CodecId::Brotli),
            "snappy" => Ok(CodecId::Snappy),
            _ => Err(KernelError::UnknownCodec(s.to_string())),
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of codec display names a replay recognizes as folder prefixes.
///
/// Comparison is case-insensitive.
#[derive(Clone, Debug)]
pub struct CodecNames {
    lowered: Vec<String>,
}

impl CodecNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            lowered: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Display names of every registered codec.
    pub fn registered() -> Self {
        Self::new(CodecId::ALL.iter().map(|c| c.display_name()))
    }

    pub fn contains(&self, name: &str) -> bool {
        let lowered = name.to_ascii_lowercase();
        self.lowered.iter().any(|n| *n == lowered)
    }
}

impl Default for CodecNames {
    fn default() -> Self {
        Self::registered()
    }
}

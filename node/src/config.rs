// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::codec::DEFAULT_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use vaultline_kernel::codec::CodecId;
use vaultline_kernel::config::DEFAULT_TAIL_LIMIT;

pub const ENV_PREFIX: &str = "VAULTLINE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub ledger_path: PathBuf,
    pub source_root: PathBuf,
    pub artifact_root: PathBuf,
    pub restore_root: PathBuf,
    pub mirror_root: PathBuf,
    pub bind_addr: SocketAddr,
    pub chunk_size: usize,
    /// Codec names, aliases accepted. Order is preserved in events.
    pub codecs: Vec<String>,
    pub events_tail_limit: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("data/events.jsonl"),
            source_root: PathBuf::from("data/source"),
            artifact_root: PathBuf::from("data/backup"),
            restore_root: PathBuf::from("data/restore"),
            mirror_root: PathBuf::from("data/airgap"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            chunk_size: DEFAULT_CHUNK_SIZE,
            codecs: CodecId::ALL.iter().map(|c| c.name().to_string()).collect(),
            events_tail_limit: DEFAULT_TAIL_LIMIT,
        }
    }
}

impl NodeConfig {
    /// Defaults, then the TOML file (if given), then `VAULTLINE_*` variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Apply overrides from a variable lookup (`VAULTLINE_LEDGER_PATH`, ...).
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |name: &str| get(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("LEDGER_PATH") {
            self.ledger_path = v.into();
        }
        if let Some(v) = var("SOURCE_ROOT") {
            self.source_root = v.into();
        }
        if let Some(v) = var("ARTIFACT_ROOT") {
            self.artifact_root = v.into();
        }
        if let Some(v) = var("RESTORE_ROOT") {
            self.restore_root = v.into();
        }
        if let Some(v) = var("MIRROR_ROOT") {
            self.mirror_root = v.into();
        }
        if let Some(v) = var("BIND_ADDR") {
            self.bind_addr = parse_value("BIND_ADDR", &v)?;
        }
        if let Some(v) = var("CHUNK_SIZE") {
            self.chunk_size = parse_value("CHUNK_SIZE", &v)?;
        }
        if let Some(v) = var("CODECS") {
            self.codecs = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = var("EVENTS_TAIL_LIMIT") {
            self.events_tail_limit = parse_value("EVENTS_TAIL_LIMIT", &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "0"));
        }
        self.codec_ids()?;
        Ok(())
    }

    /// Resolved codec list, duplicates removed.
    pub fn codec_ids(&self) -> Result<Vec<CodecId>, ConfigError> {
        let mut ids = Vec::with_capacity(self.codecs.len());
        for name in &self.codecs {
            let id: CodecId = name.parse().map_err(|_| invalid("codecs", name))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        if ids.is_empty() {
            return Err(invalid("codecs", "[]"));
        }
        Ok(ids)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

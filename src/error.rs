// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// Codec name is not one of the registered codecs.
    #[error("unsupported codec: {0}")]
    UnknownCodec(String),
    /// File extension does not map to a registered codec.
    #[error("unknown artifact extension: {0}")]
    UnknownExtension(String),
}

pub type KernelResult<T> = core::result::Result<T, KernelError>;

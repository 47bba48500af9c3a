// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::io;
use thiserror::Error;
use vaultline_kernel::error::KernelError;

/// Failure of a single (file, codec) backup or a single artifact restore.
///
/// Never fatal to a run: the engine turns each one into an `*_error` event
/// and moves on.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),
    #[error("unknown artifact extension: {0}")]
    UnknownExtension(String),
    #[error("cancelled")]
    Cancelled,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<KernelError> for PipelineError {
    fn from(e: KernelError) -> Self {
        match e {
            KernelError::UnknownCodec(name) => PipelineError::UnsupportedCodec(name),
            KernelError::UnknownExtension(ext) => PipelineError::UnknownExtension(ext),
        }
    }
}

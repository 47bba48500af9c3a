// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Backup, restore and verification of single artifacts.
//!
//! The pipelines touch only the artifact store. Ledger events are the
//! engine's job.

pub mod backup;
pub mod error;
pub mod restore;

pub use backup::{BackupArtifact, BackupPipeline};
pub use error::PipelineError;
pub use restore::{verify, RestorePipeline, RestoredArtifact, Verification};

/// `compressed / original`, or 0 for an empty original.
pub fn compression_ratio(compressed: u64, original: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    compressed as f64 / original as f64
}

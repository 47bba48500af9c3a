// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Transport seam for the finished artifact root.
//!
//! The pipeline never moves bytes off the machine itself. A mover is handed
//! the artifact root after a run and relocates it (cloud upload, removable
//! disk, network share). [`DirectoryMirror`] is the local air-gap copy.

use crate::pipeline::PipelineError;
use crate::store::walk_files;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub dst: PathBuf,
    pub count: usize,
}

pub trait ArtifactMover: Send + Sync {
    fn name(&self) -> &str;

    fn transfer(&self, artifact_root: &Path) -> Result<TransferReport, PipelineError>;
}

/// Copies the whole tree, `original/` and sidecars included, preserving
/// relative paths.
pub struct DirectoryMirror {
    dst: PathBuf,
}

impl DirectoryMirror {
    pub fn new(dst: impl Into<PathBuf>) -> Self {
        Self { dst: dst.into() }
    }
}

impl ArtifactMover for DirectoryMirror {
    fn name(&self) -> &str {
        "directory_mirror"
    }

    fn transfer(&self, artifact_root: &Path) -> Result<TransferReport, PipelineError> {
        if self.dst.starts_with(artifact_root) {
            return Err(PipelineError::InvalidPath(format!(
                "mirror {} is inside artifact root",
                self.dst.display()
            )));
        }
        fs::create_dir_all(&self.dst)?;

        let files = walk_files(artifact_root)?;
        for src in &files {
            let rel = src
                .strip_prefix(artifact_root)
                .map_err(|_| PipelineError::InvalidPath(src.display().to_string()))?;
            let dst = self.dst.join(rel);
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(src, &dst)?;
        }

        info!(count = files.len(), dst = %self.dst.display(), "artifact root mirrored");
        Ok(TransferReport {
            dst: self.dst.clone(),
            count: files.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_mirror_copies_tree() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        for rel in ["LZ4/a.lz4", "LZ4/a.lz4.hash", "original/a"] {
            let p = src.path().join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(&p, rel).unwrap();
        }

        let target = dst.path().join("airgap");
        let report = DirectoryMirror::new(&target).transfer(src.path()).unwrap();
        assert_eq!(report.count, 3);
        assert_eq!(fs::read_to_string(target.join("LZ4/a.lz4.hash")).unwrap(), "LZ4/a.lz4.hash");
    }

    #[test]
    fn test_mirror_refuses_nested_target() {
        let src = tempdir().unwrap();
        let err = DirectoryMirror::new(src.path().join("inner"))
            .transfer(src.path())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPath(_)));
    }
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Artifact Store Layout
//!
//! ```text
//! <root>/
//!   original/<rel>                 plain copy of the source file
//!   <Display>/<rel><ext>           encoded artifact
//!   <Display>/<rel><ext>.hash      sidecar: original SHA-256 (hex)
//!   <Display>/<rel><ext>.partial   in-flight write, renamed on success
//! ```

use crate::pipeline::PipelineError;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use vaultline_kernel::codec::CodecId;

pub const ORIGINAL_DIR: &str = "original";
pub const SIDECAR_EXT: &str = ".hash";
pub const PARTIAL_EXT: &str = ".partial";

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn artifact_path(&self, rel: &Path, codec: CodecId) -> Result<PathBuf, PipelineError> {
        check_relative(rel)?;
        let base = self.root.join(codec.display_name()).join(rel);
        Ok(with_suffix(&base, codec.extension()))
    }

    pub fn original_path(&self, rel: &Path) -> Result<PathBuf, PipelineError> {
        check_relative(rel)?;
        Ok(self.root.join(ORIGINAL_DIR).join(rel))
    }

    pub fn sidecar_path(artifact: &Path) -> PathBuf {
        with_suffix(artifact, SIDECAR_EXT)
    }

    pub fn partial_path(artifact: &Path) -> PathBuf {
        with_suffix(artifact, PARTIAL_EXT)
    }

    pub fn write_sidecar(&self, artifact: &Path, hash: &str) -> io::Result<()> {
        fs::write(Self::sidecar_path(artifact), hash.as_bytes())
    }

    /// Hash recorded next to the artifact. Missing or empty reads as `None`.
    pub fn read_sidecar(&self, artifact: &Path) -> Option<String> {
        let text = fs::read_to_string(Self::sidecar_path(artifact)).ok()?;
        let hash = text.trim();
        (!hash.is_empty()).then(|| hash.to_string())
    }

    /// Every artifact under the root, sorted. Skips `original/`, sidecars
    /// and partial writes.
    pub fn list_artifacts(&self) -> io::Result<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let skip = self.root.join(ORIGINAL_DIR);
        let mut files = Vec::new();
        collect_files(&self.root, Some(&skip), &mut files)?;
        files.retain(|p| !has_suffix(p, SIDECAR_EXT) && !has_suffix(p, PARTIAL_EXT));
        Ok(files)
    }

    /// Deletes `.partial` files an interrupted run left in the codec
    /// folders. `original/` is never touched. Returns the number removed.
    pub fn remove_stale_partials(&self) -> io::Result<usize> {
        if !self.root.exists() {
            return Ok(0);
        }
        let skip = self.root.join(ORIGINAL_DIR);
        let mut files = Vec::new();
        collect_files(&self.root, Some(&skip), &mut files)?;

        let mut removed = 0;
        for path in files.iter().filter(|p| has_suffix(p, PARTIAL_EXT)) {
            fs::remove_file(path)?;
            removed += 1;
        }
        Ok(removed)
    }

    /// Splits an artifact path into its codec folder and the source-relative
    /// path with the codec extension removed, `/`-separated.
    pub fn locate(&self, artifact: &Path) -> Option<(String, String)> {
        let rel = artifact.strip_prefix(&self.root).ok()?;
        let mut parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.len() < 2 {
            return None;
        }
        let folder = parts.remove(0);
        if let Some(last) = parts.last_mut() {
            if let Some(dot) = last.rfind('.').filter(|&i| i > 0) {
                last.truncate(dot);
            }
        }
        Some((folder, parts.join("/")))
    }
}

/// Rejects absolute paths and any `..` component.
pub fn check_relative(rel: &Path) -> Result<(), PipelineError> {
    if rel.as_os_str().is_empty() {
        return Err(PipelineError::InvalidPath("empty relative path".into()));
    }
    for c in rel.components() {
        match c {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(PipelineError::InvalidPath(rel.display().to_string())),
        }
    }
    Ok(())
}

/// `rel` with `/` separators, for event payloads.
pub fn rel_key(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Every regular file below `root`, sorted by path.
pub fn walk_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(root, None, &mut files)?;
    Ok(files)
}

fn collect_files(dir: &Path, skip: Option<&Path>, out: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if Some(path.as_path()) == skip {
            continue;
        }
        let meta = fs::metadata(&path)?;
        if meta.is_dir() {
            collect_files(&path, skip, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .is_some_and(|n| n.to_string_lossy().ends_with(suffix))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

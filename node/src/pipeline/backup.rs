// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::PipelineError;
use crate::codec::CodecRegistry;
use crate::store::ArtifactStore;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use vaultline_kernel::codec::CodecId;

#[derive(Debug, Clone)]
pub struct BackupArtifact {
    pub codec: CodecId,
    pub location: PathBuf,
    /// Encode phase only; the `original/` copy is not timed.
    pub duration_ms: f64,
    pub compressed_size: u64,
    pub original_size: u64,
}

pub struct BackupPipeline<'a> {
    store: &'a ArtifactStore,
    codecs: &'a CodecRegistry,
    chunk_size: usize,
}

impl<'a> BackupPipeline<'a> {
    pub fn new(store: &'a ArtifactStore, codecs: &'a CodecRegistry, chunk_size: usize) -> Self {
        Self {
            store,
            codecs,
            chunk_size,
        }
    }

    /// Encode one file with one codec.
    ///
    /// The artifact is written to `<artifact>.partial` and renamed into place
    /// only after the encoder finished; the sidecar is written after the
    /// rename. On any failure neither the artifact nor the sidecar exist.
    pub fn backup(
        &self,
        file: &Path,
        codec: &str,
        source_root: &Path,
        original_hash: &str,
        cancel: &CancellationToken,
    ) -> Result<BackupArtifact, PipelineError> {
        let codec = self.codecs.by_name(codec)?;
        let id = codec.id();
        let rel = file
            .strip_prefix(source_root)
            .map_err(|_| PipelineError::InvalidPath(file.display().to_string()))?;

        self.copy_original(file, rel, id)?;

        let artifact = self.store.artifact_path(rel, id)?;
        if let Some(parent) = artifact.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = ArtifactStore::partial_path(&artifact);

        let started = Instant::now();
        let encoded = (|| -> Result<u64, PipelineError> {
            let mut input = BufReader::new(File::open(file)?);
            let mut output = BufWriter::new(File::create(&partial)?);
            let read = codec.encode(&mut input, &mut output, self.chunk_size, cancel)?;
            output.flush()?;
            output.get_ref().sync_data()?;
            Ok(read)
        })();
        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

        let original_size = match encoded {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
        };

        fs::rename(&partial, &artifact)?;
        let compressed_size = fs::metadata(&artifact)?.len();
        self.store.write_sidecar(&artifact, original_hash)?;

        debug!(
            file = %rel.display(),
            codec = %id,
            original_size,
            compressed_size,
            duration_ms,
            "artifact written"
        );

        Ok(BackupArtifact {
            codec: id,
            location: artifact,
            duration_ms,
            compressed_size,
            original_size,
        })
    }

    /// Copy into `original/` via a per-codec temp name, so parallel codecs
    /// backing up the same file never write the same path.
    fn copy_original(&self, file: &Path, rel: &Path, codec: CodecId) -> Result<(), PipelineError> {
        let dst = self.store.original_path(rel)?;
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = dst.clone().into_os_string();
        tmp.push(format!(".{}.tmp", codec.name()));
        let tmp = PathBuf::from(tmp);
        fs::copy(file, &tmp)?;
        fs::rename(&tmp, &dst)?;
        Ok(())
    }
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::PipelineError;
use crate::codec::CodecRegistry;
use crate::hasher::hash_file;
use crate::store::ArtifactStore;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use vaultline_kernel::codec::CodecId;

#[derive(Debug, Clone)]
pub struct RestoredArtifact {
    pub codec: CodecId,
    pub path: PathBuf,
    pub bytes: u64,
}

/// Integrity outcome. A mismatch is data, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub matched: bool,
    pub hash_in: Option<String>,
    pub hash_out: String,
}

pub struct RestorePipeline<'a> {
    codecs: &'a CodecRegistry,
    chunk_size: usize,
}

impl<'a> RestorePipeline<'a> {
    pub fn new(codecs: &'a CodecRegistry, chunk_size: usize) -> Self {
        Self { codecs, chunk_size }
    }

    /// Decode `artifact` into `restore_root/<Display>/<leaf>`, where `leaf`
    /// is the artifact file name without its codec extension.
    pub fn restore(
        &self,
        artifact: &Path,
        restore_root: &Path,
        cancel: &CancellationToken,
    ) -> Result<RestoredArtifact, PipelineError> {
        let ext = artifact
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = CodecId::from_extension(&ext)?;
        let codec = self
            .codecs
            .get(id)
            .ok_or_else(|| PipelineError::UnsupportedCodec(id.name().to_string()))?;

        let leaf = artifact
            .file_stem()
            .ok_or_else(|| PipelineError::InvalidPath(artifact.display().to_string()))?;
        let target = restore_root.join(id.display_name()).join(leaf);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let partial = ArtifactStore::partial_path(&target);

        let decoded = (|| -> Result<u64, PipelineError> {
            let mut input = BufReader::new(File::open(artifact)?);
            let mut output = BufWriter::new(File::create(&partial)?);
            let n = codec.decode(&mut input, &mut output, self.chunk_size, cancel)?;
            output.flush()?;
            Ok(n)
        })();

        let bytes = match decoded {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
        };
        fs::rename(&partial, &target)?;

        debug!(artifact = %artifact.display(), codec = %id, bytes, "artifact restored");
        Ok(RestoredArtifact {
            codec: id,
            path: target,
            bytes,
        })
    }
}

/// Recompute the restored file's digest and compare it to `expected`.
///
/// With no expected hash the outcome is always a mismatch.
pub fn verify(restored: &Path, expected: Option<&str>) -> io::Result<Verification> {
    let hash_out = hash_file(restored)?;
    let matched = expected.is_some_and(|h| h.eq_ignore_ascii_case(&hash_out));
    Ok(Verification {
        matched,
        hash_in: expected.map(str::to_string),
        hash_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::BackupPipeline;
    use tempfile::tempdir;

    #[test]
    fn test_restore_lands_in_display_folder() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let back = tempdir().unwrap();
        let file = src.path().join("nested").join("report.csv");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, b"a,b,c\n1,2,3\n").unwrap();
        let hash = hash_file(&file).unwrap();

        let store = ArtifactStore::new(out.path());
        let codecs = CodecRegistry::builtin();
        let cancel = CancellationToken::new();
        let art = BackupPipeline::new(&store, &codecs, 64)
            .backup(&file, "brotli", src.path(), &hash, &cancel)
            .unwrap();

        let restored = RestorePipeline::new(&codecs, 64)
            .restore(&art.location, back.path(), &cancel)
            .unwrap();
        assert_eq!(restored.codec, CodecId::Brotli);
        assert_eq!(restored.path, back.path().join("Brotli").join("report.csv"));

        let v = verify(&restored.path, Some(&hash)).unwrap();
        assert!(v.matched);
        assert_eq!(v.hash_out, hash);
    }

    #[test]
    fn test_unknown_extension() {
        let back = tempdir().unwrap();
        let codecs = CodecRegistry::builtin();
        let err = RestorePipeline::new(&codecs, 64)
            .restore(Path::new("/nowhere/file.rar"), back.path(), &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::UnknownExtension(_)));
    }

    #[test]
    fn test_verify_mismatch_is_not_an_error() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("x");
        fs::write(&f, b"abc").unwrap();
        let v = verify(&f, Some("00")).unwrap();
        assert!(!v.matched);
        assert_eq!(v.hash_in.as_deref(), Some("00"));
        assert!(!verify(&f, None).unwrap().matched);
    }
}

// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Streaming codec implementations.
//!
//! Every codec is a stateless pair of transforms over `Read`/`Write`.
//! Input is pumped through in bounded chunks; the cancellation token is
//! checked between chunks.

use crate::pipeline::PipelineError;
use std::io::{self, Read, Write};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use vaultline_kernel::codec::CodecId;

pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: i32 = 11;
const BROTLI_LGWIN: i32 = 22;
const ZSTD_LEVEL: i32 = 3;

pub trait Codec: Send + Sync {
    fn id(&self) -> CodecId;

    /// Compress everything from `input` into `output`. Returns bytes read.
    fn encode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError>;

    /// Decompress everything from `input` into `output`. Returns bytes written.
    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError>;
}

/// Chunked copy with a cancellation check before every read.
pub fn pump(
    input: &mut dyn Read,
    output: &mut dyn Write,
    chunk_size: usize,
    cancel: &CancellationToken,
) -> Result<u64, PipelineError> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        output.write_all(&buf[..n])?;
        total += n as u64;
        debug!(chunk = n, total, "pumped chunk");
    }
    Ok(total)
}

/// Read adapter for encoders that drive their own input loop. Reads are
/// capped at `chunk_size` and refused once `cancel` fires.
struct CancellableReader<'a> {
    inner: &'a mut dyn Read,
    chunk_size: usize,
    cancel: &'a CancellationToken,
    total: u64,
    cancelled: bool,
}

impl<'a> CancellableReader<'a> {
    fn new(inner: &'a mut dyn Read, chunk_size: usize, cancel: &'a CancellationToken) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
            cancel,
            total: 0,
            cancelled: false,
        }
    }
}

impl Read for CancellableReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.cancel.is_cancelled() {
            self.cancelled = true;
            return Err(io::Error::new(io::ErrorKind::Other, "cancelled"));
        }
        let cap = buf.len().min(self.chunk_size);
        let n = self.inner.read(&mut buf[..cap])?;
        self.total += n as u64;
        Ok(n)
    }
}

pub struct Lz4Codec;

impl Codec for Lz4Codec {
    fn id(&self) -> CodecId {
        CodecId::Lz4
    }

    fn encode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut enc = lz4_flex::frame::FrameEncoder::new(output);
        let n = pump(input, &mut enc, chunk_size, cancel)?;
        enc.finish().map_err(io::Error::from)?;
        Ok(n)
    }

    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut dec = lz4_flex::frame::FrameDecoder::new(input);
        pump(&mut dec, output, chunk_size, cancel)
    }
}

pub struct ZstdCodec;

impl Codec for ZstdCodec {
    fn id(&self) -> CodecId {
        CodecId::Zstd
    }

    fn encode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut enc = zstd::stream::write::Encoder::new(output, ZSTD_LEVEL)?;
        let n = pump(input, &mut enc, chunk_size, cancel)?;
        enc.finish()?;
        Ok(n)
    }

    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut dec = zstd::stream::read::Decoder::new(input)?;
        pump(&mut dec, output, chunk_size, cancel)
    }
}

pub struct GzipCodec;

impl Codec for GzipCodec {
    fn id(&self) -> CodecId {
        CodecId::Gzip
    }

    fn encode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut enc = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        let n = pump(input, &mut enc, chunk_size, cancel)?;
        enc.finish()?;
        Ok(n)
    }

    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut dec = flate2::read::MultiGzDecoder::new(input);
        pump(&mut dec, output, chunk_size, cancel)
    }
}

pub struct BrotliCodec;

impl Codec for BrotliCodec {
    fn id(&self) -> CodecId {
        CodecId::Brotli
    }

    fn encode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let params = brotli::enc::BrotliEncoderParams {
            quality: BROTLI_QUALITY,
            lgwin: BROTLI_LGWIN,
            ..Default::default()
        };
        let mut reader = CancellableReader::new(input, chunk_size, cancel);
        // Writes the final meta-block too; its errors come back here.
        let mut sink = &mut *output;
        let res = brotli::BrotliCompress(&mut reader, &mut sink, &params);
        if reader.cancelled {
            return Err(PipelineError::Cancelled);
        }
        res?;
        output.flush()?;
        Ok(reader.total)
    }

    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut dec = brotli::Decompressor::new(input, BROTLI_BUFFER);
        pump(&mut dec, output, chunk_size, cancel)
    }
}

pub struct SnappyCodec;

impl Codec for SnappyCodec {
    fn id(&self) -> CodecId {
        CodecId::Snappy
    }

    fn encode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut enc = snap::write::FrameEncoder::new(output);
        let n = pump(input, &mut enc, chunk_size, cancel)?;
        enc.flush()?;
        Ok(n)
    }

    fn decode(
        &self,
        input: &mut dyn Read,
        output: &mut dyn Write,
        chunk_size: usize,
        cancel: &CancellationToken,
    ) -> Result<u64, PipelineError> {
        let mut dec = snap::read::FrameDecoder::new(input);
        pump(&mut dec, output, chunk_size, cancel)
    }
}

/// Lookup table from codec id to implementation.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn Codec>>,
}

impl CodecRegistry {
    /// Every codec the node ships.
    pub fn builtin() -> Self {
        Self {
            codecs: vec![
                Box::new(Lz4Codec),
                Box::new(ZstdCodec),
                Box::new(GzipCodec),
                Box::new(BrotliCodec),
                Box::new(SnappyCodec),
            ],
        }
    }

    /// Restrict to `ids`, keeping their order.
    pub fn select(ids: &[CodecId]) -> Self {
        let mut all = Self::builtin().codecs;
        let mut codecs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(pos) = all.iter().position(|c| c.id() == *id) {
                codecs.push(all.swap_remove(pos));
            }
        }
        Self { codecs }
    }

    pub fn get(&self, id: CodecId) -> Option<&dyn Codec> {
        self.codecs.iter().find(|c| c.id() == id).map(|c| c.as_ref())
    }

    pub fn by_name(&self, name: &str) -> Result<&dyn Codec, PipelineError> {
        let id: CodecId = name
            .parse()
            .map_err(|_| PipelineError::UnsupportedCodec(name.to_string()))?;
        self.get(id)
            .ok_or_else(|| PipelineError::UnsupportedCodec(name.to_string()))
    }

    pub fn ids(&self) -> Vec<CodecId> {
        self.codecs.iter().map(|c| c.id()).collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

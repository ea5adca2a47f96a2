//! Transparent compression for tap reads and writes.
//!
//! Child taps pass every stream they open through [`auto_detect_reader`] or
//! [`auto_detect_writer`], so a glob that matches a mix of `part-0.jsonl` and
//! `part-1.jsonl.gz` reads both without extra configuration.
//!
//! Built-in codecs, when enabled via feature flags:
//! - **Gzip** (`.gz`, `.gzip`) - via `flate2` (feature: `compression-gzip`)
//! - **Zstd** (`.zst`, `.zstd`) - via `zstd` (feature: `compression-zstd`)
//!
//! Readers are detected by extension first and magic bytes second; writers by
//! extension only. More codecs can be added at runtime with [`register_codec`].
//!
//! Writers must be closed with [`FinishWrite::finish`]; dropping one
//! discards any error from writing the codec trailer.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::sync::{Arc, PoisonError, RwLock};

static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
        #[cfg(feature = "compression-zstd")]
        Arc::new(ZstdCodec),
    ]
}

fn codecs() -> Vec<Arc<dyn CompressionCodec>> {
    CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(builtin_codecs)
        .clone()
}

/// Register an extra codec alongside the built-in ones.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(builtin_codecs)
        .push(codec);
}

/// A writer that has to be closed explicitly to complete its stream.
pub trait FinishWrite: Write {
    /// Write any trailer and flush everything down to the underlying sink.
    ///
    /// # Errors
    /// Returns the first I/O error hit while completing the stream.
    fn finish(self: Box<Self>) -> std::io::Result<()>;
}

impl<W: Write> FinishWrite for BufWriter<W> {
    fn finish(mut self: Box<Self>) -> std::io::Result<()> {
        self.flush()
    }
}

/// A stream compression format.
pub trait CompressionCodec: Send + Sync {
    /// Human-readable codec name (e.g., "gzip").
    fn name(&self) -> &str;

    /// Lowercase extensions including the leading dot (e.g. `&[".gz"]`).
    fn extensions(&self) -> &[&str];

    /// Signature at the start of a compressed stream, if the format has one.
    fn magic_bytes(&self) -> Option<&[u8]>;

    /// # Errors
    /// Returns an error if the decoder can't be initialized.
    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;

    /// # Errors
    /// Returns an error if the encoder can't be initialized.
    fn wrap_writer_dyn(&self, writer: Box<dyn Write>)
        -> std::io::Result<Box<dyn FinishWrite>>;
}

/// The registered codec whose extension ends `path`, if any.
#[must_use]
pub fn codec_for_path(path: &str) -> Option<Arc<dyn CompressionCodec>> {
    let lower = path.to_lowercase();
    codecs()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| lower.ends_with(ext)))
}

fn codec_for_magic<R: BufRead>(reader: &mut R) -> Option<Arc<dyn CompressionCodec>> {
    let head = reader.fill_buf().ok()?;
    if head.is_empty() {
        return None;
    }
    codecs()
        .into_iter()
        .find(|codec| codec.magic_bytes().is_some_and(|m| head.starts_with(m)))
}

/// Wrap `reader` with a decompressor when `path` or the stream header names a
/// known codec; otherwise return it buffered.
///
/// # Errors
/// Returns an error if the chosen codec fails to initialize.
pub fn auto_detect_reader<R: Read + 'static>(reader: R, path: &str) -> Result<Box<dyn Read>> {
    if let Some(codec) = codec_for_path(path) {
        return codec
            .wrap_reader_dyn(Box::new(reader))
            .with_context(|| format!("wrap reader for {path} with {} codec", codec.name()));
    }

    let mut buffered = BufReader::new(reader);
    if let Some(codec) = codec_for_magic(&mut buffered) {
        return codec
            .wrap_reader_dyn(Box::new(buffered))
            .with_context(|| format!("wrap reader for {path} with {} codec", codec.name()));
    }
    Ok(Box::new(buffered))
}

/// Wrap `writer` with a compressor when `path`'s extension names a known
/// codec; otherwise return it buffered.
///
/// # Errors
/// Returns an error if the chosen codec fails to initialize.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path: &str,
) -> Result<Box<dyn FinishWrite>> {
    match codec_for_path(path) {
        Some(codec) => codec
            .wrap_writer_dyn(Box::new(BufWriter::new(writer)))
            .with_context(|| format!("wrap writer for {path} with {} codec", codec.name())),
        None => Ok(Box::new(BufWriter::new(writer))),
    }
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }

    fn wrap_writer_dyn(
        &self,
        writer: Box<dyn Write>,
    ) -> std::io::Result<Box<dyn FinishWrite>> {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        Ok(Box::new(GzEncoder::new(writer, Compression::default())))
    }
}

#[cfg(feature = "compression-gzip")]
impl FinishWrite for flate2::write::GzEncoder<Box<dyn Write>> {
    fn finish(self: Box<Self>) -> std::io::Result<()> {
        (*self).finish()?.flush()
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl CompressionCodec for ZstdCodec {
    fn name(&self) -> &str {
        "zstd"
    }

    fn extensions(&self) -> &[&str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x28, 0xb5, 0x2f, 0xfd])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }

    fn wrap_writer_dyn(
        &self,
        writer: Box<dyn Write>,
    ) -> std::io::Result<Box<dyn FinishWrite>> {
        zstd::stream::write::Encoder::new(writer, 3).map(|e| Box::new(e) as Box<dyn FinishWrite>)
    }
}

#[cfg(feature = "compression-zstd")]
impl FinishWrite for zstd::stream::write::Encoder<'static, Box<dyn Write>> {
    fn finish(self: Box<Self>) -> std::io::Result<()> {
        (*self).finish()?.flush()
    }
}

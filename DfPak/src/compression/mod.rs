//! Compression backends for package payloads
//!
//! Every entry names its compression kind; [`CompressionBackend::for_kind`]
//! picks the matching backend and the caller only sees `compress` and
//! `decompress`.

use crate::dfpf::CompressionKind;
use crate::error::Result;

pub mod external;
pub mod zlib;

pub use external::ExternalTool;

/// A payload codec selected from an entry's [`CompressionKind`]
#[derive(Debug, Clone, Copy)]
pub enum CompressionBackend<'a> {
    /// Stored payloads, returned as-is both ways
    PassThrough,
    /// In-process zlib-framed deflate
    Deflate,
    /// Out-of-process LZX via the vendor tools
    External(&'a ExternalTool),
}

impl<'a> CompressionBackend<'a> {
    /// Backend for `kind`, using `tool` for externally compressed entries
    #[must_use]
    pub fn for_kind(kind: CompressionKind, tool: &'a ExternalTool) -> Self {
        match kind {
            CompressionKind::None => CompressionBackend::PassThrough,
            CompressionKind::Deflate => CompressionBackend::Deflate,
            CompressionKind::External => CompressionBackend::External(tool),
        }
    }

    /// Compress a full payload
    ///
    /// # Errors
    /// Returns an error if the deflate stream cannot be written or the
    /// external tool fails.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionBackend::PassThrough => Ok(data.to_vec()),
            CompressionBackend::Deflate => zlib::compress(data),
            CompressionBackend::External(tool) => tool.compress(data),
        }
    }

    /// Decompress a payload into `expected_len` bytes
    ///
    /// # Errors
    /// Returns an error if the stream is corrupt or the external tool fails.
    pub fn decompress(&self, data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        match self {
            CompressionBackend::PassThrough => Ok(data.to_vec()),
            CompressionBackend::Deflate => zlib::decompress(data, expected_len),
            CompressionBackend::External(tool) => tool.decompress(data, expected_len),
        }
    }
}

//! Zlib-framed deflate as stored in packages
//!
//! Payloads are a two-byte zlib header (`78 DA`), a raw deflate stream and a
//! big-endian Adler-32 of the uncompressed bytes, which is exactly what
//! flate2's `ZlibEncoder` produces at its best level.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{Error, Result};

/// Zlib header for a 32K window at maximum compression
pub const ZLIB_HEADER: [u8; 2] = [0x78, 0xDA];

/// Compress `data` into a zlib-framed deflate payload
///
/// # Errors
/// Returns an error if the deflate encoder fails.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2 + 16), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate exactly `expected_len` bytes from a zlib-framed payload.
///
/// Anything after the deflate stream (the checksum, block padding) is ignored.
///
/// # Errors
/// Returns [`Error::ZlibDecompressionFailed`] if the header is missing, the
/// stream is corrupt, or it ends before `expected_len` bytes were produced.
pub fn decompress(data: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    if expected_len == 0 {
        return Ok(Vec::new());
    }

    let stream = data.get(ZLIB_HEADER.len()..).ok_or_else(|| Error::ZlibDecompressionFailed {
        message: format!("payload of {} bytes has no zlib header", data.len()),
    })?;

    let mut decompressed = Vec::with_capacity(expected_len);
    DeflateDecoder::new(stream)
        .take(expected_len as u64)
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::ZlibDecompressionFailed {
            message: e.to_string(),
        })?;

    if decompressed.len() != expected_len {
        return Err(Error::ZlibDecompressionFailed {
            message: format!(
                "stream ended after {} of {expected_len} bytes",
                decompressed.len()
            ),
        });
    }

    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adler32_of(data: &[u8]) -> u32 {
        let (mut s1, mut s2) = (1u32, 0u32);
        for &b in data {
            s1 = (s1 + u32::from(b)) % 65521;
            s2 = (s2 + s1) % 65521;
        }
        (s2 << 16) | s1
    }

    #[test]
    fn test_compress_framing() {
        let data = b"hello hello hello hello";
        let compressed = compress(data).unwrap();

        assert_eq!(&compressed[..2], &ZLIB_HEADER);
        let trailer = &compressed[compressed.len() - 4..];
        assert_eq!(trailer, &adler32_of(data).to_be_bytes());

        // The framing is standard zlib, so a stock decoder accepts it
        let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
        let mut out = Vec::new();
        decoder.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_round_trip() {
        let inputs: [&[u8]; 4] = [b"", b"\0", b"\0\0\0abc\0\0", &[7u8; 70_000]];
        for input in inputs {
            let compressed = compress(input).unwrap();
            assert_eq!(&compressed[..2], &ZLIB_HEADER);
            assert_eq!(decompress(&compressed, input.len()).unwrap(), input);
        }
    }

    #[test]
    fn test_decompress_ignores_trailing_bytes() {
        let data: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
        let mut padded = compress(&data).unwrap();
        padded.resize(padded.len() + 2048, 0);

        assert_eq!(decompress(&padded, data.len()).unwrap(), data);
        assert_eq!(decompress(&padded, 100).unwrap(), &data[..100]);
    }

    #[test]
    fn test_decompress_short_stream() {
        let compressed = compress(b"short").unwrap();
        assert!(matches!(
            decompress(&compressed, 50),
            Err(Error::ZlibDecompressionFailed { .. })
        ));
        assert!(decompress(&[0x78], 1).is_err());
    }
}

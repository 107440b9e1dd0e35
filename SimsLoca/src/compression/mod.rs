//! Compression utilities
//!
//! Packages store resources either raw, zlib-compressed, or RefPack
//! compressed. Zlib goes both ways; RefPack is decode-only.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::error::{Error, Result};

pub mod refpack;

/// Compress data as a zlib stream
///
/// # Errors
/// Returns an error if compression fails.
pub fn compress_zlib(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress a zlib stream
///
/// `expected_size` is only a capacity hint.
///
/// # Errors
/// Returns [`Error::ZlibDecompressionFailed`] if the stream is invalid.
pub fn decompress_zlib(compressed: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut decompressed = Vec::with_capacity(expected_size);

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::ZlibDecompressionFailed {
            message: e.to_string(),
        })?;

    if expected_size != 0 && decompressed.len() != expected_size {
        tracing::debug!(
            "zlib stream inflated to {} bytes, index says {}",
            decompressed.len(),
            expected_size
        );
    }

    Ok(decompressed)
}

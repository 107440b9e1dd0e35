//! DBPF package writer
//!
//! Saving never rewrites the package from scratch. The original bytes are
//! copied, each table to be saved is appended as a fresh payload, and the
//! matching index records are patched to point at it.

use std::collections::HashMap;
use std::io::{Cursor, Seek, SeekFrom};

use byteorder::{LittleEndian, WriteBytesExt};

use super::index::walk_index;
use super::model::ArchiveModel;
use super::{
    CODEC_DEFLATE, COMMITTED, CompressionCodec, ResourceKey, SIZE_COMPRESSED_FLAG, SaveOptions,
};
use crate::compression::compress_zlib;
use crate::error::{Error, Result};
use crate::formats::stbl::encode_stbl;

/// New location of a re-encoded table
#[derive(Debug, Clone, Copy)]
struct PendingUpdate {
    offset: u32,
    size: u32,
    decompressed_size: u32,
    /// Whether the record has a codec field to carry the zlib id
    compressed: bool,
}

/// Save modified tables with default options
///
/// # Errors
/// See [`save_package_with`].
pub fn save_package(original: &[u8], model: &ArchiveModel) -> Result<Vec<u8>> {
    save_package_with(original, model, &SaveOptions::default())
}

/// Produce the bytes of the saved package.
///
/// `original` must be the buffer `model` was loaded from. Tables that are
/// modified (or all tables with [`SaveOptions::reencode_all`]) are encoded,
/// zlib-compressed and appended; their index records are redirected to the
/// new payload. Records without a codec field get the table appended
/// uncompressed, since there is no room to declare a codec.
///
/// # Errors
/// Returns [`Error::OffsetOverflow`] if an appended payload would start past
/// the 32-bit offset range, or [`Error::IndexRewriteMismatch`] if an updated
/// table's record cannot be found in the index.
pub fn save_package_with(
    original: &[u8],
    model: &ArchiveModel,
    options: &SaveOptions,
) -> Result<Vec<u8>> {
    let mut out = original.to_vec();
    let mut updates: HashMap<ResourceKey, PendingUpdate> = HashMap::new();

    for slot in model.tables() {
        if !options.reencode_all && !slot.table.is_modified() {
            continue;
        }

        let encoded = encode_stbl(&slot.table)?;
        let compressed = model
            .entry(&slot.key)
            .is_none_or(|entry| entry.has_codec_field);
        let payload = if compressed {
            compress_zlib(&encoded, options.level)?
        } else {
            encoded.clone()
        };

        let offset = u32::try_from(out.len())
            .map_err(|_| Error::OffsetOverflow { offset: out.len() })?;
        let end = out.len() + payload.len();
        let size = u32::try_from(payload.len()).map_err(|_| Error::OffsetOverflow { offset: end })?;
        let decompressed_size =
            u32::try_from(encoded.len()).map_err(|_| Error::OffsetOverflow { offset: end })?;

        tracing::debug!(
            "Appending {} at {}: {} bytes ({} decoded)",
            slot.key,
            offset,
            size,
            decompressed_size
        );

        out.extend_from_slice(&payload);
        updates.insert(
            slot.key,
            PendingUpdate {
                offset,
                size,
                decompressed_size,
                compressed,
            },
        );
    }

    if updates.is_empty() {
        return Ok(out);
    }

    let scheduled = updates.len();
    {
        let mut cursor = Cursor::new(out.as_mut_slice());
        for record in walk_index(original, &model.header)? {
            if record.codec() == CompressionCodec::Deleted {
                continue;
            }
            let Some(update) = updates.remove(&record.key) else {
                continue;
            };

            cursor.seek(SeekFrom::Start(record.location as u64))?;
            cursor.write_u32::<LittleEndian>(update.offset)?;
            if update.compressed {
                cursor.write_u32::<LittleEndian>(update.size | SIZE_COMPRESSED_FLAG)?;
                cursor.write_u32::<LittleEndian>(update.decompressed_size)?;
                cursor.write_u16::<LittleEndian>(CODEC_DEFLATE)?;
                cursor.write_u16::<LittleEndian>(COMMITTED)?;
            } else {
                cursor.write_u32::<LittleEndian>(update.size)?;
                cursor.write_u32::<LittleEndian>(update.decompressed_size)?;
            }
        }
    }

    if !updates.is_empty() {
        return Err(Error::IndexRewriteMismatch {
            missing: updates.len(),
        });
    }

    tracing::debug!("Rewrote {} index records", scheduled);
    Ok(out)
}

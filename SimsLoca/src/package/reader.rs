//! DBPF package reader with per-entry error recovery

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::index::{IndexRecord, walk_index};
use super::model::{ArchiveModel, TableSlot};
use super::{
    ArchiveEntry, ArchiveHeader, CompressionCodec, EntryFailure, HEADER_SIZE, MAGIC,
    USER_VERSION, VERSION,
};
use crate::compression::{decompress_zlib, refpack};
use crate::error::{Error, Result};
use crate::formats::stbl::{LocalizationTable, STBL_RESOURCE_TYPE, parse_stbl_bytes};

/// Parse the fixed package header
///
/// # Errors
/// Returns [`Error::TooShort`], [`Error::InvalidPackageMagic`],
/// [`Error::UnsupportedPackageVersion`] or [`Error::UnsupportedUserVersion`].
pub fn read_header(data: &[u8]) -> Result<ArchiveHeader> {
    if data.len() < HEADER_SIZE {
        return Err(Error::TooShort {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(Error::InvalidPackageMagic(magic));
    }

    let major_version = cursor.read_u32::<LittleEndian>()?;
    let minor_version = cursor.read_u32::<LittleEndian>()?;
    if (major_version, minor_version) != VERSION {
        return Err(Error::UnsupportedPackageVersion {
            major: major_version,
            minor: minor_version,
        });
    }

    let user_major = cursor.read_u32::<LittleEndian>()?;
    let user_minor = cursor.read_u32::<LittleEndian>()?;
    if (user_major, user_minor) != USER_VERSION {
        return Err(Error::UnsupportedUserVersion {
            major: user_major,
            minor: user_minor,
        });
    }

    let _unused = cursor.read_u32::<LittleEndian>()?;
    let created = cursor.read_u32::<LittleEndian>()?;
    let updated = cursor.read_u32::<LittleEndian>()?;
    let _unused = cursor.read_u32::<LittleEndian>()?;
    let index_count = cursor.read_u32::<LittleEndian>()?;
    let index_offset_low = cursor.read_u32::<LittleEndian>()?;
    let index_size = cursor.read_u32::<LittleEndian>()?;

    cursor.set_position(64);
    let index_offset_high = cursor.read_u64::<LittleEndian>()?;

    let index_offset = if index_offset_high == 0 {
        u64::from(index_offset_low)
    } else {
        index_offset_high
    };

    Ok(ArchiveHeader {
        major_version,
        minor_version,
        user_major,
        user_minor,
        created,
        updated,
        index_count,
        index_offset,
        index_size,
    })
}

/// Parse a package and decode every string table in it
///
/// Problems confined to one entry (unknown codec, bad payload, undecodable
/// table) are recorded in [`ArchiveModel::failures`] and do not stop the load.
///
/// # Errors
/// Returns an error if the header is invalid or the index is unreadable.
pub fn load_package(data: &[u8]) -> Result<ArchiveModel> {
    let header = read_header(data)?;
    tracing::debug!(
        "DBPF {}.{}: {} index records at {} ({} bytes)",
        header.major_version,
        header.minor_version,
        header.index_count,
        header.index_offset,
        header.index_size
    );

    let mut model = ArchiveModel::new(header);

    if header.index_offset == 0 {
        if header.index_count != 0 {
            return Err(Error::MissingIndex {
                count: header.index_count,
            });
        }
        return Ok(model);
    }

    for record in walk_index(data, &header)? {
        let codec = record.codec();
        if codec == CompressionCodec::Deleted {
            tracing::debug!("Skipping deleted entry {}", record.key);
            continue;
        }

        let entry = entry_from_record(&record, codec);

        if entry.key.resource_type == STBL_RESOURCE_TYPE {
            if model.tables.contains_key(&entry.key.instance) {
                record_failure(&mut model, &entry, &Error::DuplicateInstance(entry.key.instance));
            } else {
                match decode_table(data, &entry) {
                    Ok(table) => {
                        tracing::debug!("Loaded {} strings from {}", table.len(), entry.key);
                        model.tables.insert(
                            entry.key.instance,
                            TableSlot {
                                key: entry.key,
                                table,
                            },
                        );
                    }
                    Err(e) => record_failure(&mut model, &entry, &e),
                }
            }
        }

        model.entries.push(entry);
    }

    tracing::debug!(
        "Loaded {} entries, {} string tables, {} failures",
        model.entries.len(),
        model.tables.len(),
        model.failures.len()
    );

    Ok(model)
}

/// Read and decompress the payload of any entry
///
/// # Errors
/// Returns an error if the payload is out of bounds, the codec is not
/// supported, or decompression fails.
pub fn read_resource(data: &[u8], entry: &ArchiveEntry) -> Result<Vec<u8>> {
    let start = entry.offset as usize;
    let payload = start
        .checked_add(entry.size as usize)
        .and_then(|end| data.get(start..end))
        .ok_or(Error::PayloadOutOfBounds {
            offset: entry.offset,
            size: entry.size,
            len: data.len(),
        })?;

    match entry.codec {
        CompressionCodec::Stored => Ok(payload.to_vec()),
        CompressionCodec::Deflate => decompress_zlib(payload, entry.decompressed_size as usize),
        CompressionCodec::RefPackLegacy | CompressionCodec::RefPackCurrent => {
            refpack::decompress(payload)
        }
        CompressionCodec::Deleted | CompressionCodec::Unknown(_) => {
            Err(Error::UnknownCompression(entry.codec.id()))
        }
    }
}

fn decode_table(data: &[u8], entry: &ArchiveEntry) -> Result<LocalizationTable> {
    let bytes = read_resource(data, entry)?;
    parse_stbl_bytes(&bytes)
}

fn entry_from_record(record: &IndexRecord, codec: CompressionCodec) -> ArchiveEntry {
    ArchiveEntry {
        key: record.key,
        offset: record.offset,
        size: record.size(),
        decompressed_size: record.decompressed_size,
        codec,
        committed: record.codec_field.map_or(1, |(_, committed)| committed),
        has_codec_field: record.codec_field.is_some(),
    }
}

fn record_failure(model: &mut ArchiveModel, entry: &ArchiveEntry, error: &Error) {
    tracing::warn!("Failed to load string table {}: {}", entry.key, error);
    model.failures.push(EntryFailure {
        key: entry.key,
        reason: error.to_string(),
    });
}

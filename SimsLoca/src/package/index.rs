//! Index walking shared by load and save
//!
//! Both directions must agree byte for byte on where each record's fields
//! live, so there is exactly one walker.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{ArchiveHeader, CompressionCodec, IndexFlags, ResourceKey, SIZE_COMPRESSED_FLAG};
use crate::error::{Error, Result};

/// A raw index record and where it sits in the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexRecord {
    pub key: ResourceKey,
    pub offset: u32,
    /// Size field as stored, compression bit included
    pub size_field: u32,
    pub decompressed_size: u32,
    /// `(codec id, committed)` when the compression bit is set
    pub codec_field: Option<(u16, u16)>,
    /// Absolute position of the offset field
    pub location: usize,
}

impl IndexRecord {
    pub fn size(&self) -> u32 {
        self.size_field & !SIZE_COMPRESSED_FLAG
    }

    pub fn codec(&self) -> CompressionCodec {
        self.codec_field
            .map_or(CompressionCodec::Stored, |(id, _)| CompressionCodec::from_id(id))
    }
}

struct IndexReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl IndexReader<'_> {
    fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn truncated(&self) -> Error {
        Error::IndexTruncated {
            position: self.position(),
            len: self.cursor.get_ref().len(),
        }
    }

    fn u16(&mut self) -> Result<u16> {
        let pos = self.cursor.position();
        self.cursor.read_u16::<LittleEndian>().map_err(|_| {
            self.cursor.set_position(pos);
            self.truncated()
        })
    }

    fn u32(&mut self) -> Result<u32> {
        let pos = self.cursor.position();
        self.cursor.read_u32::<LittleEndian>().map_err(|_| {
            self.cursor.set_position(pos);
            self.truncated()
        })
    }

    /// Read a field unless the index declares it constant
    fn field(&mut self, constant: Option<u32>) -> Result<u32> {
        match constant {
            Some(value) => Ok(value),
            None => self.u32(),
        }
    }
}

/// Walk every record of the index, deleted ones included.
///
/// # Errors
/// Returns [`Error::IndexTruncated`] if the index runs past the buffer.
pub(crate) fn walk_index(data: &[u8], header: &ArchiveHeader) -> Result<Vec<IndexRecord>> {
    let start = usize::try_from(header.index_offset)
        .ok()
        .filter(|&start| start <= data.len())
        .ok_or(Error::IndexTruncated {
            position: data.len(),
            len: data.len(),
        })?;

    let mut reader = IndexReader {
        cursor: Cursor::new(data),
    };
    reader.cursor.set_position(start as u64);

    let flags = IndexFlags(reader.u32()?);
    let shared_type = flags.constant_type().then(|| reader.u32()).transpose()?;
    let shared_group = flags.constant_group().then(|| reader.u32()).transpose()?;
    let shared_instance_ex = flags
        .constant_instance_ex()
        .then(|| reader.u32())
        .transpose()?;

    tracing::debug!(
        "Index at {}: flags {:#x}, {} records",
        start,
        flags.0,
        header.index_count
    );

    let mut records = Vec::with_capacity((header.index_count as usize).min(data.len() / 16));
    for _ in 0..header.index_count {
        let resource_type = reader.field(shared_type)?;
        let group = reader.field(shared_group)?;
        let instance_ex = reader.field(shared_instance_ex)?;
        let instance_low = reader.u32()?;

        let location = reader.position();
        let offset = reader.u32()?;
        let size_field = reader.u32()?;
        let decompressed_size = reader.u32()?;
        let codec_field = if size_field & SIZE_COMPRESSED_FLAG == 0 {
            None
        } else {
            Some((reader.u16()?, reader.u16()?))
        };

        records.push(IndexRecord {
            key: ResourceKey::new(
                resource_type,
                group,
                (u64::from(instance_ex) << 32) | u64::from(instance_low),
            ),
            offset,
            size_field,
            decompressed_size,
            codec_field,
            location,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn header(index_count: u32) -> ArchiveHeader {
        ArchiveHeader {
            major_version: 2,
            minor_version: 1,
            user_major: 0,
            user_minor: 0,
            created: 0,
            updated: 0,
            index_count,
            index_offset: 0,
            index_size: 0,
        }
    }

    #[test]
    fn test_shared_type_applies_to_every_record() {
        let mut index = Vec::new();
        index.write_u32::<LittleEndian>(IndexFlags::CONSTANT_TYPE).unwrap();
        index.write_u32::<LittleEndian>(0x220557DA).unwrap();
        for i in 0..3u32 {
            index.write_u32::<LittleEndian>(0x100 + i).unwrap(); // group
            index.write_u32::<LittleEndian>(0xAB).unwrap(); // instance ex
            index.write_u32::<LittleEndian>(i).unwrap(); // instance low
            index.write_u32::<LittleEndian>(96).unwrap(); // offset
            index.write_u32::<LittleEndian>(10).unwrap(); // size
            index.write_u32::<LittleEndian>(10).unwrap(); // decompressed
        }

        let records = walk_index(&index, &header(3)).unwrap();
        assert_eq!(records.len(), 3);
        for (i, record) in records.iter().enumerate() {
            assert_eq!(record.key.resource_type, 0x220557DA);
            assert_eq!(record.key.group, 0x100 + i as u32);
            assert_eq!(record.key.instance, (0xAB << 32) | i as u64);
            assert_eq!(record.codec(), CompressionCodec::Stored);
        }
        // flags + shared type + 6 fields per record
        assert_eq!(records[1].location, 8 + 24 + 12);
    }

    #[test]
    fn test_compression_field_follows_flagged_size() {
        let mut index = Vec::new();
        index.write_u32::<LittleEndian>(0b111).unwrap();
        index.write_u32::<LittleEndian>(1).unwrap();
        index.write_u32::<LittleEndian>(2).unwrap();
        index.write_u32::<LittleEndian>(3).unwrap();
        index.write_u32::<LittleEndian>(4).unwrap(); // instance low
        index.write_u32::<LittleEndian>(500).unwrap();
        index.write_u32::<LittleEndian>(0x8000_0020).unwrap();
        index.write_u32::<LittleEndian>(64).unwrap();
        index.write_u16::<LittleEndian>(0x5A42).unwrap();
        index.write_u16::<LittleEndian>(1).unwrap();

        let records = walk_index(&index, &header(1)).unwrap();
        assert_eq!(records[0].key, ResourceKey::new(1, 2, (3 << 32) | 4));
        assert_eq!(records[0].size(), 0x20);
        assert_eq!(records[0].codec_field, Some((0x5A42, 1)));
        assert_eq!(records[0].codec(), CompressionCodec::Deflate);
    }

    #[test]
    fn test_truncated_index() {
        let mut index = Vec::new();
        index.write_u32::<LittleEndian>(0).unwrap();
        index.write_u32::<LittleEndian>(1).unwrap();

        assert!(matches!(
            walk_index(&index, &header(1)),
            Err(Error::IndexTruncated { .. })
        ));
    }
}

//! `.stbl` file reading and parsing

use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{HEADER_SIZE, LocalizationTable, STBL_MAGIC, STBL_VERSION, TableEntry};
use crate::error::{Error, Result};

/// Read a .stbl file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or any error of
/// [`parse_stbl_bytes`].
pub fn read_stbl<P: AsRef<Path>>(path: P) -> Result<LocalizationTable> {
    let data = std::fs::read(path.as_ref())?;
    tracing::info!("Read {} ({} bytes)", path.as_ref().display(), data.len());
    parse_stbl_bytes(&data)
}

/// Parse a string table from bytes
///
/// Rows that are cut off by the end of the buffer are logged and dropped;
/// everything decoded before them is kept. Invalid UTF-8 is replaced with
/// U+FFFD rather than failing the row.
///
/// # Errors
///
/// Returns [`Error::TooShort`] if the header is incomplete,
/// [`Error::InvalidStblMagic`] on a wrong magic and
/// [`Error::UnsupportedStblVersion`] if the version is not 5.
pub fn parse_stbl_bytes(data: &[u8]) -> Result<LocalizationTable> {
    if data.len() < HEADER_SIZE {
        return Err(Error::TooShort {
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;
    if magic != STBL_MAGIC {
        return Err(Error::InvalidStblMagic(magic));
    }

    let version = cursor.read_u16::<LittleEndian>()?;
    if version != STBL_VERSION {
        return Err(Error::UnsupportedStblVersion(version));
    }

    // Compression is handled by the package layer
    let _compressed = cursor.read_u8()?;
    let num_entries = cursor.read_u64::<LittleEndian>()?;
    let _reserved = cursor.read_u16::<LittleEndian>()?;
    let strings_length = cursor.read_u32::<LittleEndian>()?;

    tracing::debug!(
        "STBL v{}: {} entries, {} bytes of strings",
        version,
        num_entries,
        strings_length
    );

    let mut entries = Vec::new();
    for index in 0..num_entries {
        match read_entry(&mut cursor) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(
                    "STBL row {} of {} unreadable at byte {}: {}",
                    index,
                    num_entries,
                    cursor.position(),
                    e
                );
                break;
            }
        }
    }

    let decoded = entries.len();
    let table = LocalizationTable::from_entries(entries);
    if table.len() != decoded {
        tracing::debug!(
            "STBL contained {} duplicate keys",
            decoded - table.len()
        );
    }

    Ok(table)
}

fn read_entry(cursor: &mut Cursor<&[u8]>) -> Result<TableEntry> {
    let key = cursor.read_u32::<LittleEndian>()?;
    let flags = cursor.read_u8()?;
    let length = usize::from(cursor.read_u16::<LittleEndian>()?);

    let mut text_bytes = vec![0u8; length];
    cursor
        .read_exact(&mut text_bytes)
        .map_err(|_| Error::UnexpectedEof)?;

    Ok(TableEntry {
        key,
        text: String::from_utf8_lossy(&text_bytes).into_owned(),
        flags,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn header(count: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"STBL");
        buf.write_u16::<LittleEndian>(5).unwrap();
        buf.write_u8(0).unwrap();
        buf.write_u64::<LittleEndian>(count).unwrap();
        buf.write_u16::<LittleEndian>(0).unwrap();
        buf.write_u32::<LittleEndian>(0).unwrap();
        buf
    }

    fn row(buf: &mut Vec<u8>, key: u32, flags: u8, text: &[u8]) {
        buf.write_u32::<LittleEndian>(key).unwrap();
        buf.write_u8(flags).unwrap();
        buf.write_u16::<LittleEndian>(text.len() as u16).unwrap();
        buf.extend_from_slice(text);
    }

    #[test]
    fn test_parse_rows() {
        let mut buf = header(2);
        row(&mut buf, 0x2000, 0, b"World");
        row(&mut buf, 0x1000, 1, b"Hello");

        let table = parse_stbl_bytes(&buf).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_text(0x1000), Some("Hello"));
        assert_eq!(table.get(0x1000).unwrap().flags, 1);
        assert!(!table.is_modified());
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut buf = header(1);
        row(&mut buf, 1, 0, &[b'o', b'k', 0xFF]);

        let table = parse_stbl_bytes(&buf).unwrap();
        assert_eq!(table.get_text(1), Some("ok\u{FFFD}"));
    }

    #[test]
    fn test_truncated_row_keeps_earlier_rows() {
        let mut buf = header(3);
        row(&mut buf, 1, 0, b"first");
        row(&mut buf, 2, 0, b"second");
        buf.truncate(buf.len() - 3);

        let table = parse_stbl_bytes(&buf).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get_text(1), Some("first"));
    }

    #[test]
    fn test_rejects_bad_header() {
        assert!(matches!(
            parse_stbl_bytes(b"STBL"),
            Err(Error::TooShort { expected: 21, actual: 4 })
        ));

        let mut buf = header(0);
        buf[..4].copy_from_slice(b"LBTS");
        assert!(matches!(parse_stbl_bytes(&buf), Err(Error::InvalidStblMagic(_))));

        let mut buf = header(0);
        buf[4] = 4;
        assert!(matches!(
            parse_stbl_bytes(&buf),
            Err(Error::UnsupportedStblVersion(4))
        ));
    }
}

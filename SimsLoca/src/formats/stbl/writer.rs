//! `.stbl` file writing

use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::{ENTRY_HEADER_SIZE, HEADER_SIZE, LocalizationTable, STBL_MAGIC, STBL_VERSION};
use crate::error::{Error, Result};
use crate::utils::write_atomic;

/// Write a .stbl file to disk
///
/// The file is replaced atomically.
///
/// # Errors
/// Returns an error if encoding or writing fails.
pub fn write_stbl<P: AsRef<Path>>(path: P, table: &LocalizationTable) -> Result<()> {
    let data = encode_stbl(table)?;
    write_atomic(path.as_ref(), &data)?;
    tracing::info!("Wrote {} strings to {}", table.len(), path.as_ref().display());
    Ok(())
}

/// Encode a string table
///
/// Entries are written in ascending key order. Text is normalized first:
/// `\r` is dropped and `\n` becomes the two characters `\n`.
///
/// # Errors
/// Returns [`Error::StringTooLong`] if a normalized string does not fit the
/// 16-bit length field.
pub fn encode_stbl(table: &LocalizationTable) -> Result<Vec<u8>> {
    let texts = table
        .iter()
        .map(|entry| {
            let text = entry.normalized_text();
            if text.len() > usize::from(u16::MAX) {
                return Err(Error::StringTooLong {
                    key: entry.key,
                    len: text.len(),
                });
            }
            Ok((entry, text))
        })
        .collect::<Result<Vec<_>>>()?;

    let strings_length: usize = texts
        .iter()
        .map(|(_, text)| ENTRY_HEADER_SIZE + text.len())
        .sum();

    let mut buf = Vec::with_capacity(HEADER_SIZE + strings_length);

    buf.extend_from_slice(&STBL_MAGIC);
    buf.write_u16::<LittleEndian>(STBL_VERSION)?;
    buf.write_u8(0)?; // not compressed
    buf.write_u64::<LittleEndian>(texts.len() as u64)?;
    buf.write_u16::<LittleEndian>(0)?; // reserved
    buf.write_u32::<LittleEndian>(strings_length as u32)?;

    for (entry, text) in &texts {
        buf.write_u32::<LittleEndian>(entry.key)?;
        buf.write_u8(entry.flags)?;
        buf.write_u16::<LittleEndian>(text.len() as u16)?;
        buf.extend_from_slice(text.as_bytes());
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::super::{TableEntry, parse_stbl_bytes};
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hello_roundtrip() {
        let table = LocalizationTable::from_entries([TableEntry::new(0x1001, "Hello")]);
        let decoded = parse_stbl_bytes(&encode_stbl(&table).unwrap()).unwrap();

        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get(0x1001), Some(&TableEntry::new(0x1001, "Hello")));
    }

    #[test]
    fn test_exact_bytes() {
        let table = LocalizationTable::from_entries([
            TableEntry::new(2, "b").with_flags(1),
            TableEntry::new(1, "a"),
        ]);
        let bytes = encode_stbl(&table).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"STBL");
        expected.extend_from_slice(&[5, 0]); // version
        expected.push(0); // compressed
        expected.extend_from_slice(&2u64.to_le_bytes());
        expected.extend_from_slice(&[0, 0]); // reserved
        expected.extend_from_slice(&16u32.to_le_bytes()); // 2 * (7 + 1)
        expected.extend_from_slice(&[1, 0, 0, 0, 0, 1, 0, b'a']);
        expected.extend_from_slice(&[2, 0, 0, 0, 1, 1, 0, b'b']);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_line_endings_are_escaped() {
        let table = LocalizationTable::from_entries([TableEntry::new(9, "one\r\ntwo\nthree")]);
        let bytes = encode_stbl(&table).unwrap();

        assert!(!bytes.contains(&b'\n'));
        assert!(!bytes.contains(&b'\r'));

        let decoded = parse_stbl_bytes(&bytes).unwrap();
        assert_eq!(decoded.get_text(9), Some("one\\ntwo\\nthree"));
    }

    #[test]
    fn test_roundtrip_preserves_keys_and_flags() {
        let table = LocalizationTable::from_entries([
            TableEntry::new(0xDEAD_BEEF, "Ünïcödé ✓").with_flags(0x80),
            TableEntry::new(0, ""),
            TableEntry::new(u32::MAX, "last"),
        ]);
        let decoded = parse_stbl_bytes(&encode_stbl(&table).unwrap()).unwrap();

        let original: Vec<_> = table.iter().cloned().collect();
        let roundtrip: Vec<_> = decoded.iter().cloned().collect();
        assert_eq!(original, roundtrip);
    }

    #[test]
    fn test_string_too_long() {
        let table = LocalizationTable::from_entries([TableEntry::new(5, "x".repeat(70_000))]);
        assert!(matches!(
            encode_stbl(&table),
            Err(Error::StringTooLong { key: 5, len: 70_000 })
        ));
    }
}

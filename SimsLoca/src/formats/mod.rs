//! File format handlers for resources stored inside packages

pub mod stbl;

// Re-export main table types
pub use stbl::{LocalizationTable, TableEntry, encode_stbl, parse_stbl_bytes, read_stbl, write_stbl};

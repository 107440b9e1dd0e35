#![allow(non_snake_case)]
//! # SimsLoca
//!
//! A pure-Rust library for editing the string tables inside DBPF 2.1
//! `.package` files.
//!
//! ## Supported Formats
//!
//! - **DBPF packages** - Header and index parsing, in-place saving
//! - **STBL** - Binary string tables (version 5)
//! - **RefPack** - Decompression of RefPack-compressed resources
//! - **Translation files** - TSV, CSV and JSON export/import
//!
//! ## Quick Start
//!
//! ### Editing a Package
//!
//! ```no_run
//! use simsloca::package::{load_package, save_package};
//!
//! let data = std::fs::read("Strings_ENG_US.package")?;
//! let mut model = load_package(&data)?;
//!
//! for slot in model.tables_mut() {
//!     slot.table.set(0x0000_1001, "Hello");
//! }
//!
//! let saved = save_package(&data, &model)?;
//! std::fs::write("Strings_ENG_US.package", saved)?;
//! # Ok::<(), simsloca::Error>(())
//! ```
//!
//! ### Working with Standalone Tables
//!
//! ```
//! use simsloca::formats::stbl::{LocalizationTable, encode_stbl, parse_stbl_bytes};
//!
//! let mut table = LocalizationTable::new();
//! table.set(0x1001, "Hello");
//!
//! let bytes = encode_stbl(&table)?;
//! let decoded = parse_stbl_bytes(&bytes)?;
//! assert_eq!(decoded.get_text(0x1001), Some("Hello"));
//! # Ok::<(), simsloca::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use simsloca::prelude::*;
//!
//! // Now you have access to:
//! // - PackageFile, ArchiveModel, SaveOptions
//! // - LocalizationTable, TableEntry
//! // - Error, Result, and more
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `simsloca` command-line binary

pub mod error;
pub mod compression;
pub mod formats;
pub mod package;
pub mod utils;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    // Package handling
    pub use crate::package::{
        ArchiveEntry, ArchiveHeader, ArchiveModel, CompressionCodec, EntryFailure, PackageFile,
        ResourceKey, SaveOptions, load_package, save_package, save_package_with,
    };

    // String tables
    pub use crate::formats::stbl::{
        ExportFormat, LocalizationTable, STBL_RESOURCE_TYPE, TableEntry, encode_stbl,
        parse_stbl_bytes, read_stbl, write_stbl,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;

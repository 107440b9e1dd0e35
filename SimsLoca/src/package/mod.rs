//! DBPF 2.1 package reader/writer
//!
//! Loads the header and index of a package, decodes every string table
//! resource, and saves edited tables back by appending re-compressed
//! payloads and patching their index records in place. Everything else in
//! the file is carried over byte for byte.

mod index;
mod model;
mod reader;
mod types;
mod writer;

use std::path::{Path, PathBuf};

pub use model::{ArchiveModel, TableSlot};
pub use reader::{load_package, read_header, read_resource};
pub use types::*;
pub use writer::{save_package, save_package_with};

use crate::error::Result;
use crate::utils::write_atomic;

/// DBPF magic bytes
pub const MAGIC: [u8; 4] = *b"DBPF";

/// Minimum size of a package (the fixed header)
pub const HEADER_SIZE: usize = 96;

/// Supported `(major, minor)` package version
pub const VERSION: (u32, u32) = (2, 1);

/// Supported `(major, minor)` user version
pub const USER_VERSION: (u32, u32) = (0, 0);

/// Bit of the size field announcing a 4-byte codec field
pub const SIZE_COMPRESSED_FLAG: u32 = 0x8000_0000;

pub const CODEC_STORED: u16 = 0x0000;
pub const CODEC_DEFLATE: u16 = 0x5A42;
pub const CODEC_REFPACK_LEGACY: u16 = 0xFFFF;
pub const CODEC_REFPACK_CURRENT: u16 = 0xFFFE;
pub const CODEC_DELETED: u16 = 0xFFE0;

/// Committed value written with rewritten codec fields
pub const COMMITTED: u16 = 1;

/// A package file held in memory together with its decoded model
///
/// # Example
/// ```no_run
/// use simsloca::package::{PackageFile, SaveOptions};
///
/// let mut package = PackageFile::open("Strings_ENG_US.package")?;
/// if let Some(slot) = package.model.tables_mut().next() {
///     slot.table.set(0x1234_5678, "Hello");
/// }
/// package.save("Strings_ENG_US.package", &SaveOptions::default())?;
/// # Ok::<(), simsloca::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct PackageFile {
    path: Option<PathBuf>,
    original: Vec<u8>,
    pub model: ArchiveModel,
}

impl PackageFile {
    /// Read and decode a package from disk
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not a valid package.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let mut package = Self::from_bytes(data)?;
        tracing::info!(
            "Opened {}: {} entries, {} string tables",
            path.display(),
            package.model.entries.len(),
            package.model.table_count()
        );
        package.path = Some(path.to_path_buf());
        Ok(package)
    }

    /// Decode a package already in memory
    ///
    /// # Errors
    /// Returns an error if the buffer is not a valid package.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let model = load_package(&data)?;
        Ok(Self {
            path: None,
            original: data,
            model,
        })
    }

    /// Path the package was opened from
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The unmodified package bytes
    #[must_use]
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Read the decompressed payload of any live entry
    ///
    /// # Errors
    /// Returns an error if the payload cannot be extracted.
    pub fn read_resource(&self, entry: &ArchiveEntry) -> Result<Vec<u8>> {
        read_resource(&self.original, entry)
    }

    /// Produce the saved package bytes
    ///
    /// # Errors
    /// Returns an error if a table cannot be encoded or the index cannot be patched.
    pub fn to_bytes(&self, options: &SaveOptions) -> Result<Vec<u8>> {
        save_package_with(&self.original, &self.model, options)
    }

    /// Save the package to `path`, replacing it atomically.
    ///
    /// After a successful save the in-memory state reloads from the written
    /// bytes, so offsets and modified flags reflect the file on disk.
    ///
    /// # Errors
    /// Returns an error if encoding or writing fails.
    pub fn save<P: AsRef<Path>>(&mut self, path: P, options: &SaveOptions) -> Result<()> {
        let path = path.as_ref();
        let modified = self.model.tables().filter(|s| s.table.is_modified()).count();
        let data = self.to_bytes(options)?;
        write_atomic(path, &data)?;
        tracing::info!(
            "Saved {} ({} modified tables, {} bytes)",
            path.display(),
            modified,
            data.len()
        );

        self.model = load_package(&data)?;
        self.original = data;
        self.path = Some(path.to_path_buf());
        Ok(())
    }
}

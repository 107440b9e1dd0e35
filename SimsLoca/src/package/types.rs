//! Types for DBPF package handling

use std::fmt;

use flate2::Compression;
use serde::Serialize;

use super::{
    CODEC_DEFLATE, CODEC_DELETED, CODEC_REFPACK_CURRENT, CODEC_REFPACK_LEGACY, CODEC_STORED,
};

/// Compression codec of a package entry, resolved from the index codec id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompressionCodec {
    /// Payload stored as-is (`0x0000`, or no codec field present)
    Stored,
    /// Zlib stream (`0x5A42`)
    Deflate,
    /// RefPack (`0xFFFF`)
    RefPackLegacy,
    /// RefPack (`0xFFFE`)
    RefPackCurrent,
    /// Deleted-entry marker (`0xFFE0`); such records are skipped
    Deleted,
    /// Any other id; the payload cannot be decoded
    Unknown(u16),
}

impl CompressionCodec {
    /// Resolve a codec id from the index
    #[must_use]
    pub fn from_id(id: u16) -> Self {
        match id {
            CODEC_STORED => Self::Stored,
            CODEC_DEFLATE => Self::Deflate,
            CODEC_REFPACK_LEGACY => Self::RefPackLegacy,
            CODEC_REFPACK_CURRENT => Self::RefPackCurrent,
            CODEC_DELETED => Self::Deleted,
            other => Self::Unknown(other),
        }
    }

    /// The codec id as written in the index
    #[must_use]
    pub fn id(self) -> u16 {
        match self {
            Self::Stored => CODEC_STORED,
            Self::Deflate => CODEC_DEFLATE,
            Self::RefPackLegacy => CODEC_REFPACK_LEGACY,
            Self::RefPackCurrent => CODEC_REFPACK_CURRENT,
            Self::Deleted => CODEC_DELETED,
            Self::Unknown(id) => id,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stored => "none",
            Self::Deflate => "zlib",
            Self::RefPackLegacy | Self::RefPackCurrent => "refpack",
            Self::Deleted => "deleted",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Index flag word: which key fields are shared by all records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexFlags(pub u32);

impl IndexFlags {
    /// Bit 0: resource type is constant
    pub const CONSTANT_TYPE: u32 = 1 << 0;
    /// Bit 1: group is constant
    pub const CONSTANT_GROUP: u32 = 1 << 1;
    /// Bit 2: high instance word is constant
    pub const CONSTANT_INSTANCE_EX: u32 = 1 << 2;

    #[must_use]
    pub fn constant_type(self) -> bool {
        self.0 & Self::CONSTANT_TYPE != 0
    }

    #[must_use]
    pub fn constant_group(self) -> bool {
        self.0 & Self::CONSTANT_GROUP != 0
    }

    #[must_use]
    pub fn constant_instance_ex(self) -> bool {
        self.0 & Self::CONSTANT_INSTANCE_EX != 0
    }
}

/// Fixed header of a DBPF package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArchiveHeader {
    pub major_version: u32,
    pub minor_version: u32,
    pub user_major: u32,
    pub user_minor: u32,
    /// Creation timestamp (informational)
    pub created: u32,
    /// Modification timestamp (informational)
    pub updated: u32,
    /// Number of index records
    pub index_count: u32,
    /// Absolute offset of the index
    pub index_offset: u64,
    /// Size of the index in bytes
    pub index_size: u32,
}

/// Type/group/instance triple naming a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResourceKey {
    pub resource_type: u32,
    pub group: u32,
    /// `(instance_ex << 32) | instance_low`
    pub instance: u64,
}

impl ResourceKey {
    #[must_use]
    pub fn new(resource_type: u32, group: u32, instance: u64) -> Self {
        Self {
            resource_type,
            group,
            instance,
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}:{:08X}:{:016X}",
            self.resource_type, self.group, self.instance
        )
    }
}

/// One live index record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveEntry {
    pub key: ResourceKey,
    /// Absolute payload offset
    pub offset: u32,
    /// Stored payload size, compression bit masked off
    pub size: u32,
    /// Size after decompression
    pub decompressed_size: u32,
    pub codec: CompressionCodec,
    /// Second half of the codec field (1 when absent)
    pub committed: u16,
    /// Whether the record carries the 4-byte codec field
    pub has_codec_field: bool,
}

/// A decode failure that only affects one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub key: ResourceKey,
    pub reason: String,
}

/// Options for saving a package
///
/// # Example
/// ```
/// use simsloca::package::SaveOptions;
///
/// let options = SaveOptions::new().with_level(9).reencode_all(true);
/// assert!(options.reencode_all);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SaveOptions {
    /// Zlib level for re-compressed tables
    pub level: Compression,
    /// Rewrite every decoded table, not only modified ones
    pub reencode_all: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            level: Compression::default(),
            reencode_all: false,
        }
    }
}

impl SaveOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zlib level (0-9, clamped)
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Compression::new(level.min(9));
        self
    }

    /// Rewrite all tables regardless of their modified flag
    #[must_use]
    pub fn reencode_all(mut self, reencode_all: bool) -> Self {
        self.reencode_all = reencode_all;
        self
    }
}

//! Error types for `SimsLoca`

use thiserror::Error;

/// The error type for `SimsLoca` operations.
///
/// Everything the codecs can reject is a format error of some kind; the
/// variants are grouped by the layer that raises them. Package-level
/// variants returned from [`load_package`](crate::package::load_package)
/// abort the whole load, while per-entry problems are recorded on the
/// model instead (see [`EntryFailure`](crate::package::EntryFailure)).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Atomic file replacement failed.
    #[error("failed to persist {path}: {message}")]
    PersistFailed {
        /// The destination path.
        path: String,
        /// The underlying error message.
        message: String,
    },

    /// Unexpected end of data while reading a fixed-size field.
    #[error("unexpected end of data")]
    UnexpectedEof,

    /// A buffer is shorter than the fixed header of its format.
    #[error("buffer too short: need at least {expected} bytes, found {actual}")]
    TooShort {
        /// Minimum number of bytes required.
        expected: usize,
        /// Number of bytes available.
        actual: usize,
    },

    // ==================== Package (DBPF) Errors ====================
    /// The buffer is not a DBPF package.
    #[error("invalid package magic: expected DBPF, found {0:?}")]
    InvalidPackageMagic([u8; 4]),

    /// The package format version is not 2.1.
    #[error("unsupported package version: {major}.{minor} (supported: 2.1)")]
    UnsupportedPackageVersion {
        /// Major version field.
        major: u32,
        /// Minor version field.
        minor: u32,
    },

    /// The package user version is not 0.0.
    #[error("unsupported package user version: {major}.{minor} (supported: 0.0)")]
    UnsupportedUserVersion {
        /// User major version field.
        major: u32,
        /// User minor version field.
        minor: u32,
    },

    /// The header announces entries but has no index offset.
    #[error("package declares {count} entries but has no index")]
    MissingIndex {
        /// Declared entry count.
        count: u32,
    },

    /// The index extends past the end of the buffer.
    #[error("index truncated at byte {position} (buffer is {len} bytes)")]
    IndexTruncated {
        /// Position at which the read failed.
        position: usize,
        /// Total buffer length.
        len: usize,
    },

    /// An entry's payload range lies outside the buffer.
    #[error("payload out of bounds: offset {offset} + size {size} exceeds {len} bytes")]
    PayloadOutOfBounds {
        /// Payload offset.
        offset: u32,
        /// Payload size.
        size: u32,
        /// Total buffer length.
        len: usize,
    },

    /// An entry uses a compression codec id this crate cannot decode.
    #[error("unknown compression codec: {0:#06X}")]
    UnknownCompression(u16),

    /// Two localization-table entries share an instance id.
    #[error("duplicate string table instance {0:#018X}")]
    DuplicateInstance(u64),

    /// The package grew past what a 32-bit offset field can address.
    #[error("appended payload offset {offset} does not fit the 32-bit offset field")]
    OffsetOverflow {
        /// The offset that overflowed.
        offset: usize,
    },

    /// The second index walk did not meet every record scheduled for rewrite.
    #[error("index rewrite mismatch: {missing} updated record(s) not found in index")]
    IndexRewriteMismatch {
        /// Number of scheduled updates the walk never reached.
        missing: usize,
    },

    // ==================== STBL Format Errors ====================
    /// The buffer is not an STBL string table.
    #[error("invalid STBL magic: expected STBL, found {0:?}")]
    InvalidStblMagic([u8; 4]),

    /// The STBL version is not supported.
    #[error("unsupported STBL version: {0} (supported: 5)")]
    UnsupportedStblVersion(u16),

    /// A string is too long for the 16-bit length field.
    #[error("string {key:#010X} is {len} bytes, longer than the 65535 byte limit")]
    StringTooLong {
        /// Key of the offending entry.
        key: u32,
        /// Encoded length in bytes.
        len: usize,
    },

    // ==================== Compression Errors ====================
    /// The RefPack stream does not start with the 0xFB signature.
    #[error("invalid RefPack signature: expected 0xFB, found {0:#04X}")]
    InvalidRefPackSignature(u8),

    /// A RefPack opcode would write past the declared output size.
    #[error("RefPack output overflow: {needed} bytes needed, output is {size} bytes")]
    RefPackOverflow {
        /// Output size the write would require.
        needed: usize,
        /// Declared decompressed size.
        size: usize,
    },

    /// A RefPack back-reference points before the start of the output.
    #[error("RefPack back-reference distance {distance} at output position {position}")]
    RefPackBadReference {
        /// Copy distance (already including the implicit +1).
        distance: usize,
        /// Output cursor when the copy started.
        position: usize,
    },

    /// Zlib decompression failed.
    #[error("Zlib decompression failed: {message}")]
    ZlibDecompressionFailed {
        /// The error message.
        message: String,
    },

    // ==================== Translation Errors ====================
    /// A string key could not be parsed.
    #[error("invalid string key: {0}")]
    InvalidKey(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for `SimsLoca` operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Error Taxonomy untuk SDP codec
//!
//! Semua operasi decode gagal cepat (fail-fast) dengan error bertipe
//! yang membawa konteks: offset, bytes yang dibutuhkan vs tersedia,
//! atau limit vs nilai aktual.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result type untuk seluruh codec
pub type Result<T> = std::result::Result<T, WireError>;

/// Sanity bound yang dilanggar oleh length/count prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    StringLength,
    ArrayCount,
    TotalElements,
    MessageSize,
    /// Jumlah schema dalam satu `Registry` (type id adalah `u16`)
    TypeIds,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Limit::StringLength => "string length",
            Limit::ArrayCount => "array count",
            Limit::TotalElements => "total element",
            Limit::MessageSize => "message size",
            Limit::TypeIds => "registered type id",
        };
        f.write_str(name)
    }
}

/// Error dari wire codec
#[derive(Debug, Error)]
pub enum WireError {
    /// Read akan melewati panjang buffer yang dideklarasikan
    #[error("truncated buffer at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Output buffer milik caller terlalu kecil untuk hasil encode
    #[error("output buffer too small at offset {offset}: need {needed} bytes, {available} available")]
    BufferTooSmall {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Length/count prefix melebihi sanity bound
    #[error("{what} limit exceeded: {actual} > {limit}")]
    LimitExceeded {
        what: Limit,
        limit: usize,
        actual: usize,
    },

    #[error("bad magic {found:02x?}, expected \"SDP\"")]
    BadMagic { found: [u8; 3] },

    #[error("unsupported protocol version {found:#04x}")]
    UnsupportedVersion { found: u8 },

    #[error("unknown message type id {type_id}")]
    UnknownTypeId { type_id: u16 },

    /// Arena decode kehabisan kapasitas
    #[error("arena exhausted: requested {requested} bytes, {remaining} remaining")]
    AllocationFailure { requested: usize, remaining: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("value does not match schema at `{path}`: expected {expected}")]
    SchemaMismatch { path: String, expected: String },

    /// Payload tidak dikonsumsi tepat sesuai panjang yang dideklarasikan
    #[error("payload length mismatch: {declared} bytes declared, {consumed} consumed")]
    PayloadLengthMismatch { declared: usize, consumed: usize },

    #[error("unknown schema `{name}`")]
    UnknownSchema { name: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Kategori error tanpa konteks, untuk matching di caller dan test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    TruncatedBuffer,
    BufferTooSmall,
    LimitExceeded,
    BadMagic,
    UnsupportedVersion,
    UnknownTypeId,
    AllocationFailure,
    InvalidUtf8,
    SchemaMismatch,
    PayloadLengthMismatch,
    UnknownSchema,
    Io,
}

impl WireError {
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            WireError::TruncatedBuffer { .. } => ErrorKind::TruncatedBuffer,
            WireError::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            WireError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            WireError::BadMagic { .. } => ErrorKind::BadMagic,
            WireError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            WireError::UnknownTypeId { .. } => ErrorKind::UnknownTypeId,
            WireError::AllocationFailure { .. } => ErrorKind::AllocationFailure,
            WireError::InvalidUtf8 { .. } => ErrorKind::InvalidUtf8,
            WireError::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            WireError::PayloadLengthMismatch { .. } => ErrorKind::PayloadLengthMismatch,
            WireError::UnknownSchema { .. } => ErrorKind::UnknownSchema,
            WireError::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn limit(what: Limit, limit: usize, actual: usize) -> Self {
        WireError::LimitExceeded {
            what,
            limit,
            actual,
        }
    }
}

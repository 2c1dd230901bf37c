//! Error types for packed integer sequences.

use thiserror::Error;

use crate::format::Variant;

/// Error variants for packing, unpacking and random access.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The first header word is not the container magic.
    #[error("bad magic: {0:#010x}")]
    BadMagic(u32),

    /// The header carries a format version this crate cannot read.
    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u32),

    /// The header carries a variant tag that names no known codec.
    #[error("unknown variant tag: {0}")]
    UnknownVariant(u32),

    /// The representation was produced by a different codec than the one decoding it.
    #[error("variant mismatch: expected {expected}, found {found}")]
    VariantMismatch {
        /// Variant of the decoder that was invoked.
        expected: Variant,
        /// Variant recorded in the header.
        found: Variant,
    },

    /// The words are structurally inconsistent with their header.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// An index was provided that is out of the sequence's bounds.
    #[error("index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// A configuration value could not be understood.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The input cannot be described by one-word header fields.
    #[error("sequence too long to pack: {0} elements")]
    TooLong(usize),
}

/// A specialized Result type for packing operations.
pub type Result<T> = std::result::Result<T, Error>;

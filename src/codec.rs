//! Codec selection and variant-agnostic access.
//!
//! Encoding goes through a [`Codec`]: stateless, so one instance can serve
//! any number of threads. Each call returns a fresh, immutable [`Packed`]
//! value, and reads take that value explicitly.
//!
//! Decoding from words needs no codec at all: [`decode_words`] reads the
//! header tag and matches on it. [`Codec::decode_words`] is the strict form
//! that refuses representations produced by a different codec.

use crate::aligned::AlignedVec;
use crate::config::{OverflowConfig, PackConfig};
use crate::error::{Error, Result};
use crate::format::{self, Variant};
use crate::layout::Layout;
use crate::overflow::OverflowVec;
use crate::overlap::OverlapVec;

/// A packed representation produced by any of the three codecs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packed {
    /// Back-to-back fields.
    Overlap(OverlapVec),
    /// Word-aligned lanes.
    Aligned(AlignedVec),
    /// Narrow fields plus overflow table.
    Overflow(OverflowVec),
}

impl Packed {
    /// The codec that produced this representation.
    pub fn variant(&self) -> Variant {
        match self {
            Packed::Overlap(_) => Variant::Overlap,
            Packed::Aligned(_) => Variant::Aligned,
            Packed::Overflow(_) => Variant::Overflow,
        }
    }

    /// Return the number of elements.
    pub fn len(&self) -> usize {
        match self {
            Packed::Overlap(p) => p.len(),
            Packed::Aligned(p) => p.len(),
            Packed::Overflow(p) => p.len(),
        }
    }

    /// Return true if the sequence has 0 elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bits per payload field.
    pub fn width(&self) -> u32 {
        match self {
            Packed::Overlap(p) => p.width(),
            Packed::Aligned(p) => p.width(),
            Packed::Overflow(p) => p.width(),
        }
    }

    /// Return the value at index `i`.
    pub fn get(&self, i: usize) -> Result<u32> {
        match self {
            Packed::Overlap(p) => p.get(i),
            Packed::Aligned(p) => p.get(i),
            Packed::Overflow(p) => p.get(i),
        }
    }

    /// Unpack every value.
    pub fn decode(&self) -> Vec<u32> {
        match self {
            Packed::Overlap(p) => p.decode(),
            Packed::Aligned(p) => p.decode(),
            Packed::Overflow(p) => p.decode(),
        }
    }

    /// Word accounting for this representation.
    pub fn layout(&self) -> Layout {
        match self {
            Packed::Overlap(p) => p.layout(),
            Packed::Aligned(p) => p.layout(),
            Packed::Overflow(p) => p.layout(),
        }
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        match self {
            Packed::Overlap(p) => p.heap_bytes(),
            Packed::Aligned(p) => p.heap_bytes(),
            Packed::Overflow(p) => p.heap_bytes(),
        }
    }

    /// Serialize header and payload.
    pub fn to_words(&self) -> Vec<u32> {
        match self {
            Packed::Overlap(p) => p.to_words(),
            Packed::Aligned(p) => p.to_words(),
            Packed::Overflow(p) => p.to_words(),
        }
    }

    /// Parse any representation, dispatching on its variant tag.
    pub fn from_words(words: &[u32]) -> Result<Self> {
        match format::peek_variant(words)? {
            Variant::Overlap => OverlapVec::from_words(words).map(Packed::Overlap),
            Variant::Aligned => AlignedVec::from_words(words).map(Packed::Aligned),
            Variant::Overflow => OverflowVec::from_words(words).map(Packed::Overflow),
        }
    }

    /// Serialize to little-endian bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        format::words_to_bytes(&self.to_words())
    }

    /// Parse `to_bytes()` output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_words(&format::bytes_to_words(bytes)?)
    }
}

impl From<OverlapVec> for Packed {
    fn from(p: OverlapVec) -> Self {
        Packed::Overlap(p)
    }
}

impl From<AlignedVec> for Packed {
    fn from(p: AlignedVec) -> Self {
        Packed::Aligned(p)
    }
}

impl From<OverflowVec> for Packed {
    fn from(p: OverflowVec) -> Self {
        Packed::Overflow(p)
    }
}

/// Common interface of the three codecs.
pub trait Codec {
    /// The variant this codec writes and accepts.
    fn variant(&self) -> Variant;

    /// Pack `values` into a fresh representation.
    fn encode(&self, values: &[u32]) -> Result<Packed>;

    /// Parse and unpack a representation produced by this codec.
    ///
    /// The header is validated before any payload word is read; a tag
    /// naming another codec is an error.
    fn decode_words(&self, words: &[u32]) -> Result<Vec<u32>> {
        let expected = self.variant();
        let found = format::peek_variant(words)?;
        if found != expected {
            return Err(Error::VariantMismatch { expected, found });
        }
        Ok(Packed::from_words(words)?.decode())
    }
}

/// Codec for [`Variant::Overlap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapCodec;

impl Codec for OverlapCodec {
    fn variant(&self) -> Variant {
        Variant::Overlap
    }

    fn encode(&self, values: &[u32]) -> Result<Packed> {
        OverlapVec::new(values).map(Packed::Overlap)
    }
}

/// Codec for [`Variant::Aligned`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AlignedCodec;

impl Codec for AlignedCodec {
    fn variant(&self) -> Variant {
        Variant::Aligned
    }

    fn encode(&self, values: &[u32]) -> Result<Packed> {
        AlignedVec::new(values).map(Packed::Aligned)
    }
}

/// Codec for [`Variant::Overflow`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OverflowCodec {
    /// Threshold and table policies.
    pub config: OverflowConfig,
}

impl OverflowCodec {
    /// Codec using `config`.
    pub fn new(config: OverflowConfig) -> Self {
        Self { config }
    }
}

impl Codec for OverflowCodec {
    fn variant(&self) -> Variant {
        Variant::Overflow
    }

    fn encode(&self, values: &[u32]) -> Result<Packed> {
        OverflowVec::new(values, &self.config).map(Packed::Overflow)
    }
}

/// Any of the three codecs, selected at runtime.
#[derive(Debug, Clone, Copy)]
pub enum AnyCodec {
    /// See [`OverlapCodec`].
    Overlap(OverlapCodec),
    /// See [`AlignedCodec`].
    Aligned(AlignedCodec),
    /// See [`OverflowCodec`].
    Overflow(OverflowCodec),
}

impl AnyCodec {
    /// Construct the codec for `variant`. `overflow` is used only by
    /// [`Variant::Overflow`].
    pub fn new(variant: Variant, overflow: OverflowConfig) -> Self {
        match variant {
            Variant::Overlap => AnyCodec::Overlap(OverlapCodec),
            Variant::Aligned => AnyCodec::Aligned(AlignedCodec),
            Variant::Overflow => AnyCodec::Overflow(OverflowCodec::new(overflow)),
        }
    }

    /// Construct the codec named by `config.variant`.
    pub fn from_config(config: &PackConfig) -> Self {
        Self::new(config.variant, config.overflow)
    }
}

impl Default for AnyCodec {
    fn default() -> Self {
        Self::from_config(&PackConfig::default())
    }
}

impl Codec for AnyCodec {
    fn variant(&self) -> Variant {
        match self {
            AnyCodec::Overlap(c) => c.variant(),
            AnyCodec::Aligned(c) => c.variant(),
            AnyCodec::Overflow(c) => c.variant(),
        }
    }

    fn encode(&self, values: &[u32]) -> Result<Packed> {
        match self {
            AnyCodec::Overlap(c) => c.encode(values),
            AnyCodec::Aligned(c) => c.encode(values),
            AnyCodec::Overflow(c) => c.encode(values),
        }
    }
}

/// Pack `values` as configured.
pub fn encode(values: &[u32], config: &PackConfig) -> Result<Packed> {
    AnyCodec::from_config(config).encode(values)
}

/// Unpack a representation of any variant, choosing the decoder from its tag.
pub fn decode_words(words: &[u32]) -> Result<Vec<u32>> {
    Ok(Packed::from_words(words)?.decode())
}

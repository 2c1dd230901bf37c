//! Self-describing container format.
//!
//! Every packed sequence is a flat run of `u32` words:
//!
//! ```text
//! word 0   magic            0x42505431 ("BPT1")
//! word 1   format version   1
//! word 2   variant tag      1 = overlap, 2 = aligned, 3 = overflow
//! word 3   element count
//! word 4.. variant parameters
//!            overlap / aligned: field width
//!            overflow:          field width, threshold bits, index bits, table length,
//!                               then `table length` raw table values
//! ...      payload words
//! ```
//!
//! Decoding checks magic, version and tag before looking at anything else.
//! There is no checksum: a payload that was altered after the header is not
//! detected unless it breaks a structural rule.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Container magic, `"BPT1"` read as a big-endian `u32`.
pub const MAGIC: u32 = 0x4250_5431;

/// The only format version this crate reads and writes.
pub const VERSION: u32 = 1;

/// Words shared by every header: magic, version, tag, length.
pub const BASE_HEADER_WORDS: usize = 4;

/// Identifies which codec produced a representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Variant {
    /// Fields packed back to back; a field may straddle two words.
    #[default]
    Overlap,
    /// Fields packed in word-aligned lanes; nothing straddles.
    Aligned,
    /// Compact fields with an indicator bit and an outlier side table.
    Overflow,
}

impl Variant {
    /// Every variant, in tag order.
    pub const ALL: [Variant; 3] = [Variant::Overlap, Variant::Aligned, Variant::Overflow];

    /// Tag written into header word 2.
    pub fn tag(self) -> u32 {
        match self {
            Variant::Overlap => 1,
            Variant::Aligned => 2,
            Variant::Overflow => 3,
        }
    }

    /// Inverse of [`Variant::tag`].
    pub fn from_tag(tag: u32) -> Result<Self> {
        match tag {
            1 => Ok(Variant::Overlap),
            2 => Ok(Variant::Aligned),
            3 => Ok(Variant::Overflow),
            other => Err(Error::UnknownVariant(other)),
        }
    }

    /// Fixed header size in words, excluding the overflow table.
    pub fn header_words(self) -> usize {
        match self {
            Variant::Overlap | Variant::Aligned => BASE_HEADER_WORDS + 1,
            Variant::Overflow => BASE_HEADER_WORDS + 4,
        }
    }

    /// Lowercase name used in logs and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Overlap => "overlap",
            Variant::Aligned => "aligned",
            Variant::Overflow => "overflow",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overlap" => Ok(Variant::Overlap),
            "aligned" | "non-overlap" | "nonoverlap" => Ok(Variant::Aligned),
            "overflow" => Ok(Variant::Overflow),
            _ => Err(Error::InvalidConfig(format!("unknown variant name: {s}"))),
        }
    }
}

/// Start a header for `variant` holding `len` elements.
///
/// `len` must already have been checked with [`checked_len`].
pub(crate) fn begin(variant: Variant, len: u32, capacity: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(capacity);
    out.extend_from_slice(&[MAGIC, VERSION, variant.tag(), len]);
    out
}

/// Element count as a header word.
pub(crate) fn checked_len(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::TooLong(n))
}

/// Read the variant tag of a representation after validating magic and version.
pub fn peek_variant(words: &[u32]) -> Result<Variant> {
    Ok(open(words)?.0)
}

/// Validate the common header and return the variant, the element count and
/// a reader positioned on the first variant parameter.
pub(crate) fn open(words: &[u32]) -> Result<(Variant, usize, Reader<'_>)> {
    let mut r = Reader::new(words);
    let magic = r.word()?;
    if magic != MAGIC {
        tracing::debug!(magic, "rejecting representation: bad magic");
        return Err(Error::BadMagic(magic));
    }
    let version = r.word()?;
    if version != VERSION {
        tracing::debug!(version, "rejecting representation: unsupported version");
        return Err(Error::UnsupportedVersion(version));
    }
    let variant = Variant::from_tag(r.word()?).inspect_err(|e| {
        tracing::debug!(error = %e, "rejecting representation: unknown variant");
    })?;
    let len = r.word()? as usize;
    Ok((variant, len, r))
}

/// [`open`], then require the tag to name `expected`.
pub(crate) fn open_as(words: &[u32], expected: Variant) -> Result<(usize, Reader<'_>)> {
    let (found, len, r) = open(words)?;
    if found != expected {
        tracing::debug!(%expected, %found, "rejecting representation: variant mismatch");
        return Err(Error::VariantMismatch { expected, found });
    }
    Ok((len, r))
}

/// Sequential cursor over header and payload words.
pub(crate) struct Reader<'a> {
    words: &'a [u32],
    off: usize,
}

impl<'a> Reader<'a> {
    fn new(words: &'a [u32]) -> Self {
        Self { words, off: 0 }
    }

    /// Next `n` words, or an error if fewer remain.
    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u32]> {
        let end = self
            .off
            .checked_add(n)
            .filter(|&end| end <= self.words.len())
            .ok_or_else(|| Error::InvalidEncoding("unexpected end of input".to_string()))?;
        let slice = &self.words[self.off..end];
        self.off = end;
        Ok(slice)
    }

    pub(crate) fn word(&mut self) -> Result<u32> {
        Ok(self.take(1)?[0])
    }

    /// Fail if any words remain unread.
    pub(crate) fn finish(self, what: &str) -> Result<()> {
        if self.off != self.words.len() {
            return Err(Error::InvalidEncoding(format!(
                "{} trailing words after {what}",
                self.words.len() - self.off
            )));
        }
        Ok(())
    }
}

/// Check that a field width lies in `1..=32`.
pub(crate) fn check_width(width: u32) -> Result<u32> {
    if width == 0 || width > crate::bits::WORD_BITS {
        return Err(Error::InvalidEncoding(format!(
            "field width {width} outside 1..=32"
        )));
    }
    Ok(width)
}

/// Serialize words to little-endian bytes.
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(words.len() * 4);
    for &w in words {
        out.extend_from_slice(&w.to_le_bytes());
    }
    out
}

/// Parse little-endian bytes produced by [`words_to_bytes`].
pub fn bytes_to_words(bytes: &[u8]) -> Result<Vec<u32>> {
    if !bytes.len().is_multiple_of(4) {
        return Err(Error::InvalidEncoding(format!(
            "byte length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

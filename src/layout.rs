//! Size accounting for packed representations.
//!
//! Packing pays a fixed cost (header, and for the overflow variant the side
//! table) against a per-element saving of `32 - width` bits. Below the
//! break-even length the raw `u32` array is smaller.

use crate::bits::WORD_BITS;
use crate::format::Variant;

/// Word counts of one packed representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Codec that produced the representation.
    pub variant: Variant,
    /// Number of encoded elements.
    pub len: usize,
    /// Fixed header words.
    pub header_words: usize,
    /// Overflow table words (0 for other variants).
    pub table_words: usize,
    /// Packed field words.
    pub payload_words: usize,
    /// Bits spent per element in the payload.
    pub field_width: u32,
}

impl Layout {
    /// Total words of the serialized representation.
    pub fn total_words(&self) -> usize {
        self.header_words + self.table_words + self.payload_words
    }

    /// Packed size divided by raw size. `None` for an empty sequence.
    pub fn ratio(&self) -> Option<f64> {
        (self.len > 0).then(|| self.total_words() as f64 / self.len as f64)
    }

    /// Fraction of the representation spent on the header.
    pub fn header_cost(&self) -> f64 {
        self.header_words as f64 / self.total_words() as f64
    }

    /// True if the representation is smaller than the raw `u32` array.
    pub fn saves_space(&self) -> bool {
        self.total_words() < self.len
    }

    /// Approximate element count above which packing beats raw storage,
    /// for the same field width and fixed overhead.
    ///
    /// `None` when the field is a full word and packing never pays off.
    pub fn break_even_len(&self) -> Option<f64> {
        if self.field_width >= WORD_BITS {
            return None;
        }
        let fixed = (self.header_words + self.table_words) as f64;
        Some(fixed / (1.0 - self.field_width as f64 / WORD_BITS as f64))
    }
}

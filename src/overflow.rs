//! Bit packing with an outlier side table.
//!
//! A few large values force a wide field on every element in the plain
//! codecs. Here each element gets a narrow field instead:
//!
//! ```text
//!  field = [ indicator | content ]
//!            1 bit       c = max(threshold_bits, index_bits) bits
//! ```
//!
//! - indicator 0: `content` is the value itself (`value < 2^threshold_bits`).
//! - indicator 1: `content` is an index into the overflow table, which holds
//!   the raw value.
//!
//! Fields are laid back to back exactly like [`crate::overlap`], so `get(i)`
//! is still $O(1)$: one stream read plus at most one table lookup.
//!
//! The table is built in scan order. [`TablePolicy::EveryOccurrence`] gives
//! every outlier occurrence its own slot; [`TablePolicy::Dedup`] maps each
//! distinct outlier to one slot through a hash map, so the scan stays linear.

use std::collections::HashMap;

use crate::bits::{self, WORD_BITS};
use crate::config::{OverflowConfig, TablePolicy, ThresholdPolicy};
use crate::error::{Error, Result};
use crate::format::{self, Variant};
use crate::layout::Layout;
use crate::width::{bit_length, bits_for};

/// Largest threshold a 32-bit field can carry next to its indicator.
const MAX_CONTENT_BITS: u32 = WORD_BITS - 1;

/// A `u32` sequence packed with narrow fields and an overflow table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowVec {
    words: Vec<u32>,
    table: Vec<u32>,
    threshold_bits: u32,
    index_bits: u32,
    n: usize,
}

impl OverflowVec {
    /// Pack `values`, escaping those at or above the chosen threshold.
    ///
    /// Fails if `values` is longer than `u32::MAX` or the table would need
    /// more than 31 index bits.
    pub fn new(values: &[u32], config: &OverflowConfig) -> Result<Self> {
        let n = values.len();
        format::checked_len(n)?;
        let threshold_bits = choose_threshold(values, config.threshold);
        let limit = 1u64 << threshold_bits;

        // Table slot of every outlier, in scan order.
        let mut refs = Vec::new();
        let mut table = Vec::new();
        let mut slots: HashMap<u32, u32> = HashMap::new();
        for &v in values {
            if u64::from(v) < limit {
                continue;
            }
            let slot = match config.table {
                TablePolicy::EveryOccurrence => {
                    table.push(v);
                    (table.len() - 1) as u32
                }
                TablePolicy::Dedup => *slots.entry(v).or_insert_with(|| {
                    table.push(v);
                    (table.len() - 1) as u32
                }),
            };
            refs.push(slot);
        }
        tracing::trace!(
            outliers = refs.len(),
            table_len = table.len(),
            "built overflow table"
        );

        let index_bits = bit_length(table.len().saturating_sub(1) as u32);
        let content_bits = threshold_bits.max(index_bits);
        if content_bits > MAX_CONTENT_BITS {
            return Err(Error::TooLong(n));
        }
        let width = content_bits + 1;
        let indicator = 1u32 << content_bits;

        let mut words = vec![0u32; bits::stream_words(n, width)];
        let mut next_ref = 0usize;
        let mut bit_offset = 0usize;
        for &v in values {
            let field = if u64::from(v) < limit {
                v
            } else {
                next_ref += 1;
                indicator | refs[next_ref - 1]
            };
            bits::write_field(&mut words, bit_offset, width, field);
            bit_offset += width as usize;
        }

        tracing::debug!(
            variant = %Variant::Overflow,
            len = n,
            width,
            threshold_bits,
            index_bits,
            table_len = table.len(),
            payload_words = words.len(),
            "packed sequence"
        );

        Ok(Self {
            words,
            table,
            threshold_bits,
            index_bits,
            n,
        })
    }

    /// Return the number of elements.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Return true if the sequence has 0 elements.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Bits per field: indicator plus content.
    pub fn width(&self) -> u32 {
        self.content_bits() + 1
    }

    /// Inline values are strictly below `2^threshold_bits`.
    pub fn threshold_bits(&self) -> u32 {
        self.threshold_bits
    }

    /// Bits needed to address every table slot.
    pub fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Bits below the indicator.
    pub fn content_bits(&self) -> u32 {
        self.threshold_bits.max(self.index_bits)
    }

    /// The overflow table, in slot order.
    pub fn table(&self) -> &[u32] {
        &self.table
    }

    /// Packed payload words, without header or table.
    pub fn payload(&self) -> &[u32] {
        &self.words
    }

    #[inline]
    fn field(&self, i: usize) -> u32 {
        let width = self.width();
        bits::read_field(&self.words, i * width as usize, width)
    }

    #[inline]
    fn resolve(&self, field: u32) -> u32 {
        let content_bits = self.content_bits();
        let content = field & bits::mask(content_bits);
        if field >> content_bits != 0 {
            self.table[content as usize]
        } else {
            content
        }
    }

    /// Return true if element `i` is stored in the overflow table.
    pub fn is_overflow(&self, i: usize) -> Result<bool> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }
        Ok(self.field(i) >> self.content_bits() != 0)
    }

    /// Return the value at index `i`.
    pub fn get(&self, i: usize) -> Result<u32> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }
        Ok(self.resolve(self.field(i)))
    }

    /// Iterate over all values in order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.n).map(move |i| self.resolve(self.field(i)))
    }

    /// Unpack every value.
    pub fn decode(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Word accounting for this representation.
    pub fn layout(&self) -> Layout {
        Layout {
            variant: Variant::Overflow,
            len: self.n,
            header_words: Variant::Overflow.header_words(),
            table_words: self.table.len(),
            payload_words: self.words.len(),
            field_width: self.width(),
        }
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        (self.words.capacity() + self.table.capacity()) * 4
    }

    /// Serialize as header, overflow table, then payload.
    pub fn to_words(&self) -> Vec<u32> {
        let mut out = format::begin(
            Variant::Overflow,
            self.n as u32,
            Variant::Overflow.header_words() + self.table.len() + self.words.len(),
        );
        out.extend_from_slice(&[
            self.width(),
            self.threshold_bits,
            self.index_bits,
            self.table.len() as u32,
        ]);
        out.extend_from_slice(&self.table);
        out.extend_from_slice(&self.words);
        out
    }

    /// Parse `to_words()` output.
    ///
    /// Every parameter must agree with the others, and every field must be
    /// a valid inline value or a reference into the table.
    pub fn from_words(words: &[u32]) -> Result<Self> {
        let (n, mut r) = format::open_as(words, Variant::Overflow)?;
        let width = format::check_width(r.word()?)?;
        let threshold_bits = r.word()?;
        let index_bits = r.word()?;
        let table_len = r.word()? as usize;

        if threshold_bits == 0 || threshold_bits > MAX_CONTENT_BITS {
            return Err(Error::InvalidEncoding(format!(
                "threshold bits {threshold_bits} outside 1..=31"
            )));
        }
        if table_len > n {
            return Err(Error::InvalidEncoding(format!(
                "overflow table ({table_len}) longer than sequence ({n})"
            )));
        }
        if index_bits != bit_length(table_len.saturating_sub(1) as u32) {
            return Err(Error::InvalidEncoding(format!(
                "index bits {index_bits} do not match table length {table_len}"
            )));
        }
        if width != threshold_bits.max(index_bits) + 1 {
            return Err(Error::InvalidEncoding(format!(
                "field width {width} != 1 + max({threshold_bits}, {index_bits})"
            )));
        }

        let table = r.take(table_len)?;
        let payload = r.take(bits::stream_words(n, width))?;
        r.finish("OverflowVec")?;

        let limit = 1u64 << threshold_bits;
        if table.iter().any(|&v| u64::from(v) < limit) {
            return Err(Error::InvalidEncoding(
                "overflow table holds an inline-sized value".to_string(),
            ));
        }

        let packed = Self {
            words: payload.to_vec(),
            table: table.to_vec(),
            threshold_bits,
            index_bits,
            n,
        };
        packed.validate_fields(limit)?;
        Ok(packed)
    }

    fn validate_fields(&self, limit: u64) -> Result<()> {
        let content_bits = self.content_bits();
        for i in 0..self.n {
            let field = self.field(i);
            let content = field & bits::mask(content_bits);
            let escaped = field >> content_bits != 0;
            if escaped && content as usize >= self.table.len() {
                return Err(Error::InvalidEncoding(format!(
                    "element {i} references slot {content} of a {}-slot table",
                    self.table.len()
                )));
            }
            if !escaped && u64::from(content) >= limit {
                return Err(Error::InvalidEncoding(format!(
                    "element {i} stores {content} inline above the threshold"
                )));
            }
        }

        let used = (self.n * self.width() as usize) % WORD_BITS as usize;
        if used != 0 && self.words[self.words.len() - 1] >> used != 0 {
            return Err(Error::InvalidEncoding(
                "nonzero bits after last field".to_string(),
            ));
        }
        Ok(())
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

/// Inline threshold, in bits, for `values` under `policy`. Always in `1..=31`.
pub fn choose_threshold(values: &[u32], policy: ThresholdPolicy) -> u32 {
    match policy {
        ThresholdPolicy::HalfMax => {
            let max = values.iter().copied().max().unwrap_or(0);
            bits_for(max / 2)
        }
        ThresholdPolicy::Fixed(bits) => bits.clamp(1, MAX_CONTENT_BITS),
        ThresholdPolicy::MinimizeWords => minimize_words(values),
    }
}

/// Threshold minimising payload plus table words, assuming one slot per outlier.
///
/// Ties go to the larger threshold, which keeps the table smaller.
fn minimize_words(values: &[u32]) -> u32 {
    if values.is_empty() {
        return 1;
    }
    let mut counts = [0usize; WORD_BITS as usize + 1];
    for &v in values {
        counts[bit_length(v) as usize] += 1;
    }

    let mut best = (usize::MAX, MAX_CONTENT_BITS);
    let mut outliers = counts[WORD_BITS as usize];
    for t in (1..=MAX_CONTENT_BITS).rev() {
        let index_bits = bit_length(outliers.saturating_sub(1) as u32);
        let content_bits = t.max(index_bits);
        if content_bits <= MAX_CONTENT_BITS {
            let cost = bits::stream_words(values.len(), content_bits + 1) + outliers;
            if cost < best.0 {
                best = (cost, t);
            }
        }
        // Values needing exactly `t` bits are outliers below this threshold.
        outliers += counts[t as usize];
    }
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(values: &[u32]) -> OverflowVec {
        OverflowVec::new(values, &OverflowConfig::default()).unwrap()
    }

    #[test]
    fn test_overflow_sample() {
        let values = [5, 12, 31, 7, 15, 1023, 2000, 999_999];
        let ov = pack(&values);
        // max / 2 = 499_999 needs 19 bits; only 999_999 reaches 2^19.
        assert_eq!(ov.threshold_bits(), 19);
        assert_eq!(ov.table(), &[999_999]);
        assert_eq!(ov.index_bits(), 0);
        assert_eq!(ov.width(), 20);
        assert_eq!(ov.payload().len(), 5);

        for i in 0..values.len() {
            assert_eq!(ov.is_overflow(i).unwrap(), i == 7);
            let raw = bits::read_field(ov.payload(), i * 20, 20);
            assert_eq!(raw >> 19, u32::from(i == 7));
        }
        assert_eq!(ov.decode(), values);
        assert!(ov.get(8).is_err());
    }

    #[test]
    fn test_overflow_duplicates() {
        let values = [1, 100, 100, 2];
        let every = pack(&values);
        assert_eq!(every.threshold_bits(), 6);
        assert_eq!(every.table(), &[100, 100]);
        assert_eq!(every.index_bits(), 1);
        assert_eq!(every.width(), 7);
        assert_eq!(every.decode(), values);

        let dedup = OverflowVec::new(
            &values,
            &OverflowConfig::default().with_table(TablePolicy::Dedup),
        )
        .unwrap();
        assert_eq!(dedup.table(), &[100]);
        assert_eq!(dedup.index_bits(), 0);
        assert_eq!(dedup.decode(), values);
    }

    #[test]
    fn test_overflow_zeros_and_empty() {
        let zeros = pack(&[0; 10]);
        assert_eq!(zeros.threshold_bits(), 1);
        assert!(zeros.table().is_empty());
        assert_eq!(zeros.width(), 2);
        assert_eq!(zeros.decode(), vec![0; 10]);

        let empty = pack(&[]);
        assert!(empty.is_empty());
        assert!(empty.payload().is_empty());
        assert_eq!(OverflowVec::from_words(&empty.to_words()).unwrap(), empty);
    }

    #[test]
    fn test_overflow_index_wider_than_threshold() {
        let values: Vec<u32> = (0..20).collect();
        let ov = OverflowVec::new(
            &values,
            &OverflowConfig::default().with_threshold(ThresholdPolicy::Fixed(1)),
        )
        .unwrap();
        assert_eq!(ov.table().len(), 18);
        assert_eq!(ov.index_bits(), 5);
        assert_eq!(ov.content_bits(), 5);
        assert_eq!(ov.width(), 6);
        assert_eq!(ov.decode(), values);
    }

    #[test]
    fn test_overflow_full_word() {
        let values = [u32::MAX, 0, 5, u32::MAX - 1];
        let ov = pack(&values);
        assert_eq!(ov.threshold_bits(), 31);
        assert_eq!(ov.width(), 32);
        assert_eq!(ov.table(), &[u32::MAX, u32::MAX - 1]);
        assert_eq!(ov.decode(), values);
    }

    #[test]
    fn test_minimize_words() {
        let mut values = vec![1u32; 100];
        values.extend_from_slice(&[u32::MAX, u32::MAX]);
        assert_eq!(choose_threshold(&values, ThresholdPolicy::HalfMax), 31);
        assert_eq!(choose_threshold(&values, ThresholdPolicy::MinimizeWords), 1);

        let ov = OverflowVec::new(
            &values,
            &OverflowConfig::default().with_threshold(ThresholdPolicy::MinimizeWords),
        )
        .unwrap();
        let layout = ov.layout();
        assert_eq!(layout.payload_words + layout.table_words, 9);
        assert_eq!(ov.decode(), values);
    }

    #[test]
    fn test_fixed_threshold_clamped() {
        assert_eq!(choose_threshold(&[], ThresholdPolicy::Fixed(0)), 1);
        assert_eq!(choose_threshold(&[], ThresholdPolicy::Fixed(40)), 31);
    }

    #[test]
    fn test_overflow_words_roundtrip() {
        let ov = pack(&[5, 12, 31, 7, 15, 1023, 2000, 999_999]);
        let words = ov.to_words();
        assert_eq!(words.len(), 8 + 1 + 5);
        assert_eq!(words[4..9], [20, 19, 0, 1, 999_999]);
        assert_eq!(OverflowVec::from_words(&words).unwrap(), ov);
        assert_eq!(OverflowVec::from_bytes(&ov.to_bytes()).unwrap(), ov);
    }

    #[test]
    fn test_overflow_rejects_dangling_reference() {
        // Table [100, 101]; element 2 is (1 << 6) | 1 at bit offset 14.
        let mut words = pack(&[100, 1, 101]).to_words();
        assert_eq!(words[7], 2);
        *words.last_mut().unwrap() |= 1 << 15;
        assert!(matches!(
            OverflowVec::from_words(&words),
            Err(Error::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_overflow_rejects_inconsistent_header() {
        let words = pack(&[1, 100, 100, 2]).to_words();

        let mut bad = words.clone();
        bad[4] += 1;
        assert!(OverflowVec::from_words(&bad).is_err());

        let mut bad = words.clone();
        bad[6] = 3;
        assert!(OverflowVec::from_words(&bad).is_err());

        let mut bad = words;
        bad[2] = Variant::Overlap.tag();
        assert!(matches!(
            OverflowVec::from_words(&bad),
            Err(Error::VariantMismatch { .. })
        ));
    }
}

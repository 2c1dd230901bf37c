//! Word-aligned bit packing.
//!
//! Each word holds `k = floor(32 / w)` whole fields. Element `i` lives in
//! word `i / k` at bit `(i % k) * w`. No field crosses a word boundary, so
//! reads never touch a second word; the price is up to `32 mod w` padding
//! bits per word, which are always zero.

use crate::bits;
use crate::error::{Error, Result};
use crate::format::{self, Variant};
use crate::layout::Layout;
use crate::width::field_width;

/// A `u32` sequence packed into word-aligned lanes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedVec {
    words: Vec<u32>,
    width: u32,
    n: usize,
}

impl AlignedVec {
    /// Pack `values` using the minimal field width.
    pub fn new(values: &[u32]) -> Result<Self> {
        format::checked_len(values.len())?;
        let width = field_width(values);
        let mut words = vec![0u32; bits::lane_words(values.len(), width)];

        for (i, &v) in values.iter().enumerate() {
            bits::write_lane(&mut words, i, width, v);
        }

        tracing::debug!(
            variant = %Variant::Aligned,
            len = values.len(),
            width,
            per_word = bits::lanes_per_word(width),
            payload_words = words.len(),
            "packed sequence"
        );

        Ok(Self {
            words,
            width,
            n: values.len(),
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

    /// Bits per element.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Fields stored in each payload word.
    pub fn per_word(&self) -> usize {
        bits::lanes_per_word(self.width)
    }

    /// Packed payload words, without header.
    pub fn payload(&self) -> &[u32] {
        &self.words
    }

    /// Return the value at index `i`.
    pub fn get(&self, i: usize) -> Result<u32> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }
        Ok(bits::read_lane(&self.words, i, self.width))
    }

    /// Iterate over all values in order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.n).map(move |i| bits::read_lane(&self.words, i, self.width))
    }

    /// Unpack every value.
    pub fn decode(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Word accounting for this representation.
    pub fn layout(&self) -> Layout {
        Layout {
            variant: Variant::Aligned,
            len: self.n,
            header_words: Variant::Aligned.header_words(),
            table_words: 0,
            payload_words: self.words.len(),
            field_width: self.width,
        }
    }

    /// Approximate heap memory usage in bytes.
    pub fn heap_bytes(&self) -> usize {
        self.words.capacity() * 4
    }

    /// Serialize as header followed by payload.
    pub fn to_words(&self) -> Vec<u32> {
        let mut out = format::begin(
            Variant::Aligned,
            self.n as u32,
            Variant::Aligned.header_words() + self.words.len(),
        );
        out.push(self.width);
        out.extend_from_slice(&self.words);
        out
    }

    /// Parse `to_words()` output.
    ///
    /// Padding bits must be zero: above the last lane of every word, and
    /// in the unused lanes of the last word.
    pub fn from_words(words: &[u32]) -> Result<Self> {
        let (n, mut r) = format::open_as(words, Variant::Aligned)?;
        let width = format::check_width(r.word()?)?;
        let payload = r.take(bits::lane_words(n, width))?;
        r.finish("AlignedVec")?;

        let per_word = bits::lanes_per_word(width);
        let lane_bits = per_word as u32 * width;
        let filled = bits::mask(lane_bits);
        if payload.iter().any(|&w| w & !filled != 0) {
            return Err(Error::InvalidEncoding(
                "nonzero padding above last lane".to_string(),
            ));
        }
        let tail_lanes = n % per_word;
        if tail_lanes != 0 {
            let used = bits::mask(tail_lanes as u32 * width);
            if payload[payload.len() - 1] & !used != 0 {
                return Err(Error::InvalidEncoding(
                    "nonzero bits in unused lanes".to_string(),
                ));
            }
        }

        Ok(Self {
            words: payload.to_vec(),
            width,
            n,
        })
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_basic() {
        let values = [5, 12, 31, 7, 15, 1023, 2000, 999_999];
        let av = AlignedVec::new(&values).unwrap();
        assert_eq!(av.width(), 20);
        assert_eq!(av.per_word(), 1);
        assert_eq!(av.payload().len(), 8);
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(av.get(i).unwrap(), v);
        }
        assert_eq!(av.decode(), values);
        assert!(av.get(8).is_err());
    }

    #[test]
    fn test_aligned_no_straddle() {
        // Width 10: three lanes per word, two padding bits on top.
        let values: Vec<u32> = (0..7).map(|i| 1023 - i).collect();
        let av = AlignedVec::new(&values).unwrap();
        assert_eq!(av.width(), 10);
        assert_eq!(av.per_word(), 3);
        assert_eq!(av.payload().len(), 3);
        for &w in av.payload() {
            assert_eq!(w >> 30, 0);
        }
        // Last word holds one lane; lanes 1 and 2 stay clear.
        assert_eq!(av.payload()[2] >> 10, 0);
        assert_eq!(av.decode(), values);
    }

    #[test]
    fn test_aligned_single_bit() {
        let values: Vec<u32> = (0..33).map(|i| i % 2).collect();
        let av = AlignedVec::new(&values).unwrap();
        assert_eq!(av.width(), 1);
        assert_eq!(av.payload().len(), 2);
        assert_eq!(av.payload()[0], 0xAAAA_AAAA);
        assert_eq!(av.payload()[1], 0);
        assert_eq!(av.decode(), values);
    }

    #[test]
    fn test_aligned_words_roundtrip() {
        let av = AlignedVec::new(&[3, 1, 4, 1, 5, 9, 2, 6]).unwrap();
        let words = av.to_words();
        assert_eq!(words[2], Variant::Aligned.tag());
        assert_eq!(AlignedVec::from_words(&words).unwrap(), av);
        assert_eq!(AlignedVec::from_bytes(&av.to_bytes()).unwrap(), av);
    }

    #[test]
    fn test_aligned_rejects_dirty_padding() {
        let values: Vec<u32> = vec![1023; 4];
        let mut words = AlignedVec::new(&values).unwrap().to_words();
        let first = Variant::Aligned.header_words();
        words[first] |= 1 << 31;
        assert!(AlignedVec::from_words(&words).is_err());

        let mut words = AlignedVec::new(&values).unwrap().to_words();
        *words.last_mut().unwrap() |= 1 << 15;
        assert!(AlignedVec::from_words(&words).is_err());
    }

    #[test]
    fn test_aligned_rejects_overlap_tag() {
        let words = crate::overlap::OverlapVec::new(&[1, 2, 3]).unwrap().to_words();
        assert!(matches!(
            AlignedVec::from_words(&words),
            Err(Error::VariantMismatch { .. })
        ));
    }
}

//! Back-to-back bit packing.
//!
//! Element `i` occupies bits `[i * w, (i + 1) * w)` of one continuous bit
//! stream, where `w` is the width of the largest value. A field may start
//! in one word and end in the next, so every bit of the payload except the
//! tail of the last word carries data.
//!
//! Because `w` is uniform, `get(i)` computes the bit offset directly: $O(1)$.

use crate::bits;
use crate::error::{Error, Result};
use crate::format::{self, Variant};
use crate::layout::Layout;
use crate::width::field_width;

/// A `u32` sequence packed into a continuous bit stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapVec {
    words: Vec<u32>,
    width: u32,
    n: usize,
}

impl OverlapVec {
    /// Pack `values` using the minimal field width.
    ///
    /// Fails only if `values` is longer than `u32::MAX`.
    pub fn new(values: &[u32]) -> Result<Self> {
        format::checked_len(values.len())?;
        let width = field_width(values);
        let mut words = vec![0u32; bits::stream_words(values.len(), width)];

        let mut bit_offset = 0usize;
        for &v in values {
            bits::write_field(&mut words, bit_offset, width, v);
            bit_offset += width as usize;
        }

        tracing::debug!(
            variant = %Variant::Overlap,
            len = values.len(),
            width,
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

    /// Packed payload words, without header.
    pub fn payload(&self) -> &[u32] {
        &self.words
    }

    /// Return the value at index `i`.
    pub fn get(&self, i: usize) -> Result<u32> {
        if i >= self.n {
            return Err(Error::IndexOutOfBounds(i));
        }
        Ok(bits::read_field(&self.words, i * self.width as usize, self.width))
    }

    /// Iterate over all values in order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        let width = self.width;
        (0..self.n).map(move |i| bits::read_field(&self.words, i * width as usize, width))
    }

    /// Unpack every value.
    pub fn decode(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Word accounting for this representation.
    pub fn layout(&self) -> Layout {
        Layout {
            variant: Variant::Overlap,
            len: self.n,
            header_words: Variant::Overlap.header_words(),
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
            Variant::Overlap,
            self.n as u32,
            Variant::Overlap.header_words() + self.words.len(),
        );
        out.push(self.width);
        out.extend_from_slice(&self.words);
        out
    }

    /// Parse `to_words()` output.
    ///
    /// Rejects any header not written by this codec.
    pub fn from_words(words: &[u32]) -> Result<Self> {
        let (n, mut r) = format::open_as(words, Variant::Overlap)?;
        let width = format::check_width(r.word()?)?;
        let payload = r.take(bits::stream_words(n, width))?;
        r.finish("OverlapVec")?;

        let used = (n * width as usize) % bits::WORD_BITS as usize;
        if used != 0 {
            let tail = payload[payload.len() - 1] >> used;
            if tail != 0 {
                return Err(Error::InvalidEncoding(
                    "nonzero bits after last field".to_string(),
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

    const SAMPLE: [u32; 8] = [5, 12, 31, 7, 15, 1023, 2000, 999_999];

    #[test]
    fn test_overlap_basic() {
        let ov = OverlapVec::new(&SAMPLE).unwrap();
        assert_eq!(ov.len(), 8);
        assert_eq!(ov.width(), 20);
        assert_eq!(ov.payload().len(), 5);
        for (i, &v) in SAMPLE.iter().enumerate() {
            assert_eq!(ov.get(i).unwrap(), v);
        }
        assert_eq!(ov.decode(), SAMPLE);
        assert_eq!(ov.get(8), Err(Error::IndexOutOfBounds(8)));
    }

    #[test]
    fn test_overlap_empty() {
        let ov = OverlapVec::new(&[]).unwrap();
        assert!(ov.is_empty());
        assert_eq!(ov.width(), 1);
        assert!(ov.payload().is_empty());
        assert!(ov.get(0).is_err());
        let back = OverlapVec::from_words(&ov.to_words()).unwrap();
        assert_eq!(back, ov);
    }

    #[test]
    fn test_overlap_full_width() {
        let values = vec![u32::MAX, 0, 0x8000_0000, 1];
        let ov = OverlapVec::new(&values).unwrap();
        assert_eq!(ov.width(), 32);
        assert_eq!(ov.payload(), &values[..]);
        assert_eq!(ov.decode(), values);
    }

    #[test]
    fn test_overlap_words_roundtrip() {
        let ov = OverlapVec::new(&SAMPLE).unwrap();
        let words = ov.to_words();
        assert_eq!(words.len(), 10);
        assert_eq!(words[..5], [format::MAGIC, format::VERSION, 1, 8, 20]);
        assert_eq!(OverlapVec::from_words(&words).unwrap(), ov);
        assert_eq!(OverlapVec::from_bytes(&ov.to_bytes()).unwrap(), ov);
    }

    #[test]
    fn test_overlap_rejects_corruption() {
        let words = OverlapVec::new(&SAMPLE).unwrap().to_words();

        let mut bad = words.clone();
        bad[0] ^= 1;
        assert!(matches!(OverlapVec::from_words(&bad), Err(Error::BadMagic(_))));

        let mut bad = words.clone();
        bad[4] = 0;
        assert!(OverlapVec::from_words(&bad).is_err());

        let mut bad = words.clone();
        bad.push(0);
        assert!(OverlapVec::from_words(&bad).is_err());

        // 8 * 20 = 160 bits fill exactly 5 words, so shorten the sequence instead.
        let mut bad = OverlapVec::new(&[1, 2, 3]).unwrap().to_words();
        *bad.last_mut().unwrap() |= 1 << 31;
        assert!(OverlapVec::from_words(&bad).is_err());

        assert!(OverlapVec::from_words(&words[..7]).is_err());
    }
}

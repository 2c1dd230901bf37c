//! Bit-level field placement over `u32` words.
//!
//! Two layouts share these primitives:
//! - **Stream**: fields are laid back to back; a field may straddle two
//!   adjacent words but never three (widths are at most 32).
//! - **Lane**: each word holds `32 / width` whole fields; nothing straddles.
//!
//! Words are assumed zeroed before writing. Fields are OR-ed in, so a value
//! wider than its field would corrupt its neighbours; callers mask first.

/// Bits per payload word.
pub const WORD_BITS: u32 = u32::BITS;

/// All-ones mask of `width` bits.
///
/// `1 << 32` overflows, so the full-word width returns `u32::MAX` directly.
#[inline]
pub fn mask(width: u32) -> u32 {
    debug_assert!(width <= WORD_BITS);
    if width >= WORD_BITS {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Number of words needed to hold `n` stream fields of `width` bits.
#[inline]
pub fn stream_words(n: usize, width: u32) -> usize {
    (n * width as usize).div_ceil(WORD_BITS as usize)
}

/// Number of whole fields of `width` bits that fit in one word.
#[inline]
pub fn lanes_per_word(width: u32) -> usize {
    (WORD_BITS / width.max(1)) as usize
}

/// Number of words needed to hold `n` lane fields of `width` bits.
#[inline]
pub fn lane_words(n: usize, width: u32) -> usize {
    n.div_ceil(lanes_per_word(width))
}

/// OR `value` into the stream field starting at `bit_offset`.
#[inline]
pub fn write_field(words: &mut [u32], bit_offset: usize, width: u32, value: u32) {
    let value = value & mask(width);
    let word_idx = bit_offset / WORD_BITS as usize;
    let bit_in_word = (bit_offset % WORD_BITS as usize) as u32;

    words[word_idx] |= value << bit_in_word;
    if bit_in_word + width > WORD_BITS {
        // bit_in_word > 0 here, so the shift stays below 32.
        words[word_idx + 1] |= value >> (WORD_BITS - bit_in_word);
    }
}

/// Read the stream field starting at `bit_offset`.
#[inline]
pub fn read_field(words: &[u32], bit_offset: usize, width: u32) -> u32 {
    let word_idx = bit_offset / WORD_BITS as usize;
    let bit_in_word = (bit_offset % WORD_BITS as usize) as u32;

    let mut value = words[word_idx] >> bit_in_word;
    if bit_in_word + width > WORD_BITS {
        value |= words[word_idx + 1] << (WORD_BITS - bit_in_word);
    }
    value & mask(width)
}

/// OR `value` into lane `i` of a lane-aligned layout.
#[inline]
pub fn write_lane(words: &mut [u32], i: usize, width: u32, value: u32) {
    let per_word = lanes_per_word(width);
    let shift = (i % per_word) as u32 * width;
    words[i / per_word] |= (value & mask(width)) << shift;
}

/// Read lane `i` of a lane-aligned layout.
#[inline]
pub fn read_lane(words: &[u32], i: usize, width: u32) -> u32 {
    let per_word = lanes_per_word(width);
    let shift = (i % per_word) as u32 * width;
    (words[i / per_word] >> shift) & mask(width)
}

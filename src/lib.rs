//! # Fixed-Width Bit Packing
//!
//! *The fewest words for a sequence of small integers, with $O(1)$ access.*
//!
//! ## Intuition First
//!
//! A `u32` array spends 32 bits on every element, even when the largest
//! value is 1000 and 10 bits would do. Bit packing stores each element in a
//! field just wide enough for the maximum, so 8 values of at most 20 bits
//! take 5 words instead of 8.
//!
//! Since every field has the same width, element `i` starts at bit
//! `i * width`: random access is a multiply, a shift and a mask. Nothing is
//! decompressed.
//!
//! ## The Problem
//!
//! Uniform width is hostage to the maximum. One value of 999 999 in a sea of
//! two-digit numbers forces 20 bits on all of them. This crate offers three
//! trade-offs:
//!
//! - **Overlap** ([`OverlapVec`]): fields back to back in one bit stream.
//!   Densest payload; a field may straddle two words.
//! - **Aligned** ([`AlignedVec`]): `floor(32 / w)` whole fields per word.
//!   Reads never touch two words; up to `32 mod w` bits per word are padding.
//! - **Overflow** ([`OverflowVec`]): narrow fields with an indicator bit.
//!   Outliers live in a side table and the field stores their slot.
//!
//! ## Mathematical Formulation
//!
//! For $n$ values with maximum $M$, the field width is
//! $w = \max(1, \lceil \log_2(M + 1) \rceil)$ and:
//!
//! - overlap payload: $\lceil n w / 32 \rceil$ words
//! - aligned payload: $\lceil n / \lfloor 32 / w \rfloor \rceil$ words
//! - overflow payload: $\lceil n (1 + \max(t, \lceil \log_2 k \rceil)) / 32 \rceil + k$ words
//!   for threshold $t$ bits and $k$ outliers
//!
//! Every representation also carries a fixed header (see [`format`]).
//!
//! ## Complexity Analysis
//!
//! - **Encode / decode**: $O(n)$.
//! - **`get(i)`**: $O(1)$ for all three codecs.
//! - **Space**: payload above plus 5 (or 8 + $k$) header words.
//!
//! ## What Could Go Wrong
//!
//! 1. **Full-word fields**: `(1 << 32) - 1` overflows; masks go through
//!    [`bits::mask`], which special-cases width 32.
//! 2. **No checksum**: the header is validated, and decoders reject
//!    structurally impossible payloads, but a flipped payload bit inside a
//!    valid field decodes to a wrong value.
//! 3. **Short inputs**: below [`Layout::break_even_len`] elements the header
//!    costs more than packing saves.
//!
//! ## Usage
//!
//! ```
//! use bitpack::{Codec, AnyCodec, OverflowConfig, Variant, decode_words};
//!
//! let values = [5, 12, 31, 7, 15, 1023, 2000, 999_999];
//! let codec = AnyCodec::new(Variant::Overflow, OverflowConfig::default());
//! let packed = codec.encode(&values).unwrap();
//!
//! assert_eq!(packed.get(6).unwrap(), 2000);
//! assert_eq!(decode_words(&packed.to_words()).unwrap(), values);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aligned;
pub mod bits;
pub mod codec;
pub mod config;
pub mod error;
pub mod format;
pub mod layout;
pub mod overflow;
pub mod overlap;
pub mod width;

pub use aligned::AlignedVec;
pub use codec::{
    decode_words, encode, AlignedCodec, AnyCodec, Codec, OverflowCodec, OverlapCodec, Packed,
};
pub use config::{OverflowConfig, PackConfig, TablePolicy, ThresholdPolicy};
pub use error::{Error, Result};
pub use format::Variant;
pub use layout::Layout;
pub use overflow::OverflowVec;
pub use overlap::OverlapVec;
pub use width::field_width;

//! Field width estimation.
//!
//! A field must hold the largest value of the sequence, so the width of a
//! packed sequence is $\max(1, \lceil \log_2(\max + 1) \rceil)$. The floor of
//! one bit keeps empty and all-zero sequences addressable.

/// Number of significant bits in `v`. Zero for `v == 0`.
#[inline]
pub fn bit_length(v: u32) -> u32 {
    u32::BITS - v.leading_zeros()
}

/// Minimal width, in bits, able to represent `v`. Never less than 1.
#[inline]
pub fn bits_for(v: u32) -> u32 {
    bit_length(v).max(1)
}

/// Minimal field width for every value in `values`.
///
/// Empty and all-zero sequences yield 1.
pub fn field_width(values: &[u32]) -> u32 {
    bits_for(values.iter().copied().max().unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_floor() {
        assert_eq!(field_width(&[]), 1);
        assert_eq!(field_width(&[0, 0, 0]), 1);
        assert_eq!(field_width(&[1]), 1);
    }

    #[test]
    fn test_width_powers_of_two() {
        assert_eq!(field_width(&[2]), 2);
        assert_eq!(field_width(&[3]), 2);
        assert_eq!(field_width(&[4]), 3);
        assert_eq!(field_width(&[255, 1]), 8);
        assert_eq!(field_width(&[256]), 9);
        assert_eq!(field_width(&[5, 12, 31, 7, 15, 1023, 2000, 999_999]), 20);
        assert_eq!(field_width(&[u32::MAX]), 32);
    }

    #[test]
    fn test_bit_length_zero() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bits_for(0), 1);
        assert_eq!(bit_length(499_999), 19);
    }
}

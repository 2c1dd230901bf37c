//! Codec selection and overflow tuning.

use crate::format::Variant;

/// How the overflow codec picks the inline threshold.
///
/// Values below `2^threshold_bits` are stored inline; everything else goes
/// to the overflow table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ThresholdPolicy {
    /// `max(1, bits(max / 2))`: the top half of the range becomes outliers.
    #[default]
    HalfMax,
    /// A fixed threshold, clamped to `1..=31`.
    Fixed(u32),
    /// Scan a bit-length histogram and take the threshold that minimises
    /// payload plus table words.
    MinimizeWords,
}

/// How repeated outliers share overflow table slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TablePolicy {
    /// One table slot per outlier occurrence, in scan order.
    #[default]
    EveryOccurrence,
    /// One slot per distinct outlier value, assigned on first occurrence.
    Dedup,
}

/// Overflow codec parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OverflowConfig {
    /// Inline threshold selection.
    pub threshold: ThresholdPolicy,
    /// Table slot sharing.
    pub table: TablePolicy,
}

impl OverflowConfig {
    /// Set the threshold policy.
    #[must_use]
    pub fn with_threshold(mut self, threshold: ThresholdPolicy) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the table policy.
    #[must_use]
    pub fn with_table(mut self, table: TablePolicy) -> Self {
        self.table = table;
        self
    }
}

/// Top-level packing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PackConfig {
    /// Codec used for encoding.
    pub variant: Variant,
    /// Parameters for [`Variant::Overflow`]; ignored by the other codecs.
    pub overflow: OverflowConfig,
}

impl PackConfig {
    /// Configuration selecting `variant` with default parameters.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }

    /// Set the codec.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the overflow parameters.
    #[must_use]
    pub fn with_overflow(mut self, overflow: OverflowConfig) -> Self {
        self.overflow = overflow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = PackConfig::default();
        assert_eq!(c.variant, Variant::Overlap);
        assert_eq!(c.overflow.threshold, ThresholdPolicy::HalfMax);
        assert_eq!(c.overflow.table, TablePolicy::EveryOccurrence);
    }

    #[test]
    fn test_builders() {
        let c = PackConfig::new(Variant::Overflow).with_overflow(
            OverflowConfig::default()
                .with_threshold(ThresholdPolicy::Fixed(8))
                .with_table(TablePolicy::Dedup),
        );
        assert_eq!(c.variant, Variant::Overflow);
        assert_eq!(c.overflow.threshold, ThresholdPolicy::Fixed(8));
        assert_eq!(c.overflow.table, TablePolicy::Dedup);
        assert_eq!(c.with_variant(Variant::Aligned).variant, Variant::Aligned);
    }
}

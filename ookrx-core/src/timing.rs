//! Edge Timing Classifier
//!
//! Pure comparison of a measured duration against a reference band. The
//! state machine leans on this for preamble lock and framing detection;
//! payload bits deliberately do *not* use it (they compare pulse width
//! against gap width relatively, which tolerates per-unit clock drift
//! that would defeat any fixed band).

/// Outcome of matching a measured duration against a reference band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingMatch {
    /// Below `reference - tolerance`.
    TooShort,
    /// Within `reference ± tolerance`, both ends inclusive.
    Matched,
    /// Above `reference + tolerance`.
    TooLong,
}

impl TimingMatch {
    /// Convenience for the common "did it land in the band" check.
    pub const fn is_match(self) -> bool {
        matches!(self, TimingMatch::Matched)
    }
}

/// Classify `measured` against `reference ± tolerance` (µs).
///
/// Total over all inputs: the lower bound saturates at zero, so a
/// tolerance wider than the reference simply means nothing is ever too
/// short. No side effects, no error cases.
pub const fn classify(measured: u32, reference: u32, tolerance: u32) -> TimingMatch {
    if measured > reference.saturating_add(tolerance) {
        TimingMatch::TooLong
    } else if measured < reference.saturating_sub(tolerance) {
        TimingMatch::TooShort
    } else {
        TimingMatch::Matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SYNC_PULSE_TOLERANCE_US, SYNC_PULSE_US};
    use proptest::prelude::*;

    #[test]
    fn band_edges_inclusive() {
        assert_eq!(classify(282, 632, 350), TimingMatch::Matched);
        assert_eq!(classify(982, 632, 350), TimingMatch::Matched);
        assert_eq!(classify(281, 632, 350), TimingMatch::TooShort);
        assert_eq!(classify(983, 632, 350), TimingMatch::TooLong);
    }

    #[test]
    fn nominal_sync_pulse_matches() {
        assert!(classify(SYNC_PULSE_US, SYNC_PULSE_US, SYNC_PULSE_TOLERANCE_US).is_match());
    }

    #[test]
    fn tolerance_wider_than_reference_saturates() {
        // Lower bound saturates at 0; even a zero-length pulse matches.
        assert_eq!(classify(0, 100, 350), TimingMatch::Matched);
        assert_eq!(classify(451, 100, 350), TimingMatch::TooLong);
    }

    proptest! {
        #[test]
        fn matched_iff_within_band(
            measured in any::<u32>(),
            reference in 0u32..100_000,
            tolerance in 0u32..10_000,
        ) {
            let lo = reference.saturating_sub(tolerance);
            let hi = reference.saturating_add(tolerance);
            let expected = if measured < lo {
                TimingMatch::TooShort
            } else if measured > hi {
                TimingMatch::TooLong
            } else {
                TimingMatch::Matched
            };
            prop_assert_eq!(classify(measured, reference, tolerance), expected);
        }

        #[test]
        fn monotonic_in_measured(
            reference in 0u32..100_000,
            tolerance in 0u32..10_000,
            a in any::<u32>(),
            b in any::<u32>(),
        ) {
            // Ordering of durations never inverts the ordering of outcomes.
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let rank = |m: TimingMatch| match m {
                TimingMatch::TooShort => 0u8,
                TimingMatch::Matched => 1,
                TimingMatch::TooLong => 2,
            };
            prop_assert!(
                rank(classify(lo, reference, tolerance))
                    <= rank(classify(hi, reference, tolerance))
            );
        }
    }
}

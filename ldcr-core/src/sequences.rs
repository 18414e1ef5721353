//! Geometric-gap index sequences used to draw Bernoulli subsets.

use crate::random::RandomSource;

/// Returns an ascending sequence of indices in `[0, max)` where each index is
/// included independently with probability `probability`.
///
/// Gaps between consecutive indices are drawn from a geometric distribution,
/// so the cost is proportional to the number of indices returned rather than
/// to `max`.
///
/// # Examples
/// ```
/// use ldcr_core::{SeededRandom, binomial_gap_sequence};
///
/// let mut random = SeededRandom::new(1);
/// assert_eq!(binomial_gap_sequence(1.0, 4, &mut random), vec![0, 1, 2, 3]);
/// assert!(binomial_gap_sequence(0.0, 4, &mut random).is_empty());
/// ```
pub fn binomial_gap_sequence(
    probability: f64,
    max: u64,
    random: &mut impl RandomSource,
) -> Vec<u64> {
    if max == 0 || probability <= 0.0 {
        return Vec::new();
    }
    if probability >= 1.0 {
        return (0..max).collect();
    }

    let log_q = (1.0 - probability).ln();
    let mut indices = Vec::new();
    let mut current: Option<u64> = None;
    loop {
        let gap = (1.0 - random.next_f64()).ln() / log_q;
        let skip = saturating_floor(gap);
        let next = match current {
            None => skip,
            Some(previous) => previous.saturating_add(1).saturating_add(skip),
        };
        if next >= max {
            break;
        }
        indices.push(next);
        current = Some(next);
    }
    indices
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "gap is non-negative and clamped to the u64 range"
)]
fn saturating_floor(gap: f64) -> u64 {
    if !gap.is_finite() || gap >= u64::MAX as f64 {
        return u64::MAX;
    }
    gap.max(0.0).floor() as u64
}

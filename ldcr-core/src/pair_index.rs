//! Triangular indexing of unordered node pairs.
//!
//! The pair `{i, j}` with `i > j` maps to `i·(i−1)/2 + j`, a bijection from
//! the unordered pairs over `n` indices onto `[0, n·(n−1)/2)`. Domain samplers
//! run over this scalar space so edges and non-edges can be drawn uniformly
//! without enumerating them.

/// Returns the number of unordered pairs over `n` indices.
///
/// # Examples
/// ```
/// use ldcr_core::max_edge_count;
///
/// assert_eq!(max_edge_count(0), 0);
/// assert_eq!(max_edge_count(10), 45);
/// ```
#[must_use]
pub const fn max_edge_count(n: u64) -> u64 {
    if n < 2 {
        return 0;
    }
    if n % 2 == 0 {
        (n / 2) * (n - 1)
    } else {
        n * ((n - 1) / 2)
    }
}

/// Returns the unsigned triangular index of the unordered pair `{a, b}`.
///
/// `a` and `b` must differ.
#[must_use]
pub const fn pair_index(a: u64, b: u64) -> u64 {
    let (high, low) = if a > b { (a, b) } else { (b, a) };
    max_edge_count(high) + low
}

/// Recovers the unordered pair encoded by `index` as `(larger, smaller)`.
#[must_use]
pub fn pair_from_index(index: u64) -> (u64, u64) {
    let mut high = estimate_high(index);
    // The float estimate can be off by one for large indices.
    while max_edge_count(high) > index {
        high -= 1;
    }
    while max_edge_count(high + 1) <= index {
        high += 1;
    }
    (high, index - max_edge_count(high))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "estimate is corrected with exact integer arithmetic afterwards"
)]
fn estimate_high(index: u64) -> u64 {
    let estimate = 1.0 + (-0.5 + (0.25 + 2.0 * index as f64).sqrt()).floor();
    (estimate.max(1.0) as u64).max(1)
}

/// Returns the signed edge index of the directed pair `(source, target)`.
///
/// The magnitude is the triangular index of `{source, target}`; the sign is
/// positive if and only if `source > target`. Because the pair `{1, 0}` maps
/// to zero, global node indices start at two so every edge index carries a
/// sign.
///
/// # Examples
/// ```
/// use ldcr_core::{edge_index, node_indices};
///
/// let forward = edge_index(7, 3);
/// assert!(forward > 0);
/// assert_eq!(edge_index(3, 7), -forward);
/// assert_eq!(node_indices(forward), (7, 3));
/// assert_eq!(node_indices(-forward), (3, 7));
/// ```
#[must_use]
#[expect(
    clippy::cast_possible_wrap,
    reason = "node indices stay far below 2^32 so the pair index fits in i64"
)]
pub const fn edge_index(source: u64, target: u64) -> i64 {
    let magnitude = pair_index(source, target) as i64;
    if source > target { magnitude } else { -magnitude }
}

/// Inverts [`edge_index`], returning `(source, target)`.
#[must_use]
pub fn node_indices(index: i64) -> (u64, u64) {
    let (high, low) = pair_from_index(index.unsigned_abs());
    if index > 0 { (high, low) } else { (low, high) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, (1, 0))]
    #[case(1, (2, 0))]
    #[case(2, (2, 1))]
    #[case(3, (3, 0))]
    #[case(44, (9, 8))]
    fn pair_from_index_matches_enumeration(#[case] index: u64, #[case] expected: (u64, u64)) {
        assert_eq!(pair_from_index(index), expected);
    }

    #[test]
    fn enumeration_is_dense() {
        let mut index = 0;
        for high in 1..60_u64 {
            for low in 0..high {
                assert_eq!(pair_index(high, low), index);
                assert_eq!(pair_index(low, high), index);
                index += 1;
            }
        }
    }

    #[test]
    fn large_indices_are_corrected() {
        let high = 3_000_000_000_u64;
        let index = pair_index(high, high - 1);
        assert_eq!(pair_from_index(index), (high, high - 1));
        assert_eq!(pair_from_index(index + 1), (high + 1, 0));
    }

    proptest! {
        #[test]
        fn signed_index_round_trips(first in 2_u64..1_000_000, second in 2_u64..1_000_000) {
            prop_assume!(first != second);
            let index = edge_index(first, second);
            prop_assert_eq!(index > 0, first > second);
            prop_assert_eq!(node_indices(index), (first, second));
        }
    }
}

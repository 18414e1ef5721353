//! Parameter sampling for clusters created by splits and merges.

use crate::{builder::PInSampler, random::RandomSource};

fn mean(values: impl ExactSizeIterator<Item = f64> + Clone) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Population standard deviation.
fn deviation(values: impl ExactSizeIterator<Item = f64> + Clone) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    let centre = mean(values.clone());
    let spread = values.map(|value| (value - centre).powi(2)).sum::<f64>();
    (spread / count as f64).sqrt()
}

/// Draws the intra-cluster probability of a new cluster.
///
/// `own` is the probability of the cluster being split, which the mean
/// sampler keeps; a merge passes `None` and receives the mean of the current
/// ground-truth probabilities instead. The Gaussian sampler redraws until the
/// value lies in `[p_out, 1]`.
pub(crate) fn sample_p_in(
    sampler: PInSampler,
    own: Option<f64>,
    current: &[f64],
    p_out: f64,
    random: &mut impl RandomSource,
) -> f64 {
    let centre = mean(current.iter().copied());
    let fallback = own.unwrap_or(centre);
    if sampler == PInSampler::Mean || current.len() <= 1 {
        return fallback;
    }
    let spread = deviation(current.iter().copied());
    if spread == 0.0 {
        return centre.clamp(p_out, 1.0);
    }
    loop {
        let draw = centre + spread * random.next_gaussian();
        if (p_out..=1.0).contains(&draw) {
            return draw;
        }
    }
}

fn sample_positive(sizes: &[usize], random: &mut impl RandomSource) -> usize {
    let values = || sizes.iter().map(|&size| size as f64);
    let centre = mean(values());
    let spread = deviation(values());
    if spread == 0.0 {
        return sizes.first().copied().unwrap_or(1).max(1);
    }
    loop {
        let draw = (centre + spread * random.next_gaussian()).trunc();
        if draw >= 1.0 {
            return draw as usize;
        }
    }
}

/// Draws the expected size of one half of a split.
///
/// With a single ground-truth cluster the initial cluster's own expected size
/// is reused.
pub(crate) fn sample_expected_size(
    sizes: &[usize],
    own: usize,
    random: &mut impl RandomSource,
) -> usize {
    if sizes.len() <= 1 {
        return own.max(1);
    }
    sample_positive(sizes, random)
}

/// Draws the expected size of a merged cluster.
pub(crate) fn sample_merged_size(sizes: &[usize], random: &mut impl RandomSource) -> usize {
    if sizes.len() <= 1 {
        return sizes.first().copied().unwrap_or(1).max(1);
    }
    sample_positive(sizes, random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use rstest::rstest;

    #[rstest]
    #[case::mean_keeps_own(PInSampler::Mean, Some(0.9), 0.9)]
    #[case::mean_for_merge(PInSampler::Mean, None, 0.6)]
    fn mean_sampler_is_deterministic(
        #[case] sampler: PInSampler,
        #[case] own: Option<f64>,
        #[case] expected: f64,
    ) {
        let mut random = SeededRandom::new(1);
        let drawn = sample_p_in(sampler, own, &[0.3, 0.9], 0.1, &mut random);
        assert!((drawn - expected).abs() < 1e-12);
    }

    #[test]
    fn gaussian_draws_stay_between_p_out_and_one() {
        let mut random = SeededRandom::new(17);
        for _ in 0..500 {
            let drawn = sample_p_in(PInSampler::Gaussian, Some(0.5), &[0.2, 0.95, 0.5], 0.15, &mut random);
            assert!((0.15..=1.0).contains(&drawn));
        }
    }

    #[test]
    fn sizes_are_positive() {
        let mut random = SeededRandom::new(5);
        for _ in 0..500 {
            assert!(sample_expected_size(&[1, 2, 40], 2, &mut random) >= 1);
            assert!(sample_merged_size(&[1, 3], &mut random) >= 1);
        }
        assert_eq!(sample_expected_size(&[12], 12, &mut random), 12);
        assert_eq!(sample_merged_size(&[7], &mut random), 7);
    }

    /// Replays fixed Gaussian deviates; uniform draws are unused here.
    struct FixedDeviates(std::vec::IntoIter<f64>);

    impl RandomSource for FixedDeviates {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn next_below(&mut self, _bound: usize) -> usize {
            0
        }

        fn next_u64_below(&mut self, _bound: u64) -> u64 {
            0
        }

        fn next_f64(&mut self) -> f64 {
            0.0
        }

        fn next_gaussian(&mut self) -> f64 {
            self.0.next().expect("scripted deviate available")
        }
    }

    // Sizes [2, 4] have mean 3 and deviation 1, so a deviate d yields 3 + d.
    #[rstest]
    #[case::fraction_above_half(vec![0.9], 3)]
    #[case::small_fraction_above_half(vec![-1.4], 1)]
    #[case::below_one_is_redrawn(vec![-2.5, 0.7], 3)]
    fn size_draws_drop_the_fraction(#[case] deviates: Vec<f64>, #[case] expected: usize) {
        let mut random = FixedDeviates(deviates.into_iter());
        assert_eq!(sample_merged_size(&[2, 4], &mut random), expected);
    }
}

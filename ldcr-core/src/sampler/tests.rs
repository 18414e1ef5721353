//! Tests for the incremental domain sampler.

use std::collections::HashSet;

use proptest::{collection::vec, prelude::*};
use rstest::{fixture, rstest};
use test_strategy::Arbitrary;

use super::*;
use crate::{random::SeededRandom, test_utils::suite_proptest_config};

#[fixture]
fn random() -> SeededRandom {
    SeededRandom::new(0x5EED)
}

fn assert_partition(sampler: &DomainSampler) {
    let selected: HashSet<u64> = sampler.selected_elements().into_iter().collect();
    let unselected: HashSet<u64> = sampler.unselected_elements().into_iter().collect();
    assert_eq!(selected.len() as u64, sampler.len());
    assert!(selected.is_disjoint(&unselected));
    let union: HashSet<u64> = selected.union(&unselected).copied().collect();
    assert_eq!(union, (0..sampler.max()).collect());
    for element in 0..sampler.max() {
        assert_eq!(sampler.contains(element), selected.contains(&element));
    }
}

#[rstest]
fn random_selection_exhausts_domain(mut random: SeededRandom) {
    let mut sampler = DomainSampler::new(50);
    let mut drawn = HashSet::new();
    while !sampler.is_full() {
        let element = sampler.select_random(&mut random).expect("not full");
        assert!(drawn.insert(element), "element {element} drawn twice");
    }
    assert_eq!(drawn, (0..50).collect());
    assert_eq!(sampler.select_random(&mut random), Err(GraphError::SamplerFull));
    assert!(sampler.propose_for_selection(&mut random).is_none());
}

#[rstest]
fn random_deletion_exhausts_selection(mut random: SeededRandom) {
    let mut sampler = DomainSampler::new(20);
    for element in 0..20 {
        sampler.select(element).expect("unselected");
    }
    let mut removed = HashSet::new();
    while !sampler.is_empty() {
        let element = sampler.delete_random(&mut random).expect("not empty");
        assert!(removed.insert(element));
        assert!(!sampler.contains(element));
    }
    assert_eq!(sampler.delete_random(&mut random), Err(GraphError::SamplerEmpty));
    assert!(sampler.propose_for_deletion(&mut random).is_none());
}

#[test]
fn targeted_errors_are_reported() {
    let mut sampler = DomainSampler::new(5);
    assert_eq!(
        sampler.select(5),
        Err(GraphError::ElementOutOfDomain { element: 5, max: 5 })
    );
    assert_eq!(
        sampler.delete(3),
        Err(GraphError::ElementNotSelected { element: 3 })
    );
    sampler.select(3).expect("unselected");
    assert_eq!(
        sampler.select(3),
        Err(GraphError::ElementAlreadySelected { element: 3 })
    );
}

#[rstest]
fn proposals_do_not_mutate(mut random: SeededRandom) {
    let mut sampler = DomainSampler::new(10);
    for element in [1, 4, 7] {
        sampler.select(element).expect("unselected");
    }
    let before = sampler.selected_elements();
    for _ in 0..50 {
        let candidate = sampler.propose_for_selection(&mut random).expect("not full");
        assert!(!sampler.contains(candidate));
        let victim = sampler.propose_for_deletion(&mut random).expect("not empty");
        assert!(sampler.contains(victim));
    }
    assert_eq!(sampler.selected_elements(), before);
}

#[rstest]
#[case::shrink_below_selection(vec![0, 6, 8, 9], 7, vec![0, 6])]
#[case::grow(vec![1, 2], 20, vec![1, 2])]
#[case::shrink_to_zero(vec![0, 1, 2], 0, vec![])]
fn resize_drops_out_of_range_elements(
    #[case] initial: Vec<u64>,
    #[case] size: u64,
    #[case] expected: Vec<u64>,
) {
    let mut sampler = DomainSampler::new(10);
    for element in initial {
        sampler.select(element).expect("unselected");
    }
    sampler.resize(size).expect("resize succeeds");
    let mut selected = sampler.selected_elements();
    selected.sort_unstable();
    assert_eq!(selected, expected);
    assert_eq!(sampler.max(), size);
    assert_partition(&sampler);
}

#[test]
fn fast_resize_rejects_overfull_shrink() {
    let mut sampler = DomainSampler::new(4);
    sampler.select(0).expect("unselected");
    sampler.select(1).expect("unselected");
    assert!(matches!(
        sampler.fast_resize(1),
        Err(GraphError::InvariantViolation { .. })
    ));
    sampler.fast_resize(2).expect("selection fits");
}

#[rstest]
#[case::to_zero(0)]
#[case::to_half(3)]
fn resize_clears_displaced_elements_before_shrinking(#[case] size: u64) {
    let mut full = DomainSampler::new(6);
    for element in 0..6 {
        full.select(element).expect("unselected");
    }
    let mut fast = full.clone();
    assert!(matches!(
        fast.fast_resize(size),
        Err(GraphError::InvariantViolation { .. })
    ));

    full.resize(size).expect("displaced elements are unselected first");
    assert_eq!(full.len(), size);
    assert!(full.is_full());
    assert_partition(&full);
}

#[test]
fn clear_keeps_domain() {
    let mut sampler = DomainSampler::new(6);
    sampler.select(5).expect("unselected");
    sampler.select(2).expect("unselected");
    sampler.clear();
    assert!(sampler.is_empty());
    assert_eq!(sampler.max(), 6);
    assert_partition(&sampler);
}

#[derive(Clone, Debug, Arbitrary)]
enum SamplerOp {
    #[weight(3)]
    Select(u64),
    #[weight(3)]
    Delete(u64),
    #[weight(2)]
    SelectRandom,
    #[weight(2)]
    DeleteRandom,
    #[weight(1)]
    Grow(#[strategy(0_u64..8)] u64),
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn selection_partitions_domain(
        size in 1_u64..40,
        ops in vec(any::<SamplerOp>(), 1..80),
        seed in any::<u64>(),
    ) {
        let mut sampler = DomainSampler::new(size);
        let mut random = SeededRandom::new(seed);
        let mut model: HashSet<u64> = HashSet::new();
        for op in ops {
            match op {
                SamplerOp::Select(raw) => {
                    let element = raw % sampler.max();
                    let result = sampler.select(element);
                    prop_assert_eq!(result.is_ok(), model.insert(element));
                }
                SamplerOp::Delete(raw) => {
                    let element = raw % sampler.max();
                    let result = sampler.delete(element);
                    prop_assert_eq!(result.is_ok(), model.remove(&element));
                }
                SamplerOp::SelectRandom => {
                    if let Ok(element) = sampler.select_random(&mut random) {
                        prop_assert!(model.insert(element));
                    } else {
                        prop_assert_eq!(model.len() as u64, sampler.max());
                    }
                }
                SamplerOp::DeleteRandom => {
                    if let Ok(element) = sampler.delete_random(&mut random) {
                        prop_assert!(model.remove(&element));
                    } else {
                        prop_assert!(model.is_empty());
                    }
                }
                SamplerOp::Grow(extra) => {
                    let target = sampler.max() + extra;
                    prop_assert!(sampler.resize(target).is_ok());
                }
            }
            let selected: HashSet<u64> = sampler.selected_elements().into_iter().collect();
            prop_assert_eq!(&selected, &model);
            prop_assert_eq!(sampler.len(), model.len() as u64);
            let unselected: HashSet<u64> = sampler.unselected_elements().into_iter().collect();
            prop_assert!(selected.is_disjoint(&unselected));
            prop_assert_eq!(selected.len() + unselected.len(), sampler.max() as usize);
        }
    }
}

//! Unit and property tests for the weighted selection tree.

use proptest::{collection::vec, prelude::*};
use rstest::rstest;
use test_strategy::Arbitrary;

use super::*;
use crate::{random::SeededRandom, test_utils::suite_proptest_config};

const TOLERANCE: f64 = 1e-9;

fn sum_of_weights(tree: &SelectionTree<usize>) -> f64 {
    tree.iter().map(|(_, _, weight)| weight).sum()
}

#[test]
fn empty_tree_rejects_selection() {
    let tree = SelectionTree::<u8>::new();
    let mut random = SeededRandom::new(1);
    assert_eq!(tree.select(&mut random), Err(GraphError::EmptySelection));
    assert!(tree.total_weight().abs() < TOLERANCE);
}

#[test]
fn zero_weight_tree_rejects_selection() {
    let mut tree = SelectionTree::new();
    tree.insert(1_u8, 0.0);
    tree.insert(2_u8, 0.0);
    let mut random = SeededRandom::new(1);
    assert_eq!(tree.select(&mut random), Err(GraphError::EmptySelection));
}

#[rstest]
#[case::root_only(vec![0.0, 0.0, 5.0], 2)]
#[case::left_leaf(vec![0.0, 3.0, 0.0], 1)]
#[case::deep_leaf(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0], 6)]
fn single_positive_weight_is_always_selected(#[case] weights: Vec<f64>, #[case] expected: usize) {
    let mut tree = SelectionTree::new();
    for (item, weight) in weights.into_iter().enumerate() {
        tree.insert(item, weight);
    }
    let mut random = SeededRandom::new(17);
    for _ in 0..200 {
        assert_eq!(tree.select(&mut random), Ok(expected));
    }
}

#[test]
fn removal_moves_last_entry_and_keeps_sums() {
    let mut tree = SelectionTree::new();
    let handles: Vec<TreeHandle> = (0..6).map(|item| tree.insert(item, 1.0 + item as f64)).collect();
    assert_eq!(tree.remove(handles[1]), Ok(1));
    assert_eq!(tree.len(), 5);
    assert!((tree.total_weight() - 19.0).abs() < TOLERANCE);
    assert_eq!(tree.item(handles[5]), Ok(5));
    assert_eq!(
        tree.remove(handles[1]),
        Err(GraphError::StaleHandle {
            handle: handles[1].get()
        })
    );
}

#[test]
fn freed_handles_are_reused() {
    let mut tree = SelectionTree::new();
    let first = tree.insert(10_u32, 1.0);
    tree.insert(11_u32, 1.0);
    tree.remove(first).expect("live handle");
    let reused = tree.insert(12_u32, 4.0);
    assert_eq!(reused, first);
    assert_eq!(tree.item(reused), Ok(12));
    assert!((tree.weight(reused).expect("live handle") - 4.0).abs() < TOLERANCE);
}

#[test]
fn selection_frequencies_follow_weights() {
    let mut tree = SelectionTree::new();
    tree.insert(0_usize, 1.0);
    tree.insert(1_usize, 3.0);
    let mut random = SeededRandom::new(23);
    let draws = 20_000;
    let heavy = (0..draws)
        .filter(|_| tree.select(&mut random) == Ok(1))
        .count();
    let share = heavy as f64 / f64::from(draws);
    assert!((share - 0.75).abs() < 0.02, "heavy share {share}");
}

#[derive(Clone, Debug, Arbitrary)]
enum TreeOp {
    #[weight(4)]
    Insert(#[strategy(0.0_f64..100.0)] f64),
    #[weight(2)]
    Remove(usize),
    #[weight(3)]
    Reweight(usize, #[strategy(0.0_f64..100.0)] f64),
}

proptest! {
    #![proptest_config(suite_proptest_config(128))]

    #[test]
    fn accumulated_weight_matches_live_entries(ops in vec(any::<TreeOp>(), 1..96)) {
        let mut tree = SelectionTree::new();
        let mut live: Vec<TreeHandle> = Vec::new();
        let mut next_item = 0_usize;
        for op in ops {
            match op {
                TreeOp::Insert(weight) => {
                    live.push(tree.insert(next_item, weight));
                    next_item += 1;
                }
                TreeOp::Remove(pick) if !live.is_empty() => {
                    let handle = live.swap_remove(pick % live.len());
                    prop_assert!(tree.remove(handle).is_ok());
                }
                TreeOp::Reweight(pick, weight) if !live.is_empty() => {
                    let handle = live[pick % live.len()];
                    prop_assert!(tree.set_weight(handle, weight).is_ok());
                }
                TreeOp::Remove(_) | TreeOp::Reweight(..) => {}
            }
            prop_assert_eq!(tree.len(), live.len());
            let expected = sum_of_weights(&tree);
            prop_assert!((tree.total_weight() - expected).abs() < TOLERANCE * (1.0 + expected));
        }
    }
}

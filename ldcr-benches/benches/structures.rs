//! Weighted selection tree, domain sampler and gap-sequence benchmarks.
//!
//! These structures sit on the hot path of every small-scale operation, so
//! each is measured in isolation over growing sizes.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use ldcr_benches::{
    error::BenchSetupError,
    params::StructureBenchParams,
    workload::{SEED, weighted_tree, weights},
};
use ldcr_core::{DomainSampler, SeededRandom, binomial_gap_sequence, max_edge_count};

/// Structure sizes to benchmark.
const SIZES: &[usize] = &[1_000, 10_000, 100_000];

fn selection_tree_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("selection_tree");

    for &size in SIZES {
        let params = StructureBenchParams { size };
        let (tree, handles) = weighted_tree(size, SEED)?;

        group.bench_with_input(BenchmarkId::new("select", params), &tree, |b, tree| {
            let mut random = SeededRandom::new(SEED);
            b.iter(|| tree.select(&mut random));
        });

        let replacements = weights(size, SEED.wrapping_add(1));
        group.bench_with_input(
            BenchmarkId::new("set_weight", params),
            &(tree, handles, replacements),
            |b, (tree, handles, replacements)| {
                let mut tree = tree.clone();
                let mut cursor = handles.iter().zip(replacements.iter()).cycle();
                b.iter(|| {
                    cursor
                        .next()
                        .map(|(handle, weight)| tree.set_weight(*handle, *weight))
                });
            },
        );
    }

    group.finish();
    Ok(())
}

fn selection_tree(c: &mut Criterion) {
    if let Err(err) = selection_tree_impl(c) {
        panic!("selection_tree benchmark setup failed: {err}");
    }
}

fn domain_sampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("domain_sampler");

    for &size in SIZES {
        let params = StructureBenchParams { size };
        let domain = size as u64;
        group.bench_with_input(BenchmarkId::new("churn", params), &domain, |b, &domain| {
            let mut random = SeededRandom::new(SEED);
            let mut sampler = DomainSampler::new(domain);
            while sampler.len() < domain / 2 {
                if sampler.select_random(&mut random).is_err() {
                    break;
                }
            }
            b.iter(|| {
                let selected = sampler.select_random(&mut random);
                let deleted = sampler.delete_random(&mut random);
                (selected, deleted)
            });
        });
    }

    group.finish();
}

fn gap_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("binomial_gap_sequence");

    for &size in SIZES {
        let params = StructureBenchParams { size };
        let pairs = max_edge_count(size as u64);
        group.bench_with_input(BenchmarkId::new("p=0.001", params), &pairs, |b, &pairs| {
            let mut random = SeededRandom::new(SEED);
            b.iter(|| binomial_gap_sequence(0.001, pairs, &mut random));
        });
    }

    group.finish();
}

criterion_group!(benches, selection_tree, domain_sampler, gap_sequence);
criterion_main!(benches);

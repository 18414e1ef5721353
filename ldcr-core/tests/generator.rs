//! Whole generation runs driven through the public API.

use ldcr_core::{
    GraphBuilder, GraphEvent, Generator, InstanceParams, InterDensity, IntraDensity, NullJournal,
    ProcessParams, SeededRandom, run_batch,
};
use ldcr_test_support::recording::RecordingLayer;
use rstest::{fixture, rstest};

#[fixture]
fn instance() -> InstanceParams {
    InstanceParams::builder(40, 4)
        .with_skew(1.5)
        .with_intra(IntraDensity::Degree(4.0))
        .with_inter(InterDensity::Degree(1.0))
        .build()
        .expect("instance is valid")
}

#[rstest]
fn stepping_keeps_every_invariant(instance: InstanceParams) {
    let process = ProcessParams {
        p_omega: 0.3,
        eta: 6,
        t_max: 80,
        ..ProcessParams::default()
    };
    let mut generator = Generator::new(&instance, process, GraphBuilder::new().with_rng_seed(17))
        .expect("generator is valid");
    for step in 0..process.t_max {
        generator.run_step().expect("step succeeds");
        let violations = generator.graph().invariants().collect_all();
        assert!(violations.is_empty(), "step {step}: {violations:?}");
        let graph = generator.graph();
        assert_eq!(graph.running_operations().is_empty(), graph.clusterings_agree());
    }
    assert_eq!(generator.summary().time_step, process.t_max);
}

#[rstest]
fn journal_closes_every_step(instance: InstanceParams) {
    let process = ProcessParams {
        t_max: 12,
        ..ProcessParams::default()
    };
    let mut generator =
        Generator::new(&instance, process, GraphBuilder::new()).expect("generator is valid");
    generator.run().expect("run succeeds");
    let steps = generator
        .graph()
        .journal()
        .graph_events()
        .iter()
        .filter(|event| **event == GraphEvent::NextStep)
        .count();
    assert_eq!(steps, 12);
}

#[rstest]
fn custom_sources_drive_the_same_run(instance: InstanceParams) {
    let process = ProcessParams {
        eta: 3,
        t_max: 25,
        ..ProcessParams::default()
    };
    let builder = GraphBuilder::new().with_rng_seed(3);
    let recorded = Generator::new(&instance, process, builder.clone())
        .expect("generator is valid")
        .run()
        .expect("run succeeds");
    let silent = Generator::with_sources(&instance, process, builder, SeededRandom::new(3), NullJournal)
        .expect("generator is valid")
        .run()
        .expect("run succeeds");
    assert_eq!(recorded, silent);
}

#[rstest]
fn batch_runs_differ_but_are_stable(instance: InstanceParams) {
    let process = ProcessParams {
        p_omega: 0.1,
        eta: 4,
        t_max: 30,
        ..ProcessParams::default()
    };
    let builder = GraphBuilder::new().with_rng_seed(2024);
    let first = run_batch(&instance, process, &builder, 3).expect("batch succeeds");
    let second = run_batch(&instance, process, &builder, 3).expect("batch succeeds");
    assert_eq!(first, second);
    assert!(first.iter().all(|summary| summary.time_step == 30));
    assert_ne!(first[0], first[1]);
}

#[rstest]
fn run_emits_a_summary_event(instance: InstanceParams) {
    let layer = RecordingLayer::default();
    let guard = layer.install();
    let process = ProcessParams {
        t_max: 5,
        ..ProcessParams::default()
    };
    let summary = Generator::new(&instance, process, GraphBuilder::new())
        .expect("generator is valid")
        .run()
        .expect("run succeeds");
    drop(guard);

    let spans = layer.spans_named("generator.run");
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].fields.get("steps").map(String::as_str), Some("5"));
    let events = layer.events_with_message("generation finished");
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].fields.get("nodes"),
        Some(&summary.nodes.to_string())
    );
}

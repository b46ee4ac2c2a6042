//! Spans and events emitted by the pipelines.

use graphlets_core::{ExhaustiveOptions, GraphletError, WalkSamplerOptions, generators};
use graphlets_test_support::tracing::RecordingLayer;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

#[test]
fn exhaustive_run_records_its_span() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let pipeline = ExhaustiveOptions::new(3).build().expect("valid options");

    let report = tracing::subscriber::with_default(subscriber, || {
        pipeline.run(generators::cycle(10).expect("cycle"))
    })
    .expect("census succeeds");
    assert_eq!(report.motifs, 10);

    let span = layer
        .span("sampling.exhaustive")
        .expect("sampling.exhaustive span must exist");
    assert_eq!(span.fields.get("size"), Some(&"3".to_owned()));
    assert_eq!(span.fields.get("vertices"), Some(&"10".to_owned()));

    let finished = layer
        .events_with_message("exhaustive census finished")
        .pop()
        .expect("completion event must exist");
    assert_eq!(finished.level, Level::INFO);
    assert_eq!(finished.fields.get("motifs"), Some(&"10".to_owned()));
}

#[test]
fn failing_walk_start_records_the_error() {
    let layer = RecordingLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let pipeline = WalkSamplerOptions::new(5, 1, 1)
        .build()
        .expect("valid options");

    let err = tracing::subscriber::with_default(subscriber, || {
        pipeline.run(generators::path(3).expect("path"))
    })
    .expect_err("no graphlet of five vertices exists");
    assert!(matches!(err, GraphletError::NoStartingGraphlet { .. }));

    assert!(layer.span("sampling.random_walk").is_some());
    assert!(
        layer
            .events()
            .iter()
            .any(|event| event.level == Level::ERROR),
        "instrumented errors must be logged"
    );
}

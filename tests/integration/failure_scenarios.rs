//! Failure tests for the probe engine
//!
//! A run has to finish and account for every target even when:
//! - targets are unreachable or malformed
//! - the sink cannot be written
//! - the consumer goes away mid-run

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use url_prober::Target;
use url_prober::config::SinkFormat;
use url_prober::observer::RunEvent;
use url_prober::storage::{JsonFileSink, MemorySink};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_unwritable_sink_does_not_stop_collection() {
    let mock_server = start_mock_endpoints(Duration::from_millis(10)).await;
    let dir = tempfile::tempdir().unwrap();

    // A directory cannot be opened for appending
    let sink = Arc::new(JsonFileSink::new(dir.path(), SinkFormat::Lines));
    let reporter = capturing_reporter();
    let engine = create_test_engine(Duration::from_secs(5), None, sink, reporter.clone());

    let targets: Vec<Target> = (0..5)
        .map(|_| Target::new(format!("{}/ok", mock_server.uri())))
        .collect();
    let summary = engine
        .collector
        .collect(engine.dispatcher.run(targets))
        .await;

    assert_eq!(summary.total, 5);
    assert_eq!(summary.success, 5);
    assert_eq!(summary.sink_failures, 5);

    // Console output still happens for every result
    assert_eq!(captured_lines(&reporter).len(), 5);
    assert_eq!(
        engine
            .observer
            .count_matching(|e| matches!(e, RunEvent::SinkWriteFailed { .. })),
        5
    );
}

#[tokio::test]
async fn test_all_targets_unreachable() {
    let sink = Arc::new(MemorySink::new());
    let engine = create_test_engine(
        Duration::from_secs(2),
        None,
        sink.clone(),
        capturing_reporter(),
    );

    let targets: Vec<Target> = (0..4).map(|_| Target::new(closed_port_url())).collect();
    let summary = engine
        .collector
        .collect(engine.dispatcher.run(targets))
        .await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.network_error, 4);
    assert!(sink.records().iter().all(|r| r.status_code == 0));
    assert_eq!(
        engine
            .observer
            .count_matching(|e| matches!(e, RunEvent::NetworkFailed { .. })),
        4
    );
}

#[tokio::test]
async fn test_malformed_targets_are_recorded() {
    let sink = Arc::new(MemorySink::new());
    let engine = create_test_engine(
        Duration::from_secs(2),
        None,
        sink.clone(),
        capturing_reporter(),
    );

    let targets = vec![
        Target::new(""),
        Target::new("::::"),
        Target::new("just some words"),
    ];
    let summary = engine
        .collector
        .collect(engine.dispatcher.run(targets))
        .await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.request_build_error, 3);

    let records = sink.records();
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.status_code == 0 && r.duration_ms == 0));
}

#[tokio::test]
async fn test_server_errors_are_not_network_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/unavailable"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let sink = Arc::new(MemorySink::new());
    let engine = create_test_engine(
        Duration::from_secs(5),
        None,
        sink.clone(),
        capturing_reporter(),
    );

    let target = Target::new(format!("{}/unavailable", mock_server.uri()));
    let summary = engine
        .collector
        .collect(engine.dispatcher.run(vec![target]))
        .await;

    assert_eq!(summary.non_ok_status, 1);
    assert_eq!(summary.network_error, 0);
    assert_eq!(sink.records()[0].status_code, 503);
}

#[tokio::test]
async fn test_dropped_consumer_still_completes_run() {
    let mock_server = start_mock_endpoints(Duration::from_millis(50)).await;
    let engine = create_test_engine(
        Duration::from_secs(5),
        None,
        Arc::new(MemorySink::new()),
        capturing_reporter(),
    );

    let targets: Vec<Target> = (0..8)
        .map(|_| Target::new(format!("{}/slow", mock_server.uri())))
        .collect();

    let mut stream = engine.dispatcher.run(targets);
    let first = stream.next().await;
    assert!(first.is_some());
    drop(stream);

    // Every prober still finishes and the channel is closed exactly once
    tokio::time::timeout(Duration::from_secs(5), async {
        while engine
            .observer
            .count_matching(|e| matches!(e, RunEvent::ChannelClosed))
            == 0
        {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("channel should close after the last prober");

    assert_eq!(
        engine
            .observer
            .count_matching(|e| matches!(e, RunEvent::ProbeCompleted { .. })),
        8
    );
    // One more result may have been sitting in the channel buffer
    let dropped = engine
        .observer
        .count_matching(|e| matches!(e, RunEvent::ResultDropped { .. }));
    assert!((6..=7).contains(&dropped), "dropped {dropped}");
    assert_eq!(
        engine
            .observer
            .count_matching(|e| matches!(e, RunEvent::ChannelClosed)),
        1
    );
}

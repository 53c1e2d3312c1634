//! End-to-end tests of the probe pipeline
//!
//! Targets go through dispatch, probing and collection and land in a real
//! sink file and a captured console.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use url_prober::config::{ProbeConfig, SinkConfig, SinkFormat};
use url_prober::observer::{RecordingObserver, RunEvent};
use url_prober::runner::ProbeRun;
use url_prober::storage::{JsonFileSink, SinkRecord, read_records};
use url_prober::{ProbeOutcome, Target};

use crate::helpers::*;

#[tokio::test]
async fn test_ok_timeout_and_blank_targets() {
    let mock_server = start_mock_endpoints(Duration::from_secs(3)).await;
    let ok = format!("{}/ok", mock_server.uri());
    let slow = format!("{}/slow", mock_server.uri());

    let dir = tempfile::tempdir().unwrap();
    let sink_path = dir.path().join("results.txt");
    let sink = Arc::new(JsonFileSink::new(&sink_path, SinkFormat::Lines));
    let reporter = capturing_reporter();

    let timeout = Duration::from_millis(300);
    let engine = create_test_engine(timeout, None, sink, reporter.clone());

    let targets = vec![
        Target::new(ok.clone()),
        Target::new(slow.clone()),
        Target::new(""),
    ];
    let summary = engine
        .collector
        .collect(engine.dispatcher.run(targets))
        .await;

    assert_eq!(summary.total, 3);
    assert_eq!(summary.success, 1);
    assert_eq!(summary.network_error, 1);
    assert_eq!(summary.request_build_error, 1);
    assert_eq!(summary.sink_failures, 0);

    let mut records = read_records(&sink_path).await.unwrap();
    records.sort_by(|a, b| a.url.cmp(&b.url));
    assert_eq!(records.len(), 3);

    // "" sorts first, then the /ok and /slow URLs
    assert_eq!(records[0].url, "");
    assert_eq!(records[0].status_code, 0);
    assert_eq!(records[0].duration_ms, 0);

    assert_eq!(records[1].url, ok);
    assert_eq!(records[1].status_code, 200);

    assert_eq!(records[2].url, slow);
    assert_eq!(records[2].status_code, 0);
    assert!(records[2].duration_ms >= 300, "got {}ms", records[2].duration_ms);
    assert!(records[2].duration_ms < 3000, "got {}ms", records[2].duration_ms);

    let lines = captured_lines(&reporter);
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().any(|l| l.contains(&ok) && l.contains("status=200")));
    assert!(lines.iter().any(|l| l.contains(&slow) && l.contains("network error")));
    assert!(lines.iter().any(|l| l.contains("<empty>")));
}

#[tokio::test]
async fn test_non_ok_status_is_kept() {
    let mock_server = start_mock_endpoints(Duration::from_millis(10)).await;
    let missing = format!("{}/missing", mock_server.uri());

    let dir = tempfile::tempdir().unwrap();
    let sink_path = dir.path().join("results.txt");
    let sink = Arc::new(JsonFileSink::new(&sink_path, SinkFormat::Lines));
    let reporter = capturing_reporter();
    let engine = create_test_engine(Duration::from_secs(5), None, sink, reporter.clone());

    let summary = engine
        .collector
        .collect(engine.dispatcher.run(vec![Target::new(missing.clone())]))
        .await;

    assert_eq!(summary.non_ok_status, 1);

    let records = read_records(&sink_path).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, missing);
    assert_eq!(records[0].status_code, 404);

    let lines = captured_lines(&reporter);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("status=404"));

    assert!(engine.observer.events().contains(&RunEvent::NonOkStatus {
        url: missing,
        status: 404,
    }));
}

#[tokio::test]
async fn test_probe_run_from_target_file() {
    let mock_server = start_mock_endpoints(Duration::from_millis(10)).await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    let output = dir.path().join("results.txt");
    std::fs::write(
        &input,
        format!(
            "{uri}/ok\n{uri}/missing\n{uri}/broken\n\n",
            uri = mock_server.uri()
        ),
    )
    .unwrap();

    let config = ProbeConfig {
        input,
        sink: SinkConfig::File {
            path: output.clone(),
            format: SinkFormat::Pretty,
        },
        ..ProbeConfig::default()
    };

    let observer = Arc::new(RecordingObserver::new());
    let reporter = capturing_reporter();
    let run = ProbeRun::new(config)
        .with_reporter(reporter.clone())
        .with_observer(observer.clone());

    let summary = run.execute().await.unwrap();

    assert_eq!(summary.total, 4);
    assert_eq!(summary.success, 1);
    assert_eq!(summary.non_ok_status, 2);
    assert_eq!(summary.request_build_error, 1);

    let mut status_codes: Vec<u16> = read_records(&output)
        .await
        .unwrap()
        .iter()
        .map(|r| r.status_code)
        .collect();
    status_codes.sort();
    assert_eq!(status_codes, vec![0, 200, 404, 500]);

    assert_eq!(captured_lines(&reporter).len(), 4);

    let events = observer.events();
    assert_eq!(events.first(), Some(&RunEvent::TargetsLoaded { count: 4 }));
    assert!(matches!(events.last(), Some(RunEvent::RunFinished { summary: s }) if s.total == 4));
}

#[tokio::test]
async fn test_every_outcome_completes_once() {
    let mock_server = start_mock_endpoints(Duration::from_millis(10)).await;
    let reporter = capturing_reporter();
    let sink = Arc::new(url_prober::storage::MemorySink::new());
    let engine = create_test_engine(Duration::from_secs(5), None, sink.clone(), reporter);

    let targets = vec![
        Target::new(format!("{}/ok", mock_server.uri())),
        Target::new(format!("{}/missing", mock_server.uri())),
        Target::new(closed_port_url()),
        Target::new("not a url"),
    ];
    engine
        .collector
        .collect(engine.dispatcher.run(targets))
        .await;

    let mut outcomes: Vec<ProbeOutcome> = engine
        .observer
        .events()
        .into_iter()
        .filter_map(|e| match e {
            RunEvent::ProbeCompleted { outcome, .. } => Some(outcome),
            _ => None,
        })
        .collect();
    outcomes.sort_by_key(|o| o.as_str());

    assert_eq!(
        outcomes,
        vec![
            ProbeOutcome::NetworkError,
            ProbeOutcome::NonOkStatus,
            ProbeOutcome::RequestBuildError,
            ProbeOutcome::Success,
        ]
    );

    let records: Vec<SinkRecord> = sink.records();
    assert_eq!(records.len(), 4);
}

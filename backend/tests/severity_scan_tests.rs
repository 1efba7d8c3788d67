mod support;

use std::sync::Arc;
use std::time::Duration;

use medlyf_crew::config::SeveritySettings;
use medlyf_crew::severity::{JsonLinesSink, LocalSink, RecordSink, SeverityScanner};
use medlyf_crew::{CrewError, ModelContext};
use support::temp_file;

const OUTBREAKS: &str = "\
disease,year,month,reported_cases
Dengue,2023,Jan,120
Dengue,2023,Feb,120
Dengue,2023,Mar,120
Malaria,2023,January,600
Malaria,2023,March,600
Malaria,2023,March,600
Cholera,2023,Jan,5
Cholera,2023,Feb,7
Typhoid,2023,Jan,n/a
";

fn context() -> Arc<ModelContext> {
    let settings = SeveritySettings {
        models: vec!["dengue".to_string(), "malaria".to_string()],
        ..Default::default()
    };
    Arc::new(ModelContext::from_settings(&settings).unwrap())
}

#[tokio::test]
async fn test_scan_stores_one_record_per_modelled_disease() {
    let csv = temp_file(".csv", OUTBREAKS);
    let dir = tempfile::tempdir().unwrap();
    let records_path = dir.path().join("records").join("severity.jsonl");
    let sink: Arc<dyn RecordSink> = Arc::new(JsonLinesSink::new(&records_path));
    let scanner = SeverityScanner::new(csv.path(), context(), Arc::clone(&sink));

    let report = scanner.run_scan().await.unwrap();

    let saved: Vec<&str> = report.saved.iter().map(|r| r.disease.as_str()).collect();
    assert_eq!(saved, vec!["Dengue", "Malaria"]);
    assert!(report.saved.iter().all(|r| r.created_at.is_some()));
    assert_eq!(report.failed_saves, 0);

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].disease, "Cholera");
    assert_eq!(report.skipped[0].reason, "No AI model for Cholera");

    let dengue = &report.saved[0];
    assert_eq!(dengue.predicted_cases, 120);
    assert_eq!(dengue.predicted_date.to_string(), "2023-04-01");
    assert_eq!(dengue.severity, "Moderate");

    // February is missing for Malaria and counts as zero cases; March sums to 1200.
    let malaria = &report.saved[1];
    assert_eq!(malaria.predicted_date.to_string(), "2023-04-01");
    assert_eq!(malaria.severity, "Severe");

    let stored = sink.recent(10).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].disease, "Malaria");
    assert!(records_path.exists());
}

#[tokio::test]
async fn test_scan_of_missing_table_is_input_error() {
    let scanner = SeverityScanner::new(
        "/nonexistent/outbreaks.csv",
        context(),
        Arc::new(LocalSink::new()),
    );
    let err = scanner.run_scan().await.unwrap_err();
    assert!(err.is_input());
    assert!(matches!(err, CrewError::Input { .. }));
}

#[tokio::test]
async fn test_repeated_scans_append_records() {
    let csv = temp_file(".csv", OUTBREAKS);
    let sink = Arc::new(LocalSink::new());
    let scanner = SeverityScanner::new(csv.path(), context(), sink.clone());

    scanner.run_scan().await.unwrap();
    scanner.run_scan().await.unwrap();

    assert_eq!(sink.len(), 4);
}

#[tokio::test]
async fn test_run_every_scans_immediately_and_keeps_going() {
    let csv = temp_file(".csv", OUTBREAKS);
    let sink = Arc::new(LocalSink::new());
    let scanner = SeverityScanner::new(csv.path(), context(), sink.clone());

    let handle = tokio::spawn(async move { scanner.run_every(Duration::from_millis(50)).await });
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while sink.len() < 4 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    assert!(sink.len() >= 4, "expected at least two scans, got {} records", sink.len());
}

#[tokio::test]
async fn test_run_every_survives_unreadable_table() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("outbreaks.csv");
    let sink = Arc::new(LocalSink::new());
    let scanner = SeverityScanner::new(&csv_path, context(), sink.clone());

    let handle = tokio::spawn(async move { scanner.run_every(Duration::from_millis(20)).await });

    // The first scans fail; the table shows up later and is picked up.
    tokio::time::sleep(Duration::from_millis(50)).await;
    std::fs::write(&csv_path, OUTBREAKS).unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while sink.is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    assert!(!sink.is_empty());
}

#[tokio::test]
async fn test_spelling_variants_produce_one_record() {
    let csv = temp_file(
        ".csv",
        "disease,year,month,reported_cases\n\
         COVID-19,2023,Jan,4\n\
         covid 19,2023,Feb,4\n\
         Covid_19,2023,Mar,4\n",
    );
    let settings = SeveritySettings {
        models: vec!["covid 19".to_string()],
        ..Default::default()
    };
    let context = Arc::new(ModelContext::from_settings(&settings).unwrap());
    let sink = Arc::new(LocalSink::new());
    let scanner = SeverityScanner::new(csv.path(), context, sink.clone());

    let report = scanner.run_scan().await.unwrap();

    assert_eq!(report.saved.len(), 1);
    assert!(report.skipped.is_empty());
    let record = &report.saved[0];
    assert_eq!(record.disease, "COVID-19");
    assert_eq!(record.predicted_cases, 4);
    assert_eq!(record.predicted_date.to_string(), "2023-04-01");
    assert_eq!(sink.len(), 1);
}

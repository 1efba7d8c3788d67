//! Ingress API wired to a live router over the in-process bus.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use medlyf_crew::bus::{EventBus, LocalBus};
use medlyf_crew::config::SeveritySettings;
use medlyf_crew::http::{create_router, AppState};
use medlyf_crew::jobs::InMemoryJobClient;
use medlyf_crew::severity::{LocalSink, SeverityScanner};
use medlyf_crew::{EventRouter, ModelContext};
use support::{daily_series_csv, event_types, temp_file, wait_for_history};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_upload_through_api_produces_forecast() {
    let bus = LocalBus::default();
    let shared: Arc<dyn EventBus> = Arc::new(bus.clone());
    let router = EventRouter::new(
        Arc::new(ModelContext::fallback_only()),
        80.0,
        Arc::clone(&shared),
        Arc::new(InMemoryJobClient::default()),
    );
    let stream = shared.subscribe().await.unwrap();
    let handle = tokio::spawn(async move { router.run(stream).await });

    let csv = daily_series_csv(&[30.0, 40.0, 50.0]);
    let app = create_router(AppState::new(shared, Arc::new(LocalSink::new())));
    let response = app
        .oneshot(post_json(
            "/v1/uploads",
            json!({"hospital_id": "H9", "file_path": csv.path().display().to_string()}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let accepted = body_json(response).await;
    assert_eq!(accepted["event_type"], "data_uploaded");
    assert_eq!(accepted["hospital_id"], "H9");

    let history = wait_for_history(&bus, 3).await;
    handle.abort();

    assert_eq!(
        event_types(&history),
        vec!["data_uploaded", "prediction_ready", "optimized_plan"]
    );
    let prediction: Value = serde_json::from_str(&history[1]).unwrap();
    assert_eq!(prediction["model_meta"]["model"], "moving_average");
    assert_eq!(prediction["predictions"][0]["yhat"], 40.0);
}

#[tokio::test]
async fn test_upload_accepts_series_source_alias() {
    let bus = Arc::new(LocalBus::default());
    let app = create_router(AppState::new(bus.clone(), Arc::new(LocalSink::new())));

    let response = app
        .oneshot(post_json(
            "/v1/uploads",
            json!({"hospital_id": "H1", "series_source": "/data/h1.csv"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let published: Value = serde_json::from_str(&bus.history()[0]).unwrap();
    assert_eq!(published["file_path"], "/data/h1.csv");
}

#[tokio::test]
async fn test_scan_then_list_severity() {
    let csv = temp_file(
        ".csv",
        "disease,date,cases\n\
         Dengue,2023-01-15,80\n\
         Dengue,2023-01-20,40\n\
         Dengue,2023-02-10,120\n\
         Dengue,2023-03-05,120\n",
    );
    let settings = SeveritySettings {
        models: vec!["dengue".to_string()],
        ..Default::default()
    };
    let context = Arc::new(ModelContext::from_settings(&settings).unwrap());
    let sink = Arc::new(LocalSink::new());
    let scanner = SeverityScanner::new(csv.path(), context, sink.clone());
    let state = AppState::new(Arc::new(LocalBus::default()), sink).with_scanner(scanner);
    let app = create_router(state);

    let response = app
        .clone()
        .oneshot(Request::post("/v1/severity/scan").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let report = body_json(response).await;
    assert_eq!(report["saved"].as_array().unwrap().len(), 1);
    assert_eq!(report["saved"][0]["predicted_cases"], 120);
    assert_eq!(report["saved"][0]["predicted_date"], "2023-04-01");

    let response = app
        .oneshot(Request::get("/v1/severity?limit=5").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["total"], 1);
    assert_eq!(listed["records"][0]["disease"], "Dengue");
    assert_eq!(listed["records"][0]["severity"], "Moderate");
    assert!(listed["records"][0]["created_at"].is_string());
}

#[tokio::test]
async fn test_scan_of_missing_table_is_unprocessable() {
    let scanner = SeverityScanner::new(
        "/nonexistent/outbreaks.csv",
        Arc::new(ModelContext::fallback_only()),
        Arc::new(LocalSink::new()),
    );
    let state = AppState::new(Arc::new(LocalBus::default()), Arc::new(LocalSink::new()))
        .with_scanner(scanner);

    let response = create_router(state)
        .oneshot(Request::post("/v1/severity/scan").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

//! End-to-end tests for the ingest pipeline over in-memory stores.
//!
//! POST /events → durable commit → retrying indexer → enrichment worker,
//! through the real router.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use engine_core::StoreError;
use integration_tests::{
    fixtures,
    mocks::{IndexMode, InMemoryAnalyticsStore, InMemoryDurableStore, RecordingEnricher},
    setup::{build_app, TestContext},
};
use pipeline::RetryPolicy;

/// Healthy stores: accepted, one durable record, one analytics document.
#[tokio::test]
async fn test_healthy_stores_accept_event() {
    let ctx = TestContext::new();

    let response = ctx.server.post("/events").json(&fixtures::scenario_event()).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, serde_json::json!({"status": "accepted"}));

    assert_eq!(ctx.durable.count(), 1);
    assert_eq!(ctx.analytics.count(), 1);
    assert_eq!(ctx.analytics.index_attempts(), 1);

    let record = &ctx.durable.records()[0];
    let doc = &ctx.analytics.documents()[0];
    assert_eq!(record.source, "ids");
    assert_eq!(doc.host, "h1");
    assert_eq!(doc.severity, "high");
    assert_eq!(doc.timestamp, record.timestamp);
}

/// A successful POST shows up in both listings.
#[tokio::test]
async fn test_accepted_event_is_visible_in_both_stores() {
    let ctx = TestContext::new();

    ctx.server
        .post("/events")
        .json(&fixtures::scenario_event())
        .await
        .assert_status_ok();

    let search: serde_json::Value = ctx.server.get("/events").await.json();
    assert_eq!(search["count"], 1);
    assert_eq!(search["events"][0]["message"], "m");

    let durable: serde_json::Value = ctx.server.get("/mongo/events").await.json();
    assert_eq!(durable["count"], 1);
    assert_eq!(durable["events"][0]["severity"], "high");
    assert!(durable["events"][0]["_id"].is_string());
}

/// Analytics store down for every attempt: 503, durable record kept.
#[tokio::test]
async fn test_analytics_outage_returns_503_and_keeps_durable_record() {
    let ctx = TestContext::new();
    ctx.analytics.set_mode(IndexMode::Down);

    let response = ctx.server.post("/events").json(&fixtures::scenario_event()).await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json();
    assert_eq!(body["detail"], "Search backend unavailable");

    assert_eq!(ctx.durable.count(), 1);
    assert_eq!(ctx.analytics.count(), 0);
    assert_eq!(ctx.analytics.index_attempts(), 3);
    assert!(ctx.enricher.jobs().is_empty());
}

/// Two connectivity failures are absorbed by the retry budget.
#[tokio::test]
async fn test_transient_outage_is_retried() {
    let ctx = TestContext::new();
    ctx.analytics.set_mode(IndexMode::ConnectivityFailures(2));

    let response = ctx.server.post("/events").json(&fixtures::scenario_event()).await;

    response.assert_status_ok();
    assert_eq!(ctx.analytics.index_attempts(), 3);
    assert_eq!(ctx.analytics.count(), 1);
}

/// A rejected analytics write is not retried and surfaces as a generic 500.
#[tokio::test]
async fn test_analytics_rejection_returns_500_without_retry() {
    let ctx = TestContext::new();
    ctx.analytics.set_mode(IndexMode::Rejecting);

    let response = ctx.server.post("/events").json(&fixtures::scenario_event()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["detail"], "Ingestion failed");
    assert_eq!(ctx.analytics.index_attempts(), 1);
    assert_eq!(ctx.durable.count(), 1);
}

/// A durable store failure stops the pipeline before indexing.
#[tokio::test]
async fn test_durable_failure_skips_indexing() {
    let ctx = TestContext::new();
    ctx.durable
        .set_failure(Some(StoreError::connectivity("server selection timeout")));

    let response = ctx.server.post("/events").json(&fixtures::scenario_event()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["detail"], "Ingestion failed");
    assert_eq!(ctx.analytics.index_attempts(), 0);
}

/// Enrichment runs once per accepted event, after the response.
#[tokio::test]
async fn test_enrichment_runs_for_accepted_event() {
    let ctx = TestContext::new();

    ctx.server
        .post("/events")
        .json(&fixtures::scenario_event())
        .await
        .assert_status_ok();

    ctx.wait_for_enrichment(1).await;
    let job = &ctx.enricher.jobs()[0];
    assert_eq!(job.event.source, "ids");
    assert_eq!(job.durable_id, ctx.durable.records()[0].id);
    assert_eq!(job.analytics_id, ctx.analytics.documents()[0].doc_id);
}

/// A failing enricher never changes the response.
#[tokio::test]
async fn test_enrichment_failure_does_not_affect_response() {
    let ctx = TestContext::with_enricher(RecordingEnricher::failing());

    for _ in 0..3 {
        let response = ctx.server.post("/events").json(&fixtures::scenario_event()).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "accepted");
    }

    ctx.wait_for_enrichment(3).await;
    assert_eq!(ctx.durable.count(), 3);
    assert_eq!(ctx.analytics.count(), 3);
}

/// A client that hangs up during the retry backoff does not stop the
/// ingest: the retry still runs and the event is indexed.
#[tokio::test]
async fn test_client_disconnect_mid_retry_still_indexes() {
    let durable = InMemoryDurableStore::new();
    let analytics = InMemoryAnalyticsStore::new();
    analytics.set_mode(IndexMode::ConnectivityFailures(1));
    let enricher = RecordingEnricher::new();

    let (router, _enrichment) = build_app(
        Arc::new(durable.clone()),
        Arc::new(analytics.clone()),
        Arc::new(enricher.clone()),
        RetryPolicy {
            max_attempts: 3,
            backoff_unit_ms: 300,
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    // Gives up well inside the 300ms backoff after the first failed attempt.
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let err = client
        .post(format!("http://{}/events", addr))
        .json(&fixtures::scenario_event())
        .send()
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(durable.count(), 1);
    assert_eq!(analytics.index_attempts(), 2);
    assert_eq!(analytics.count(), 1);
    assert_eq!(enricher.jobs().len(), 1);

    server.abort();
}

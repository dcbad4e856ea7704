//! Integration tests for the query server
//!
//! These tests verify that:
//! - `GET /` answers 400 until the first sample exists
//! - Totals and mappings are served once populated
//! - `/health` reports readiness
//! - A full scheduler → store → server pipeline works end to end

use std::net::SocketAddr;
use std::sync::Arc;

use fleetstats::{
    EndpointClass, StatsSample,
    actors::scheduler::{ManualTicker, SchedulerHandle},
    api::{ApiConfig, ApiState, spawn_api_server},
    discovery::Inventory,
    storage::{MemoryStore, StatsStore},
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::sync::broadcast;
use wiremock::MockServer;

use crate::helpers::*;

async fn spawn_test_api(store: Arc<dyn StatsStore>) -> SocketAddr {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(), // Random port
    };

    spawn_api_server(config, ApiState::new(store)).await.unwrap()
}

#[tokio::test]
async fn test_query_before_collection_is_bad_request() {
    let addr = spawn_test_api(Arc::new(MemoryStore::new())).await;

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "Requested stats before it was collected"
    );
}

#[tokio::test]
async fn test_single_sample_counted_once() {
    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let addr = spawn_test_api(store.clone()).await;

    store
        .put(
            EndpointClass::Uploader,
            "u1".into(),
            StatsSample::new(5, 500).with_version("1.5.0", "f00d"),
        )
        .await;

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["uploadstats"], json!({"numfiles": 5, "totalsize": 500}));
    assert_eq!(body["versioninfo"], json!({"version": "1.5.0", "gitrevision": "f00d"}));
    assert_eq!(body["uploaders"].as_object().unwrap().len(), 1);
    assert_eq!(body["viewers"], json!({}));
}

#[tokio::test]
async fn test_totals_span_both_classes() {
    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let addr = spawn_test_api(store.clone()).await;

    store
        .put(EndpointClass::Uploader, "u1".into(), StatsSample::new(5, 500))
        .await;
    store
        .put(EndpointClass::Uploader, "u2".into(), StatsSample::new(7, 700))
        .await;
    store
        .put(EndpointClass::Viewer, "v1".into(), StatsSample::new(1, 100))
        .await;

    let body: Value = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["uploadstats"]["numfiles"], json!(13));
    assert_eq!(body["uploadstats"]["totalsize"], json!(1300));
    assert_eq!(body["uploaders"]["u2"]["uploadstats"]["numfiles"], json!(7));
    assert_eq!(body["viewers"]["v1"]["uploadstats"]["totalsize"], json!(100));
}

#[tokio::test]
async fn test_totals_past_u64_max_served_exactly() {
    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let addr = spawn_test_api(store.clone()).await;

    store
        .put(EndpointClass::Uploader, "u1".into(), StatsSample::new(1, u64::MAX))
        .await;
    store
        .put(EndpointClass::Viewer, "v1".into(), StatsSample::new(1, 1))
        .await;

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Too large for a u64, so check the encoded text rather than a Value
    let text = response.text().await.unwrap();
    assert!(text.contains(r#""numfiles": 2"#), "{text}");
    assert!(text.contains(r#""totalsize": 18446744073709551616"#), "{text}");
}

#[tokio::test]
async fn test_health_reports_readiness() {
    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    let addr = spawn_test_api(store.clone()).await;

    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "ok", "ready": false}));

    store
        .put(EndpointClass::Viewer, "v1".into(), StatsSample::new(0, 0))
        .await;

    let body: Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "ok", "ready": true}));
}

#[tokio::test]
async fn test_pipeline_end_to_end() {
    let leaf = MockServer::start().await;
    mount_leaf(&leaf, EndpointClass::Uploader, create_leaf_json(5, 500, "1.0")).await;
    mount_leaf(&leaf, EndpointClass::Viewer, json!({
        "uploadstats": {"numfiles": 2, "totalsize": 200},
        "versioninfo": {"version": "1.0", "gitrevision": "rev-1.0"},
        "performancestats": {"downloads": 42}
    }))
    .await;

    let (collector, store) = create_collector(Inventory {
        uploaders: vec![entry("u1", &leaf)],
        viewers: vec![entry("v1", &leaf)],
    });
    let addr = spawn_test_api(store).await;

    let (_tick_tx, ticker) = ManualTicker::new();
    let (cycle_tx, _) = broadcast::channel(16);
    let (scheduler, task) = SchedulerHandle::spawn(collector, ticker, cycle_tx);

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let report = scheduler.run_now().await.unwrap();
    assert_eq!(report.stored, 2);

    let body: Value = reqwest::get(format!("http://{addr}/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["uploadstats"], json!({"numfiles": 7, "totalsize": 700}));
    assert_eq!(body["versioninfo"]["version"], json!("1.0"));
    assert_eq!(body["viewers"]["v1"]["performancestats"], json!({"downloads": 42}));

    scheduler.shutdown().await.unwrap();
    task.await.unwrap();
}

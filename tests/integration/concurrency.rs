//! Concurrency tests
//!
//! These tests verify that:
//! - Readers never observe a sample mixing two writes
//! - Fan-out handles a large fleet in one cycle
//! - Scheduler ticks and queries run side by side

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use fleetstats::{
    EndpointClass, StatsSample,
    actors::scheduler::{ManualTicker, SchedulerHandle},
    aggregate::AggregatedView,
    discovery::{InstanceEntry, Inventory},
    storage::{MemoryStore, StatsStore},
};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

fn consistent_sample(generation: u64) -> StatsSample {
    StatsSample::new(generation, generation * 10)
        .with_version(generation.to_string(), format!("rev-{generation}"))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_torn_samples() {
    let store: Arc<dyn StatsStore> = Arc::new(MemoryStore::new());
    store
        .put(EndpointClass::Uploader, "u1".into(), consistent_sample(0))
        .await;

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for generation in 1..=500u64 {
                store
                    .put(EndpointClass::Uploader, "u1".into(), consistent_sample(generation))
                    .await;
                tokio::task::yield_now().await;
            }
        })
    };

    let mut readers = vec![];
    for _ in 0..8 {
        let store = store.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..200 {
                let snapshot = store.snapshot().await;
                let sample = &snapshot.uploaders["u1"];
                let generation = sample.upload_stats.num_files;

                assert_eq!(sample.upload_stats.total_size, generation * 10);
                assert_eq!(sample.version_info.version, generation.to_string());
                assert_eq!(sample.version_info.git_revision, format!("rev-{generation}"));

                let view = AggregatedView::from_snapshot(snapshot).unwrap();
                assert_eq!(view.upload_stats.total_size, view.upload_stats.num_files * 10);
                tokio::task::yield_now().await;
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test]
async fn test_large_fleet_fan_out() {
    let server = MockServer::start().await;

    let request_count = Arc::new(AtomicUsize::new(0));
    let request_count_clone = request_count.clone();

    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(move |_req: &wiremock::Request| {
            request_count_clone.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(200).set_body_json(create_leaf_json(3, 30, "1.0"))
        })
        .mount(&server)
        .await;

    let fleet_size = 200;
    let uploaders: Vec<InstanceEntry> = (0..fleet_size)
        .map(|i| entry(&format!("uploader-{i}"), &server))
        .collect();

    let (collector, store) = create_collector(Inventory {
        uploaders,
        viewers: vec![],
    });

    let report = collector.run_cycle().await;
    assert_eq!(report.discovered, fleet_size);
    assert_eq!(report.stored, fleet_size);
    assert_eq!(request_count.load(Ordering::SeqCst), fleet_size);

    let view = AggregatedView::from_snapshot(store.snapshot().await).unwrap();
    assert_eq!(view.uploaders.len(), fleet_size);
    assert_eq!(view.upload_stats.num_files, 3 * fleet_size as u128);
    assert_eq!(view.upload_stats.total_size, 30 * fleet_size as u128);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queries_during_scheduled_cycles() {
    let server = MockServer::start().await;
    mount_leaf(&server, EndpointClass::Uploader, create_leaf_json(1, 10, "1.0")).await;
    mount_leaf(&server, EndpointClass::Viewer, create_leaf_json(2, 20, "1.0")).await;

    let (collector, store) = create_collector(Inventory {
        uploaders: (0..10).map(|i| entry(&format!("u{i}"), &server)).collect(),
        viewers: (0..10).map(|i| entry(&format!("v{i}"), &server)).collect(),
    });

    let (tick_tx, ticker) = ManualTicker::new();
    let (cycle_tx, mut cycle_rx) = broadcast::channel(16);
    let (scheduler, task) = SchedulerHandle::spawn(collector, ticker, cycle_tx);

    let reader = {
        let store = store.clone();
        tokio::spawn(async move {
            let mut last_len = 0;
            for _ in 0..500 {
                let snapshot = store.snapshot().await;
                // Entries are never removed
                assert!(snapshot.len() >= last_len);
                last_len = snapshot.len();
                tokio::task::yield_now().await;
            }
        })
    };

    for _ in 0..3 {
        tick_tx.send(()).unwrap();
    }
    for expected in 1..=3 {
        let event = cycle_rx.recv().await.unwrap();
        assert_eq!(event.cycle, expected);
        assert_eq!(event.report.stored, 20);
    }

    reader.await.unwrap();

    let view = AggregatedView::from_snapshot(store.snapshot().await).unwrap();
    assert_eq!(view.upload_stats.num_files, 10 + 20);
    assert_eq!(view.upload_stats.total_size, 100 + 200);

    scheduler.shutdown().await.unwrap();
    task.await.unwrap();
}

//! End-to-end runs against the bundled mock departure files.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use ptv_companion::cache::{CacheConfig, CachedProvider};
use ptv_companion::config::{
    CompanionConfig, ConfigStore, FileConfigStore, apply_response, configuration_url,
};
use ptv_companion::delivery::DeliveryPolicy;
use ptv_companion::device::DeviceInbox;
use ptv_companion::domain::{DisplayZone, Favourite, OutboundMessage, RouteType};
use ptv_companion::pipeline::{FetchPolicy, Pipeline, PipelineConfig, PipelineError};
use ptv_companion::ptv::MockPtvClient;

fn mock_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/mock_departures")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
}

fn pipeline_config() -> PipelineConfig {
    PipelineConfig::default()
        .with_fetch(FetchPolicy::new(1000, 0, 1))
        .with_delivery(DeliveryPolicy::new(2, 1))
        .with_zone(DisplayZone::Named(chrono_tz::UTC))
}

fn favourites() -> Vec<Favourite> {
    vec![
        Favourite::new("Tram to city", RouteType::TRAM, "2504", "5"),
        Favourite::new("Tram out", RouteType::TRAM, "2504", "6"),
        Favourite::new("Train", RouteType::TRAIN, "1071", "1"),
        Favourite::new("Train back", RouteType::TRAIN, "1071", "2"),
        Favourite::new("Missing bus", RouteType::BUS, "999", "0"),
    ]
}

fn store_with(config: CompanionConfig) -> (tempfile::TempDir, Arc<FileConfigStore>) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileConfigStore::new(dir.path().join("config.json")));
    store.set(&config).unwrap();
    (dir, store)
}

#[tokio::test]
async fn full_run_against_mock_files() {
    let provider = MockPtvClient::load(mock_dir()).unwrap();
    let (_dir, store) = store_with(CompanionConfig::new("token", favourites()));
    let pipeline = Pipeline::new(provider.clone(), store, pipeline_config());
    let inbox = Arc::new(DeviceInbox::new());

    let report = pipeline.run(inbox.clone(), now()).await.unwrap();

    assert_eq!(report.plan.queries, 3);
    assert_eq!(provider.call_count(), 3);
    assert_eq!(report.plan.failures.len(), 1);
    assert_eq!(report.delivery.delivered, 3);

    let results: Vec<(String, u16, f64)> = report
        .plan
        .messages
        .iter()
        .map(|m| match m {
            OutboundMessage::Departure(r) => (r.name.clone(), r.time, r.minutes),
            OutboundMessage::NotConfigured => panic!("unexpected sentinel"),
        })
        .collect();
    assert_eq!(
        results,
        vec![
            ("Tram to city".to_string(), 8 * 60 + 4, 6.0),
            ("Tram out".to_string(), 7 * 60 + 59, 1.0),
            ("Train".to_string(), 8 * 60 + 15, 14.5),
        ]
    );

    let screen = inbox.screen();
    let rows = screen.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].clock(), "8:04");
    assert_eq!(rows[0].countdown(), "6 min");
    assert_eq!(rows[1].clock(), "7:59");
    assert_eq!(rows[2].countdown(), "14 min");
}

#[tokio::test]
async fn missing_config_prompts_device() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileConfigStore::new(dir.path().join("absent.json")));
    let provider = MockPtvClient::load(mock_dir()).unwrap();
    let pipeline = Pipeline::new(provider.clone(), store, pipeline_config());
    let inbox = Arc::new(DeviceInbox::new());

    pipeline.run(inbox.clone(), now()).await.unwrap();

    assert_eq!(provider.call_count(), 0);
    assert_eq!(
        inbox.screen().banner(),
        Some("Configure the app on your phone.")
    );
}

#[tokio::test]
async fn configure_then_run() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileConfigStore::new(dir.path().join("nested/config.json")));

    let edited = CompanionConfig::new(
        "token",
        vec![Favourite::new("Train", RouteType::TRAIN, "1071", "1")],
    );
    let url = configuration_url("pebblejs://close#", Some(&edited)).unwrap();
    let response = url.split_once("config=").unwrap().1;
    apply_response(store.as_ref(), response).unwrap();
    assert!(apply_response(store.as_ref(), "CANCELLED").unwrap().is_none());

    let pipeline = Pipeline::new(MockPtvClient::load(mock_dir()).unwrap(), store, pipeline_config());
    let plan = pipeline.prepare(now()).await.unwrap();
    assert_eq!(plan.messages.len(), 1);
    assert_eq!(plan.messages[0].describe(), "Train @ 8:15");
}

#[tokio::test]
async fn repeated_runs_hit_cache() {
    let provider = MockPtvClient::load(mock_dir()).unwrap();
    let cached = CachedProvider::new(provider.clone(), &CacheConfig::default());
    let (_dir, store) = store_with(CompanionConfig::new("token", favourites()));
    let pipeline = Pipeline::new(cached, store, pipeline_config());

    let first = pipeline.prepare(now()).await.unwrap();
    let second = pipeline.prepare(now()).await.unwrap();

    assert_eq!(first.messages, second.messages);
    // The missing bus stop fails both times; the two real stops are cached.
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test]
async fn disconnected_device_reports_all_results() {
    let provider = MockPtvClient::load(mock_dir()).unwrap();
    let (_dir, store) = store_with(CompanionConfig::new("token", favourites()));
    let pipeline = Pipeline::new(provider, store, pipeline_config());
    let inbox = Arc::new(DeviceInbox::new());
    inbox.set_connected(false);

    match pipeline.run(inbox.clone(), now()).await {
        Err(PipelineError::Delivery(e)) => {
            let names: Vec<String> = e.undelivered().iter().map(|m| m.describe()).collect();
            assert_eq!(names, vec!["Tram to city @ 8:04", "Tram out @ 7:59", "Train @ 8:15"]);
        }
        other => panic!("expected delivery failure, got {:?}", other.map(|r| r.delivery)),
    }
    assert_eq!(inbox.received(), 0);
}

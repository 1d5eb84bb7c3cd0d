//! Integration tests for cancelling in-flight lookups

use geocoder::engine::{GeocoderBuilder, GeocoderError};
use geocoder::transport::Transport;
use std::time::Duration;

use crate::support::{address, quota_exceeded, CallLog, RecordingTransportFactory, ScriptedProvider};

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_in_flight_fetch() {
    let log = CallLog::new();
    let factory = RecordingTransportFactory::hanging();
    let geocoder = GeocoderBuilder::new()
        .add_provider(ScriptedProvider::new("a", &log).returning(vec![address("never")]))
        .transport_factory(factory.clone())
        .build()
        .unwrap();

    let task = geocoder.by_name("x");
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(factory.created(), 1);

    task.cancel();
    assert!(task.is_cancelled());
    assert_eq!(task.await.unwrap_err(), GeocoderError::Cancelled);

    let transports = factory.transports();
    assert!(transports[0].is_aborted());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_suppresses_retry() {
    let log = CallLog::new();
    let factory = RecordingTransportFactory::new();
    let geocoder = GeocoderBuilder::new()
        .add_provider(ScriptedProvider::new("a", &log).failing(quota_exceeded("a")))
        .transport_factory(factory.clone())
        .build()
        .unwrap();

    let task = geocoder.by_name("x");
    // First attempt fails at t=0, retry is due at t=2000ms
    tokio::time::sleep(Duration::from_millis(1000)).await;
    task.cancel();

    assert_eq!(task.await.unwrap_err(), GeocoderError::Cancelled);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(factory.created(), 1);
    assert_eq!(log.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_start_creates_no_transport() {
    let log = CallLog::new();
    let factory = RecordingTransportFactory::new();
    let geocoder = GeocoderBuilder::new()
        .add_provider(ScriptedProvider::new("a", &log).returning(vec![address("x")]))
        .transport_factory(factory.clone())
        .build()
        .unwrap();

    let task = geocoder.by_name("x");
    task.cancel();

    assert_eq!(task.await.unwrap_err(), GeocoderError::Cancelled);
    assert_eq!(factory.created(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_completion_never_yields_success() {
    let log = CallLog::new();
    let geocoder = GeocoderBuilder::new()
        .add_provider(ScriptedProvider::new("a", &log).returning(vec![address("x")]))
        .transport_factory(RecordingTransportFactory::new())
        .build()
        .unwrap();

    let task = geocoder.by_name("x");
    // Let the spawned task finish before cancelling
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(log.len(), 1);

    task.cancel();
    assert_eq!(task.await.unwrap_err(), GeocoderError::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_task_cancels_request() {
    let log = CallLog::new();
    let factory = RecordingTransportFactory::hanging();
    let geocoder = GeocoderBuilder::new()
        .add_provider(ScriptedProvider::new("a", &log).returning(vec![address("never")]))
        .transport_factory(factory.clone())
        .build()
        .unwrap();

    let task = geocoder.by_name("x");
    tokio::time::sleep(Duration::from_millis(10)).await;
    drop(task);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(factory.transports()[0].is_aborted());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_token_from_another_task() {
    let log = CallLog::new();
    let geocoder = GeocoderBuilder::new()
        .add_provider(ScriptedProvider::new("a", &log).returning(vec![address("never")]))
        .transport_factory(RecordingTransportFactory::hanging())
        .build()
        .unwrap();

    let task = geocoder.by_name("x");
    let token = task.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });

    assert_eq!(task.await.unwrap_err(), GeocoderError::Cancelled);
}

//! Polling and fetching against a mock render server.

mod common;

use common::fixtures::{self, order};
use common::{assert_rejected, assert_same_pixels, MockMapServer};
use gis_map_client::models::{OrderHandle, OrderId, PinCode, ServiceStatus};
use gis_map_client::services::{CancellationToken, HttpTransport, PollClient};
use gis_map_client::ClientError;
use reqwest::Url;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn client_for(mock: &MockMapServer) -> PollClient {
    let transport = Arc::new(HttpTransport::new().unwrap());
    PollClient::new(transport, Url::parse(&mock.url()).unwrap())
        .with_request_timeout(Some(Duration::from_secs(2)))
        .with_poll_interval(Duration::from_millis(50))
}

fn handle() -> OrderHandle {
    OrderHandle::new(OrderId::new(order::ID), PinCode::parse(order::PIN).unwrap())
}

#[tokio::test]
async fn test_fetch_ready_png() {
    let mock = MockMapServer::start().await;
    mock.mock_fetch_image(order::ID, "image/png", fixtures::png_bytes())
        .await;

    let image = client_for(&mock)
        .fetch_until_ready(handle(), Some(Duration::from_secs(3)), &CancellationToken::new())
        .await
        .unwrap();

    assert_same_pixels(&image, &fixtures::sample_image());
    assert_eq!(mock.fetch_count().await, 1);
}

#[tokio::test]
async fn test_fetch_keeps_polling_while_processing() {
    let mock = MockMapServer::start().await;
    mock.mock_fetch_processing(order::ID, 3).await;
    mock.mock_fetch_image(order::ID, "image/png", fixtures::png_bytes())
        .await;

    let image = client_for(&mock)
        .fetch_until_ready(handle(), Some(Duration::from_secs(3)), &CancellationToken::new())
        .await
        .unwrap();

    assert_same_pixels(&image, &fixtures::sample_image());
    assert_eq!(mock.fetch_count().await, 4);
}

#[tokio::test]
async fn test_fetch_decodes_jpeg_and_bmp() {
    for (content_type, format) in [
        ("image/jpeg", image::ImageFormat::Jpeg),
        ("image/bmp", image::ImageFormat::Bmp),
    ] {
        let mock = MockMapServer::start().await;
        let bytes = fixtures::encode(&fixtures::sample_image(), format);
        mock.mock_fetch_image(order::ID, content_type, bytes).await;

        let image = client_for(&mock)
            .fetch_until_ready(handle(), Some(Duration::from_secs(3)), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!((image.width(), image.height()), (8, 6));
    }
}

#[tokio::test]
async fn test_fetch_already_collected() {
    let mock = MockMapServer::start().await;
    mock.mock_fetch_status(order::ID, order::PIN, 410).await;

    let error = client_for(&mock)
        .fetch_until_ready(handle(), Some(Duration::from_secs(3)), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(error.is_already_collected());
    assert_eq!(mock.fetch_count().await, 1);
}

#[tokio::test]
async fn test_fetch_terminal_statuses() {
    for (code, expected) in [
        (400, ServiceStatus::InvalidParameters),
        (408, ServiceStatus::Timeout),
        (418, ServiceStatus::NoMemory),
        (500, ServiceStatus::RenderFailed),
        (520, ServiceStatus::RequestFailed),
    ] {
        let mock = MockMapServer::start().await;
        mock.mock_fetch_status(order::ID, order::PIN, code).await;

        let error = client_for(&mock)
            .fetch_until_ready(handle(), Some(Duration::from_secs(3)), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_rejected(&error, expected);
        assert_eq!(mock.fetch_count().await, 1);
    }
}

#[tokio::test]
async fn test_fetch_times_out_while_processing() {
    let mock = MockMapServer::start().await;
    mock.mock_fetch_status(order::ID, order::PIN, 202).await;

    let started = Instant::now();
    let error = client_for(&mock)
        .fetch_until_ready(handle(), Some(Duration::from_millis(400)), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Timeout { .. }));
    assert!(started.elapsed() >= Duration::from_millis(400));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(mock.fetch_count().await >= 2);
}

#[tokio::test]
async fn test_fetch_wrong_content_type_is_protocol_error() {
    let mock = MockMapServer::start().await;
    mock.mock_fetch_image(order::ID, "text/html", b"<html></html>".to_vec())
        .await;

    let error = client_for(&mock)
        .fetch_until_ready(handle(), Some(Duration::from_secs(3)), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Protocol(_)));
}

#[tokio::test]
async fn test_fetch_corrupt_image_is_decode_error() {
    let mock = MockMapServer::start().await;
    let mut bytes = fixtures::png_bytes();
    bytes.truncate(20);
    mock.mock_fetch_image(order::ID, "image/png", bytes).await;

    let error = client_for(&mock)
        .fetch_until_ready(handle(), Some(Duration::from_secs(3)), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Decode(_)));
}

//! Unit tests for the reqwest-backed transport against a local listener

use geocoder::transport::http::HttpTransportFactory;
use geocoder::transport::{TransportError, TransportFactory};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `response` to the first connection and return the request head
async fn serve_once(response: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/geocode", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.unwrap();
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    });

    (url, handle)
}

#[tokio::test]
async fn test_fetch_returns_body_and_sends_user_agent() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 15\r\nConnection: close\r\n\r\n{\"status\":\"OK\"}",
    )
    .await;

    let transport = HttpTransportFactory::new().user_agent("geocoder-tests/1.0").create();
    let body = transport.fetch(&url).await.unwrap();
    assert_eq!(&body[..], b"{\"status\":\"OK\"}");

    let request = server.await.unwrap().to_lowercase();
    assert!(request.starts_with("get /geocode"));
    assert!(request.contains("user-agent: geocoder-tests/1.0"));
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let (url, _server) = serve_once(
        "HTTP/1.1 429 Too Many Requests\r\nContent-Length: 4\r\nConnection: close\r\n\r\nslow",
    )
    .await;

    let transport = HttpTransportFactory::new().create();
    let err = transport.fetch(&url).await.unwrap_err();
    assert_eq!(
        err,
        TransportError::Status {
            status: 429,
            body: "slow".to_string(),
        }
    );
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn test_abort_interrupts_in_flight_fetch() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/slow", listener.local_addr().unwrap());
    // Accept and hold the connection without answering
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(socket);
    });

    let transport = HttpTransportFactory::new().create();
    let fetch = tokio::spawn({
        let transport = transport.clone();
        async move { transport.fetch(&url).await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    transport.abort();

    let result = tokio::time::timeout(Duration::from_secs(5), fetch)
        .await
        .expect("fetch did not stop after abort")
        .unwrap();
    assert_eq!(result.unwrap_err(), TransportError::Aborted);

    // Aborted transports stay aborted
    assert_eq!(transport.fetch("http://127.0.0.1:9/").await.unwrap_err(), TransportError::Aborted);
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let transport = HttpTransportFactory::with_timeout(Duration::from_secs(2)).create();
    let err = transport.fetch(&url).await.unwrap_err();
    assert!(matches!(err, TransportError::Network(_)));
}

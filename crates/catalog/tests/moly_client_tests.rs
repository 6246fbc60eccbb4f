//! Integration tests for the Moly.hu client against a local HTTP responder

use lepkehalo_catalog::{CatalogError, CatalogLookup, MolyClient, MolyConfig};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves the same canned response to every connection and records request lines
struct Responder {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn respond_with(status: u16, body: &'static str) -> Responder {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };

            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }

            let request = String::from_utf8_lossy(&buf);
            if let Some(line) = request.lines().next() {
                seen.lock().unwrap().push(line.to_string());
            }

            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Responder {
        base: format!("http://{}/api", addr),
        requests,
    }
}

fn client_for(base: &str) -> MolyClient {
    MolyClient::with_config(
        MolyConfig::default()
            .with_api_base(base)
            .with_api_key("test-key")
            .with_timeout(Duration::from_secs(2)),
    )
    .expect("Failed to create client")
}

#[tokio::test]
async fn test_found_book_is_mapped() {
    let responder = respond_with(
        200,
        r#"{"id": 12345, "title": "A kék sziget", "author": "Rejtő Jenő", "cover": "https://moly.hu/system/covers/big/covers_12345.jpg"}"#,
    )
    .await;
    let client = client_for(&responder.base);

    let book = client
        .search_by_isbn("9789630778459")
        .await
        .unwrap()
        .expect("book should be found");

    assert_eq!(book.id, "12345");
    assert_eq!(book.title, "A kék sziget");
    assert_eq!(book.author, "Rejtő Jenő");
    assert!(book.thumbnail_url.contains("covers_12345"));
    assert_eq!(book.isbn.as_deref(), Some("9789630778459"));
    assert!(book.added_at.as_millis() > 0);
}

#[tokio::test]
async fn test_request_carries_isbn_and_key() {
    let responder = respond_with(200, r#"{"id": 1, "title": "Test", "author": "Author", "cover": null}"#).await;
    let client = client_for(&responder.base);

    client.search_by_isbn("9789630778459").await.unwrap();

    let requests = responder.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /api/book_by_isbn.json?"));
    assert!(requests[0].contains("q=9789630778459"));
    assert!(requests[0].contains("key=test-key"));
}

#[tokio::test]
async fn test_null_cover_becomes_empty_thumbnail() {
    let responder = respond_with(200, r#"{"id": 7, "title": "No Cover", "author": "Someone", "cover": null}"#).await;
    let client = client_for(&responder.base);

    let book = client.search_by_isbn("9789634790914").await.unwrap().unwrap();
    assert_eq!(book.thumbnail_url, "");
}

#[tokio::test]
async fn test_not_found_is_none() {
    let responder = respond_with(404, r#"{"error": "Not found"}"#).await;
    let client = client_for(&responder.base);

    let result = client.search_by_isbn("0000000000000").await;
    assert_eq!(result, Ok(None));
}

#[tokio::test]
async fn test_server_error_keeps_status() {
    let responder = respond_with(500, r#"{"error": "Internal server error"}"#).await;
    let client = client_for(&responder.base);

    let err = client.search_by_isbn("9789630778459").await.unwrap_err();
    assert_eq!(err, CatalogError::Server { status: 500 });
    assert!(!err.is_network_error());
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() {
    let responder = respond_with(200, r#"{"unexpected": true}"#).await;
    let client = client_for(&responder.base);

    let err = client.search_by_isbn("9789630778459").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}/api", addr));
    let err = client.search_by_isbn("9789630778459").await.unwrap_err();

    assert!(err.is_network_error());
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let client = MolyClient::with_config(
        MolyConfig::default()
            .with_api_base(format!("http://{}/api", addr))
            .with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.search_by_isbn("9789630778459").await.unwrap_err();
    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_lookup_through_trait_object() {
    let responder = respond_with(200, r#"{"id": "99", "title": "Trait", "author": "Object", "cover": ""}"#).await;
    let lookup: Arc<dyn CatalogLookup> = Arc::new(client_for(&responder.base));

    let book = lookup.find_by_isbn("9789630778459").await.unwrap().unwrap();
    assert_eq!(book.id, "99");
    assert_eq!(lookup.name(), "Moly.hu");
}

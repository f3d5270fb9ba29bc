//! Tests for endpoint routing and handlers

use flate2::read::GzDecoder;
use hearth::http::request::{Method, Request, RequestBuilder};
use hearth::http::response::StatusCode;
use hearth::routes::{HandlerError, Router};
use std::io::Read;

fn get(path: &str) -> RequestBuilder {
    RequestBuilder::new().method(Method::GET).path(path)
}

fn post(path: &str, body: &[u8]) -> Request {
    RequestBuilder::new()
        .method(Method::POST)
        .path(path)
        .header("Content-Length", body.len().to_string())
        .body(body.to_vec())
        .build()
        .unwrap()
}

fn header_names(response: &hearth::http::response::Response) -> Vec<&str> {
    response.headers.iter().map(|(k, _)| k).collect()
}

#[tokio::test]
async fn test_echo() {
    let router = Router::new(".");
    let response = router.dispatch(&get("/echo/foo").build().unwrap()).await.unwrap();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"foo".to_vec());
    assert_eq!(response.headers.get("Content-Type"), Some("text/plain"));
    assert_eq!(response.headers.get("Content-Length"), Some("3"));
    assert!(!response.headers.contains_key("Content-Encoding"));
}

#[tokio::test]
async fn test_echo_gzip() {
    let router = Router::new(".");
    let request = get("/echo/abc").header("Accept-Encoding", "deflate, gzip").build().unwrap();
    let response = router.dispatch(&request).await.unwrap();

    assert_eq!(header_names(&response), ["Content-Type", "Content-Encoding", "Content-Length"]);
    assert_eq!(response.headers.get("Content-Encoding"), Some("gzip"));
    assert_eq!(
        response.headers.get("Content-Length"),
        Some(response.body.len().to_string().as_str())
    );

    let mut decoded = String::new();
    GzDecoder::new(response.body.as_slice()).read_to_string(&mut decoded).unwrap();
    assert_eq!(decoded, "abc");
}

#[tokio::test]
async fn test_echo_unsupported_encoding_keeps_empty_header() {
    let router = Router::new(".");
    let request = get("/echo/abc").header("Accept-Encoding", "br").build().unwrap();
    let response = router.dispatch(&request).await.unwrap();

    assert_eq!(response.headers.get("Content-Encoding"), Some(""));
    assert_eq!(response.body, b"abc".to_vec());
}

#[tokio::test]
async fn test_echo_without_segment_is_error() {
    let router = Router::new(".");
    let result = router.dispatch(&get("/echoes").build().unwrap()).await;

    assert!(matches!(result, Err(HandlerError::MissingPathSegment("/echo/"))));
}

#[tokio::test]
async fn test_echo_wins_over_user_agent() {
    let router = Router::new(".");
    let request = get("/echo/user-agent").header("User-Agent", "curl").build().unwrap();
    let response = router.dispatch(&request).await.unwrap();

    assert_eq!(response.body, b"user-agent".to_vec());
}

#[tokio::test]
async fn test_root_is_blank() {
    let router = Router::new(".");
    let response = router.dispatch(&get("/").build().unwrap()).await.unwrap();

    assert_eq!(response.status, StatusCode::Ok);
    assert!(response.body.is_empty());
    assert_eq!(header_names(&response), ["Content-Length", "Content-Type"]);
    assert_eq!(response.headers.get("Content-Length"), Some("0"));
}

#[tokio::test]
async fn test_user_agent_ignores_accept_encoding() {
    let router = Router::new(".");
    let request = get("/user-agent")
        .header("User-Agent", "foobar/1.2.3")
        .header("Accept-Encoding", "gzip")
        .build()
        .unwrap();
    let response = router.dispatch(&request).await.unwrap();

    assert_eq!(response.body, b"foobar/1.2.3".to_vec());
    assert_eq!(header_names(&response), ["Content-Length", "Content-Type"]);
    assert_eq!(response.headers.get("Content-Length"), Some("12"));
}

#[tokio::test]
async fn test_user_agent_missing_header_is_error() {
    let router = Router::new(".");
    let result = router.dispatch(&get("/user-agent").build().unwrap()).await;

    assert!(matches!(result, Err(HandlerError::MissingHeader("User-Agent"))));
}

#[tokio::test]
async fn test_fallback_not_found_echoes_stripped_path() {
    let router = Router::new(".");
    let response = router.dispatch(&get("/nope/").build().unwrap()).await.unwrap();

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.body, b"nope".to_vec());
    assert_eq!(response.headers.get("Content-Type"), Some("text/plain"));
}

#[tokio::test]
async fn test_create_then_read_file() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::new(dir.path());

    let created = router.dispatch(&post("/files/new.txt", b"hi")).await.unwrap();
    assert_eq!(created.status, StatusCode::Created);
    assert!(created.headers.is_empty());
    assert_eq!(std::fs::read(dir.path().join("new.txt")).unwrap(), b"hi".to_vec());

    let read = router.dispatch(&get("/files/new.txt").build().unwrap()).await.unwrap();
    assert_eq!(read.status, StatusCode::Ok);
    assert_eq!(read.body, b"hi".to_vec());
    assert_eq!(read.headers.get("Content-Type"), Some("application/octet-stream"));
}

#[tokio::test]
async fn test_create_existing_file_fails_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("taken.txt"), b"original").unwrap();
    let router = Router::new(dir.path());

    let result = router.dispatch(&post("/files/taken.txt", b"new")).await;

    assert!(matches!(result, Err(HandlerError::FileExists(_))));
    assert_eq!(std::fs::read(dir.path().join("taken.txt")).unwrap(), b"original".to_vec());
}

#[tokio::test]
async fn test_create_rejects_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::new(dir.path().join("root"));

    let result = router.dispatch(&post("/files/../escape.txt", b"x")).await;

    assert!(matches!(result, Err(HandlerError::InvalidFileName(_))));
    assert!(!dir.path().join("escape.txt").exists());
}

#[tokio::test]
async fn test_read_missing_file_is_bare_404() {
    let dir = tempfile::tempdir().unwrap();
    let router = Router::new(dir.path());

    let response = router.dispatch(&get("/files/missing.txt").build().unwrap()).await.unwrap();

    assert_eq!(response.status, StatusCode::NotFound);
    assert!(response.headers.is_empty());
    assert!(response.body.is_empty());
}

#[tokio::test]
async fn test_read_file_serves_raw_bytes_gzipped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
    let router = Router::new(dir.path());

    let request = get("/files/blob.bin").header("Accept-Encoding", "gzip").build().unwrap();
    let response = router.dispatch(&request).await.unwrap();

    let mut decoded = Vec::new();
    GzDecoder::new(response.body.as_slice()).read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, vec![0u8, 159, 146, 150]);
}

#[tokio::test]
async fn test_post_outside_files_falls_through() {
    let router = Router::new(".");
    let response = router.dispatch(&post("/echo/hey", b"ignored")).await.unwrap();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"hey".to_vec());
}

#[tokio::test]
async fn test_get_outside_files_marker_is_error() {
    let router = Router::new(".");
    let result = router.dispatch(&get("/myfiles").build().unwrap()).await;

    assert!(matches!(result, Err(HandlerError::MissingPathSegment("/files/"))));
}

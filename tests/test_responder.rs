use docroot::http::response::{Body, StatusCode};
use docroot::http::writer::ResponseWriter;
use docroot::static_files::responder::{respond, serve};
use std::io;

#[tokio::test]
async fn test_serve_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("style.css");
    std::fs::write(&path, b"body { color: red; }").unwrap();

    let response = serve(&path, "HTTP/1.1").await;

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("text/css"));
    assert_eq!(response.content_length(), Some(20));
    assert!(matches!(response.body, Body::File(_)));
}

#[tokio::test]
async fn test_serve_mirrors_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.txt");
    std::fs::write(&path, b"a").unwrap();

    let response = serve(&path, "HTTP/1.0").await;
    assert_eq!(response.version, "HTTP/1.0");
}

#[tokio::test]
async fn test_serve_missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();

    let response = serve(&dir.path().join("missing.png"), "HTTP/1.1").await;

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body.as_bytes(), Some(&b"File not found\n"[..]));
}

#[tokio::test]
async fn test_serve_directory_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("assets")).unwrap();

    let response = serve(&dir.path().join("assets"), "HTTP/1.1").await;

    assert_eq!(response.status, StatusCode::NotFound);
}

#[tokio::test]
async fn test_served_body_matches_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.bin");
    let contents: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &contents).unwrap();

    let response = serve(&path, "HTTP/1.1").await;
    assert_eq!(response.header("Content-Type"), Some("application/octet-stream"));

    let mut writer = ResponseWriter::new(response).unwrap();
    assert_eq!(writer.content_length(), contents.len() as u64);

    let mut out = Vec::new();
    writer.write_to_stream(&mut out).await.unwrap();

    let split = out.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
    assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert_eq!(&out[split..], &contents[..]);
}

#[tokio::test]
async fn test_metadata_failure_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, b"<h1>hi</h1>").unwrap();
    let file = tokio::fs::File::open(&path).await.unwrap();

    let response = respond(file, Err(io::Error::other("device gone")), &path, "HTTP/1.1");

    assert_eq!(response.status, StatusCode::InternalServerError);
    assert_eq!(response.header("Content-Type"), Some("text/plain"));
    assert_eq!(response.body.as_bytes(), Some(&b"Internal Server Error\n"[..]));
}

#[tokio::test]
async fn test_respond_with_metadata_serves_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logo.png");
    std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();
    let file = tokio::fs::File::open(&path).await.unwrap();
    let metadata = std::fs::metadata(&path);

    let response = respond(file, metadata, &path, "HTTP/1.1");

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.header("Content-Type"), Some("image/png"));
    assert_eq!(response.content_length(), Some(4));
}

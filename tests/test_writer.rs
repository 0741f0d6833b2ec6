use docroot::http::response::{Response, ResponseBuilder, StatusCode, SERVER_NAME};
use docroot::http::writer::{serialize_head, ResponseWriter};

#[test]
fn test_head_status_line_and_headers() {
    let response = Response::forbidden("HTTP/1.1");
    let head = String::from_utf8(serialize_head(&response)).unwrap();

    assert!(head.starts_with("HTTP/1.1 403 Forbidden\r\n"));
    assert!(head.contains("Content-Type: text/plain\r\n"));
    assert!(head.contains("Content-Length: 10\r\n"));
    assert!(head.contains(&format!("Server: {}\r\n", SERVER_NAME)));
    assert!(head.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn test_write_bytes_response() {
    let mut writer = ResponseWriter::new(Response::not_found("HTTP/1.1")).unwrap();
    let mut out = Vec::new();
    writer.write_to_stream(&mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert!(text.ends_with("\r\n\r\nFile not found\n"));
}

#[test]
fn test_mismatched_content_length_rejected() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert!(ResponseWriter::new(response).is_err());
}

#[tokio::test]
async fn test_file_shorter_than_declared_fails() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"short").unwrap();
    let handle = tokio::fs::File::open(file.path()).await.unwrap();

    let response = ResponseBuilder::new(StatusCode::Ok).file(handle, 100).build();
    let mut writer = ResponseWriter::new(response).unwrap();

    let mut out = Vec::new();
    assert!(writer.write_to_stream(&mut out).await.is_err());
}

use docroot::http::response::{Body, Response, ResponseBuilder, StatusCode, SERVER_NAME};

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::BadRequest.as_u16(), 400);
    assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
}

#[test]
fn test_status_code_reason_phrase() {
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::BadRequest.reason_phrase(), "Bad Request");
    assert_eq!(StatusCode::Forbidden.reason_phrase(), "Forbidden");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(
        StatusCode::InternalServerError.reason_phrase(),
        "Internal Server Error"
    );
}

#[test]
fn test_response_builder_basic() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"Hello, World!".to_vec())
        .build();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.version, "HTTP/1.1");
    assert_eq!(response.body.as_bytes(), Some(&b"Hello, World!"[..]));
}

#[test]
fn test_response_builder_always_sets_server() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();
    assert_eq!(response.header("Server"), Some(SERVER_NAME));
}

#[test]
fn test_response_builder_version() {
    let response = ResponseBuilder::new(StatusCode::Ok).version("HTTP/1.0").build();
    assert_eq!(response.version, "HTTP/1.0");
}

#[test]
fn test_response_builder_auto_content_length() {
    let body = b"This is the body".to_vec();
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(body.clone())
        .build();

    assert_eq!(response.content_length(), Some(body.len() as u64));
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    // Should keep the custom value
    assert_eq!(response.header("Content-Length"), Some("999"));
}

#[test]
fn test_response_builder_headers() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/css")
        .body(b"{}".to_vec())
        .build();

    // Content-Type + auto Server + auto Content-Length
    assert_eq!(response.headers.len(), 3);
    assert_eq!(response.header("Content-Type"), Some("text/css"));
}

#[test]
fn test_response_builder_empty_body() {
    let response = ResponseBuilder::new(StatusCode::Ok).build();

    assert_eq!(response.body.as_bytes().map(|b| b.len()), Some(0));
    assert_eq!(response.header("Content-Length"), Some("0"));
}

#[tokio::test]
async fn test_response_builder_file_body() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"0123456789").unwrap();
    let handle = tokio::fs::File::open(file.path()).await.unwrap();

    let response = ResponseBuilder::new(StatusCode::Ok).file(handle, 10).build();

    assert!(matches!(response.body, Body::File(_)));
    assert_eq!(response.content_length(), Some(10));
}

#[test]
fn test_error_helpers_are_plain_text() {
    let cases = [
        (Response::bad_request("HTTP/1.1"), StatusCode::BadRequest, "400 Bad Request\n"),
        (Response::forbidden("HTTP/1.1"), StatusCode::Forbidden, "Forbidden\n"),
        (Response::not_found("HTTP/1.1"), StatusCode::NotFound, "File not found\n"),
        (
            Response::internal_error("HTTP/1.1"),
            StatusCode::InternalServerError,
            "Internal Server Error\n",
        ),
    ];

    for (response, status, body) in cases {
        assert_eq!(response.status, status);
        assert_eq!(response.header("Content-Type"), Some("text/plain"));
        assert_eq!(response.body.as_bytes(), Some(body.as_bytes()));
        assert_eq!(response.content_length(), Some(body.len() as u64));
    }
}

#[test]
fn test_error_helpers_mirror_version() {
    let response = Response::not_found("HTTP/1.0");
    assert_eq!(response.version, "HTTP/1.0");
}

use std::collections::HashMap;
use tokio::fs::File;

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = concat!("docroot/", env!("CARGO_PKG_VERSION"));

/// Version used when no request version is known (e.g. parse failures).
pub const DEFAULT_VERSION: &str = "HTTP/1.1";

/// HTTP status codes produced by the server.
///
/// - `Ok` (200): File served
/// - `BadRequest` (400): Malformed request
/// - `Forbidden` (403): Path-traversal attempt
/// - `NotFound` (404): File not found
/// - `InternalServerError` (500): Unexpected failure while serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Response payload.
///
/// Generated errors carry their text in memory; served files keep the
/// open handle and are streamed by the writer.
#[derive(Debug)]
pub enum Body {
    Bytes(Vec<u8>),
    File(File),
}

impl Body {
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            Body::File(_) => None,
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP version, mirrored from the request
    pub version: String,
    /// HTTP headers as key-value pairs
    pub headers: HashMap<String, String>,
    /// Response body
    pub body: Body,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .version("HTTP/1.0")
///     .header("Content-Type", "text/css")
///     .body(b"body {}".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    version: String,
    headers: HashMap<String, String>,
    body: Body,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            version: DEFAULT_VERSION.to_string(),
            headers: HashMap::new(),
            body: Body::Bytes(Vec::new()),
        }
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets an in-memory body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Body::Bytes(body);
        self
    }

    /// Sets a file body of `len` bytes, declared as the Content-Length.
    pub fn file(mut self, file: File, len: u64) -> Self {
        self.body = Body::File(file);
        self.headers.insert("Content-Length".to_string(), len.to_string());
        self
    }

    /// Builds the final Response.
    ///
    /// Always sets the Server header. Byte bodies get a Content-Length
    /// unless one was given explicitly.
    pub fn build(mut self) -> Response {
        self.headers
            .insert("Server".to_string(), SERVER_NAME.to_string());

        if let Body::Bytes(bytes) = &self.body {
            let len = bytes.len();
            self.headers
                .entry("Content-Length".to_string())
                .or_insert_with(|| len.to_string());
        }

        Response {
            status: self.status,
            version: self.version,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// A `text/plain` response carrying `message`.
    pub fn text(status: StatusCode, version: &str, message: &str) -> Self {
        ResponseBuilder::new(status)
            .version(version)
            .header("Content-Type", "text/plain")
            .body(message.as_bytes().to_vec())
            .build()
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(version: &str) -> Self {
        Self::text(StatusCode::BadRequest, version, "400 Bad Request\n")
    }

    /// Creates a 403 Forbidden response.
    pub fn forbidden(version: &str) -> Self {
        Self::text(StatusCode::Forbidden, version, "Forbidden\n")
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(version: &str) -> Self {
        Self::text(StatusCode::NotFound, version, "File not found\n")
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error(version: &str) -> Self {
        Self::text(StatusCode::InternalServerError, version, "Internal Server Error\n")
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// The declared Content-Length, if present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.header("Content-Length").and_then(|v| v.parse().ok())
    }
}

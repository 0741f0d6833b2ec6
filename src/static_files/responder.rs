//! Builds responses for routed file paths
//!
//! A successful lookup yields a 200 whose body is the open file handle;
//! the bytes are streamed later by the response writer.

use crate::http::mime;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use std::fs::Metadata;
use std::io;
use std::path::Path;
use tokio::fs::File;

/// Serves `path` as a response in the given HTTP version.
///
/// Never fails: an unopenable path becomes 404 and any error after the
/// file is open becomes 500.
pub async fn serve(path: &Path, version: &str) -> Response {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Error opening file"
            );
            return Response::not_found(version);
        }
    };

    let metadata = file.metadata().await;
    respond(file, metadata, path, version)
}

/// Turns an open file and the outcome of its metadata lookup into a
/// response: 500 when the lookup failed, 404 for anything but a regular
/// file, otherwise 200 streaming the file.
pub fn respond(file: File, metadata: io::Result<Metadata>, path: &Path, version: &str) -> Response {
    let metadata = match metadata {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::error!(
                path = %path.display(),
                error = %e,
                "Failed to prepare file response"
            );
            return Response::internal_error(version);
        }
    };

    if !metadata.is_file() {
        tracing::warn!(path = %path.display(), "Not a regular file");
        return Response::not_found(version);
    }

    tracing::info!(path = %path.display(), "Sending response file");

    ResponseBuilder::new(StatusCode::Ok)
        .version(version)
        .header("Content-Type", mime::resolve(&path.to_string_lossy()))
        .file(file, metadata.len())
        .build()
}

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::{Response, DEFAULT_VERSION};
use crate::http::writer::ResponseWriter;
use crate::static_files::responder;
use crate::static_files::{Route, Router};

/// How many leading bytes of a bad request are dumped to the log.
const DIAGNOSTIC_SAMPLE: usize = 100;

/// One accepted client connection: one request in, one response out.
pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
    router: Arc<Router>,
    read_timeout: Option<Duration>,
    state: ConnectionState,
    failure: Option<anyhow::Error>,
}

pub enum ConnectionState {
    Reading,
    Routing(Request),
    Responding(Reply),
    Closing,
    Closed,
}

/// What the Responding state sends.
pub enum Reply {
    /// Look the file up and serve it
    File { path: PathBuf, version: String },
    /// A response decided without touching the filesystem
    Ready(Response),
}

/// Why no request could be read.
#[derive(Debug)]
pub enum ReadError {
    Parse(ParseError),
    Transport(io::Error),
    /// Peer closed its side part-way through a request
    Truncated,
    TimedOut,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Parse(e) => write!(f, "parse error: {e}"),
            ReadError::Transport(e) => write!(f, "transport error: {e}"),
            ReadError::Truncated => f.write_str("connection closed mid-request"),
            ReadError::TimedOut => f.write_str("timed out waiting for request"),
        }
    }
}

impl Connection {
    pub fn new(stream: TcpStream, router: Arc<Router>, read_timeout: Option<Duration>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            router,
            read_timeout,
            state: ConnectionState::Reading,
            failure: None,
        }
    }

    /// Drives the connection to `Closed`.
    ///
    /// The socket's send side is always shut down before returning. An
    /// error is returned only when writing the response failed.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => match self.read_with_timeout().await {
                    Ok(Some(req)) => ConnectionState::Routing(req),
                    Ok(None) => {
                        debug!("Peer closed before sending a request");
                        ConnectionState::Closing
                    }
                    Err(e) => {
                        self.log_read_error(&e);
                        self.send_bad_request().await;
                        ConnectionState::Closing
                    }
                },

                ConnectionState::Routing(req) => {
                    info!(
                        method = req.method.as_str(),
                        path = %req.path,
                        version = %req.version,
                        "Request received"
                    );

                    match self.router.route(&req.path) {
                        Route::Forbidden => {
                            warn!(path = %req.path, "Rejected traversal attempt");
                            ConnectionState::Responding(Reply::Ready(Response::forbidden(
                                &req.version,
                            )))
                        }
                        Route::File(path) => ConnectionState::Responding(Reply::File {
                            path,
                            version: req.version,
                        }),
                    }
                }

                ConnectionState::Responding(reply) => {
                    let response = match reply {
                        Reply::File { path, version } => responder::serve(&path, &version).await,
                        Reply::Ready(response) => response,
                    };

                    if let Err(e) = self.write_response(response).await {
                        error!(error = %e, "Error writing response");
                        self.failure = Some(e);
                    }
                    ConnectionState::Closing
                }

                ConnectionState::Closing => {
                    if let Err(e) = self.stream.shutdown().await {
                        debug!(error = %e, "Shutdown failed");
                    }
                    self.buffer.clear();
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn read_with_timeout(&mut self) -> Result<Option<Request>, ReadError> {
        let read_timeout = self.read_timeout;
        match read_timeout {
            Some(limit) => tokio::time::timeout(limit, self.read_request())
                .await
                .unwrap_or(Err(ReadError::TimedOut)),
            None => self.read_request().await,
        }
    }

    /// Reads until one complete request is buffered.
    ///
    /// `Ok(None)` means the peer closed without sending anything.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ReadError> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                // Anything past the first request is ignored
                Ok((request, _consumed)) => return Ok(Some(request)),

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Err(ReadError::Parse(e)),
            }

            let n = self
                .stream
                .read_buf(&mut self.buffer)
                .await
                .map_err(ReadError::Transport)?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(ReadError::Truncated);
            }
        }
    }

    async fn write_response(&mut self, response: Response) -> anyhow::Result<()> {
        info!(
            status = response.status.as_u16(),
            "Sending response"
        );
        let mut writer = ResponseWriter::new(response)?;
        writer.write_to_stream(&mut self.stream).await
    }

    async fn send_bad_request(&mut self) {
        if let Err(e) = self.write_response(Response::bad_request(DEFAULT_VERSION)).await {
            warn!(error = %e, "Error sending error response");
        }
    }

    fn log_read_error(&self, e: &ReadError) {
        let sample = &self.buffer[..self.buffer.len().min(DIAGNOSTIC_SAMPLE)];
        let hex = sample
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ");

        warn!(
            error = %e,
            bytes = self.buffer.len(),
            raw = %hex,
            "Error reading request"
        );
    }
}

use anyhow::Context;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response};

/// Serializes the status line and headers, including the blank line that
/// ends the head.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes one response to a stream.
///
/// The head is buffered; a file body is copied from its handle in chunks
/// and never held in memory as a whole.
pub struct ResponseWriter {
    head: Vec<u8>,
    written: usize,
    body: Body,
    content_length: u64,
}

impl ResponseWriter {
    pub fn new(response: Response) -> anyhow::Result<Self> {
        let declared = response.content_length();
        let content_length = match (&response.body, declared) {
            (Body::Bytes(bytes), Some(len)) if len != bytes.len() as u64 => {
                anyhow::bail!(
                    "Content-Length {} does not match body size {}",
                    len,
                    bytes.len()
                );
            }
            (_, Some(len)) => len,
            (Body::Bytes(bytes), None) => bytes.len() as u64,
            (Body::File(_), None) => anyhow::bail!("file body without Content-Length"),
        };

        Ok(Self {
            head: serialize_head(&response),
            written: 0,
            body: response.body,
            content_length,
        })
    }

    /// Number of body bytes that will be written.
    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub async fn write_to_stream<S>(&mut self, stream: &mut S) -> anyhow::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        while self.written < self.head.len() {
            let n = stream
                .write(&self.head[self.written..])
                .await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        match &mut self.body {
            Body::Bytes(bytes) => {
                stream.write_all(bytes).await?;
            }
            Body::File(file) => {
                stream_body(file, self.content_length, stream).await?;
            }
        }

        stream.flush().await?;
        Ok(())
    }
}

async fn stream_body<R, W>(source: &mut R, len: u64, sink: &mut W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let copied = tokio::io::copy(&mut source.take(len), sink)
        .await
        .context("failed to stream file body")?;

    if copied != len {
        anyhow::bail!("file ended after {} of {} bytes", copied, len);
    }
    Ok(())
}

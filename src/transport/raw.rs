//! Raw wire exchanges.
//!
//! A raw exchange opens a fresh connection, submits caller bytes with a
//! single write, reads exactly one HTTP/1.x-framed response, buffers the
//! body fully, and closes the connection before the response escapes.

use std::io;

use bytes::{Bytes, BytesMut};
use http::Method;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::base::{DispatchPhase, WireError};
use crate::http::framing::{self, BodyFraming, ChunkedDecoder, ResponseHead};
use crate::http::{Response, ResponseBody};
use crate::socket::connect;
use crate::socket::{SocketStream, TlsOptions};

/// One request/response exchange over a dedicated connection.
///
/// The payload goes out exactly as supplied. Framing of the response is
/// guided by the first token of the payload's request line, so a
/// handwritten `HEAD` request does not wait for body bytes that will
/// never arrive.
pub(crate) struct RawExchange {
    scheme: String,
    authority: String,
    payload: Bytes,
    payload_method: Option<Method>,
    phase: DispatchPhase,
}

impl RawExchange {
    pub(crate) fn new(scheme: &str, authority: &str, payload: Bytes) -> Self {
        let payload_method = framing::payload_method(&payload);
        Self {
            scheme: scheme.to_owned(),
            authority: authority.to_owned(),
            payload,
            payload_method,
            phase: DispatchPhase::Received,
        }
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> DispatchPhase {
        self.phase
    }

    /// Drive the exchange to completion. The connection lives entirely
    /// inside this call; success or failure, it is gone by the time the
    /// call returns.
    pub(crate) async fn run(&mut self, tls: &TlsOptions) -> Result<Response, WireError> {
        let result = self.drive(tls).await;
        match &result {
            Ok(resp) => {
                self.phase = DispatchPhase::RawDone;
                tracing::debug!(
                    authority = %self.authority,
                    status = %resp.status(),
                    "raw exchange complete"
                );
            }
            Err(e) => {
                self.phase = DispatchPhase::Failed;
                tracing::debug!(authority = %self.authority, error = %e, "raw exchange failed");
            }
        }
        result
    }

    async fn drive(&mut self, tls: &TlsOptions) -> Result<Response, WireError> {
        self.set_phase(DispatchPhase::RawDialing);
        let mut conn = connect::dial(&self.scheme, &self.authority, tls).await?;

        self.set_phase(DispatchPhase::RawWriting);
        self.write_payload(&mut conn).await?;

        self.set_phase(DispatchPhase::RawReading);
        let (head, body) = self.read_response(&mut conn).await?;

        // The connection never outlives the exchange.
        conn.shutdown().await.ok();
        drop(conn);

        Ok(Response::new(
            head.status,
            head.version,
            head.reason,
            head.headers,
            ResponseBody::Buffered(body),
        ))
    }

    fn set_phase(&mut self, phase: DispatchPhase) {
        tracing::trace!(authority = %self.authority, ?phase, "raw exchange phase");
        self.phase = phase;
    }

    /// Submit the payload with one write call. A transport that accepts
    /// fewer bytes than supplied fails the exchange; there is no retry
    /// loop, and the bytes are never inspected or altered.
    async fn write_payload(&self, conn: &mut SocketStream) -> Result<(), WireError> {
        let written = conn
            .write(&self.payload)
            .await
            .map_err(|e| WireError::Write { source: e })?;
        if written < self.payload.len() {
            return Err(WireError::Write {
                source: io::Error::new(
                    io::ErrorKind::WriteZero,
                    format!("short write: {written} of {} bytes", self.payload.len()),
                ),
            });
        }
        conn.flush()
            .await
            .map_err(|e| WireError::Write { source: e })?;
        tracing::debug!(authority = %self.authority, bytes = written, "raw payload written");
        Ok(())
    }

    async fn read_response(
        &self,
        conn: &mut SocketStream,
    ) -> Result<(ResponseHead, Bytes), WireError> {
        let mut buf = BytesMut::with_capacity(8 * 1024);

        // Accumulate until a complete status line and header block parse.
        let (head, head_len) = loop {
            if let Some(parsed) = framing::parse_head(&buf)? {
                break parsed;
            }
            let n = conn
                .read_buf(&mut buf)
                .await
                .map_err(|e| WireError::parse(format!("reading response head: {e}")))?;
            if n == 0 {
                return Err(WireError::parse(if buf.is_empty() {
                    "connection closed before any response bytes arrived"
                } else {
                    "connection closed mid-head"
                }));
            }
        };
        // Anything read past the head is the start of the body.
        let _ = buf.split_to(head_len);

        let rule = framing::body_framing(self.payload_method.as_ref(), &head)?;
        tracing::trace!(
            authority = %self.authority,
            status = %head.status,
            ?rule,
            "response head parsed"
        );

        let body = read_body(conn, rule, buf).await?;
        Ok((head, body))
    }
}

/// Read the response body according to `rule`, starting from any bytes
/// already pulled off the wire along with the head.
async fn read_body(
    conn: &mut SocketStream,
    rule: BodyFraming,
    mut buf: BytesMut,
) -> Result<Bytes, WireError> {
    match rule {
        BodyFraming::None => Ok(Bytes::new()),
        BodyFraming::ContentLength(declared) => {
            let len = usize::try_from(declared)
                .map_err(|_| WireError::parse(format!("Content-Length {declared} too large")))?;
            while buf.len() < len {
                let n = conn.read_buf(&mut buf).await.map_err(WireError::body_read)?;
                if n == 0 {
                    return Err(WireError::body_read(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("connection closed after {} of {len} body bytes", buf.len()),
                    )));
                }
            }
            buf.truncate(len);
            Ok(buf.freeze())
        }
        BodyFraming::Chunked => {
            let mut decoder = ChunkedDecoder::new();
            let mut out = Vec::new();
            loop {
                let consumed = decoder.decode(&buf, &mut out)?;
                let _ = buf.split_to(consumed);
                if decoder.is_done() {
                    break;
                }
                let n = conn.read_buf(&mut buf).await.map_err(WireError::body_read)?;
                if n == 0 {
                    return Err(WireError::body_read(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed mid-chunk",
                    )));
                }
            }
            Ok(Bytes::from(out))
        }
        BodyFraming::ReadToEnd => {
            loop {
                let n = conn.read_buf(&mut buf).await.map_err(WireError::body_read)?;
                if n == 0 {
                    break;
                }
            }
            Ok(buf.freeze())
        }
    }
}

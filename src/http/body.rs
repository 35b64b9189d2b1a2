//! Request and response bodies.

use std::fmt;

use bytes::Bytes;
use hyper::body::Incoming;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::base::WireError;

/// Request body for methods that send data.
///
/// `Reader` sources are drained in full before anything touches the wire;
/// the other variants are in-memory and cheap.
#[derive(Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// Body with raw bytes.
    Bytes(Bytes),
    /// Streaming source, consumed once.
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl RequestBody {
    /// Wrap an async reader as a request body.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        RequestBody::Reader(Box::new(reader))
    }

    /// Check if the body is known to be empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }

    /// Length in bytes, when known up front.
    pub fn len(&self) -> Option<usize> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Bytes(b) => Some(b.len()),
            RequestBody::Reader(_) => None,
        }
    }

    /// Drain the body to memory.
    pub(crate) async fn into_bytes(self) -> Result<Bytes, WireError> {
        match self {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Bytes(b) => Ok(b),
            RequestBody::Reader(mut r) => {
                let mut buf = Vec::new();
                r.read_to_end(&mut buf)
                    .await
                    .map_err(WireError::body_read)?;
                Ok(Bytes::from(buf))
            }
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => f.write_str("Empty"),
            RequestBody::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            RequestBody::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<String> for RequestBody {
    fn from(s: String) -> Self {
        RequestBody::Bytes(Bytes::from(s))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(v))
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Bytes(Bytes::from(s.to_owned()))
    }
}

impl From<&'static [u8]> for RequestBody {
    fn from(b: &'static [u8]) -> Self {
        RequestBody::Bytes(Bytes::from_static(b))
    }
}

impl From<Bytes> for RequestBody {
    fn from(b: Bytes) -> Self {
        RequestBody::Bytes(b)
    }
}

impl From<()> for RequestBody {
    fn from(_: ()) -> Self {
        RequestBody::Empty
    }
}

/// Response body, either fully buffered in memory or streamed by the
/// delegate transport.
///
/// Raw exchanges always produce `Buffered`: the connection that carried the
/// bytes is already closed, and the body can be read any number of times.
pub enum ResponseBody {
    /// In-memory body decoupled from any connection.
    Buffered(Bytes),
    /// Body streamed by the delegate transport, consumed once.
    Streaming(Incoming),
}

impl ResponseBody {
    /// Wrap already-collected bytes.
    pub fn buffered(bytes: impl Into<Bytes>) -> Self {
        ResponseBody::Buffered(bytes.into())
    }

    /// Whether the body is fully in memory.
    pub fn is_buffered(&self) -> bool {
        matches!(self, ResponseBody::Buffered(_))
    }

    /// Borrow the bytes of a buffered body without consuming it.
    ///
    /// Returns `None` for streaming bodies.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            ResponseBody::Buffered(b) => Some(b),
            ResponseBody::Streaming(_) => None,
        }
    }

    /// Drain the body to memory.
    pub async fn into_bytes(self) -> Result<Bytes, WireError> {
        match self {
            ResponseBody::Buffered(b) => Ok(b),
            ResponseBody::Streaming(inner) => {
                use http_body_util::BodyExt;
                let collected = inner
                    .collect()
                    .await
                    .map_err(|e| WireError::body_read(std::io::Error::other(e)))?;
                Ok(collected.to_bytes())
            }
        }
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Buffered(b) => f.debug_tuple("Buffered").field(&b.len()).finish(),
            ResponseBody::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

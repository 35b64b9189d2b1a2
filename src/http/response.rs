//! HTTP response with body access.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};
use hyper::body::Incoming;

use crate::base::WireError;
use crate::http::ResponseBody;

/// The user-facing response type.
///
/// Raw exchanges produce responses whose body is fully buffered and whose
/// `reason` carries the literal status-line text as it appeared on the wire.
/// Delegated responses stream their body and leave `reason` unset.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    version: Version,
    reason: Option<String>,
    headers: HeaderMap,
    body: ResponseBody,
}

impl Response {
    /// Assemble a response from parts. Custom delegates use this to hand
    /// back responses they produced themselves.
    pub fn new(
        status: StatusCode,
        version: Version,
        reason: Option<String>,
        headers: HeaderMap,
        body: ResponseBody,
    ) -> Self {
        Self {
            status,
            version,
            reason,
            headers,
            body,
        }
    }

    /// Create from a hyper response, keeping the body streaming.
    pub(crate) fn from_hyper(resp: http::Response<Incoming>) -> Self {
        let (parts, body) = resp.into_parts();
        Self {
            status: parts.status,
            version: parts.version,
            reason: None,
            headers: parts.headers,
            body: ResponseBody::Streaming(body),
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// The literal reason phrase from the status line, when the response was
    /// read off the wire by a raw exchange. `None` for delegated responses.
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Get a reference to the headers, in wire order.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Borrow the body.
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Mutable access to the body.
    pub fn body_mut(&mut self) -> &mut ResponseBody {
        &mut self.body
    }

    /// Consume the response, returning the body.
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Consume the response body as bytes.
    pub async fn bytes(self) -> Result<Bytes, WireError> {
        self.body.into_bytes().await
    }

    /// Consume the response body as text. Invalid UTF-8 is replaced rather
    /// than rejected; raw peers are free to send arbitrary bytes.
    pub async fn text(self) -> Result<String, WireError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Consume the response body as JSON, deserializing to `T`.
    #[cfg(feature = "json")]
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> Result<T, WireError> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(WireError::decode)
    }
}

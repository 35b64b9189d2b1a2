//! HTTP client with builder pattern.
//!
//! Provides a high-level, ergonomic API over the dispatcher: conventional
//! verbs ride the delegate, and [`Client::raw`] ships caller bytes over
//! the wire exactly as written.
//!
//! # Example
//!
//! ```rust,ignore
//! use rawwire::Client;
//!
//! let client = Client::builder()
//!     .timeout(std::time::Duration::from_secs(10))
//!     .build();
//!
//! let resp = client
//!     .raw(
//!         "https://example.org",
//!         "GET / HTTP/1.1\r\nHost: example.org\r\n\r\n",
//!     )
//!     .await?;
//! println!("{}", resp.status());
//! ```

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, Method};
use url::Url;

use crate::base::WireError;
use crate::http::{Request, RequestBody, Response};
use crate::socket::TlsOptions;
use crate::transport::{self, Delegate, Transport, TransportConfig};

/// HTTP client for making requests.
///
/// Cloning is cheap and shares the underlying transport, so one client
/// can serve many tasks concurrently. Use [`Client::builder()`] to
/// configure one.
#[derive(Clone)]
pub struct Client {
    transport: Arc<Transport>,
    timeout: Option<Duration>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self {
            transport: Arc::new(Transport::new(TransportConfig::default())),
            timeout: None,
        }
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Issue a GET request.
    pub async fn get<U: AsRef<str>>(
        &self,
        url: U,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(Method::GET, url.as_ref(), None, RequestBody::Empty, extras.into())
            .await
    }

    /// Issue a HEAD request.
    pub async fn head<U: AsRef<str>>(
        &self,
        url: U,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(Method::HEAD, url.as_ref(), None, RequestBody::Empty, extras.into())
            .await
    }

    /// Issue a DELETE request.
    pub async fn delete<U: AsRef<str>>(
        &self,
        url: U,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(
            Method::DELETE,
            url.as_ref(),
            None,
            RequestBody::Empty,
            extras.into(),
        )
        .await
    }

    /// Issue an OPTIONS request.
    pub async fn options<U: AsRef<str>>(
        &self,
        url: U,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(
            Method::OPTIONS,
            url.as_ref(),
            None,
            RequestBody::Empty,
            extras.into(),
        )
        .await
    }

    /// Issue a TRACE request.
    pub async fn trace<U: AsRef<str>>(
        &self,
        url: U,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(
            Method::TRACE,
            url.as_ref(),
            None,
            RequestBody::Empty,
            extras.into(),
        )
        .await
    }

    /// Issue a POST request with the given content type and body.
    ///
    /// An explicit `Content-Type` in `extras` wins over the parameter.
    pub async fn post<U: AsRef<str>>(
        &self,
        url: U,
        content_type: &str,
        body: impl Into<RequestBody>,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(
            Method::POST,
            url.as_ref(),
            Some(content_type),
            body.into(),
            extras.into(),
        )
        .await
    }

    /// Issue a PUT request with the given content type and body.
    pub async fn put<U: AsRef<str>>(
        &self,
        url: U,
        content_type: &str,
        body: impl Into<RequestBody>,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(
            Method::PUT,
            url.as_ref(),
            Some(content_type),
            body.into(),
            extras.into(),
        )
        .await
    }

    /// Issue a PATCH request with the given content type and body.
    pub async fn patch<U: AsRef<str>>(
        &self,
        url: U,
        content_type: &str,
        body: impl Into<RequestBody>,
        extras: impl Into<HeaderArgs>,
    ) -> Result<Response, WireError> {
        self.issue(
            Method::PATCH,
            url.as_ref(),
            Some(content_type),
            body.into(),
            extras.into(),
        )
        .await
    }

    /// Issue a CONNECT request.
    pub async fn connect<U: AsRef<str>>(&self, url: U) -> Result<Response, WireError> {
        self.issue(
            Method::CONNECT,
            url.as_ref(),
            None,
            RequestBody::Empty,
            HeaderArgs::none(),
        )
        .await
    }

    /// Send `body` verbatim to the URL's host and read one framed
    /// response back.
    ///
    /// The bytes cross the wire exactly as supplied: no request line is
    /// generated, no headers are added, nothing is escaped or completed.
    /// The URL contributes only the scheme, host, and port.
    pub async fn raw<U: AsRef<str>>(
        &self,
        url: U,
        body: impl Into<RequestBody>,
    ) -> Result<Response, WireError> {
        self.issue(
            transport::raw_method(),
            url.as_ref(),
            None,
            body.into(),
            HeaderArgs::none(),
        )
        .await
    }

    /// Start building a request with a custom method.
    pub fn request<U: AsRef<str>>(&self, method: Method, url: U) -> RequestBuilder {
        RequestBuilder {
            client: self.clone(),
            method,
            url: url.as_ref().to_string(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// Dispatch an already-built request, applying the client timeout to
    /// the whole round trip.
    pub async fn execute(&self, req: Request) -> Result<Response, WireError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.round_trip(req))
                .await
                .map_err(|_| WireError::Timeout(limit))?,
            None => self.transport.round_trip(req).await,
        }
    }

    async fn issue(
        &self,
        method: Method,
        url: &str,
        content_type: Option<&str>,
        body: RequestBody,
        extras: HeaderArgs,
    ) -> Result<Response, WireError> {
        let extras = extras.into_single()?;
        let url = Url::parse(url).map_err(|e| WireError::InvalidUrl(e.to_string()))?;

        let mut req = Request::new(method, url);
        if let Some(ct) = content_type {
            if let Ok(value) = http::HeaderValue::from_str(ct) {
                req.headers_mut().insert(http::header::CONTENT_TYPE, value);
            }
        }
        if let Some(map) = extras {
            req.headers_mut().extend(map);
        }
        req.set_body(body);

        self.execute(req).await
    }
}

/// Optional header sets for the direct verb calls.
///
/// Verbs accept `()` for no extra headers, a single [`HeaderMap`], or a
/// `Vec<HeaderMap>`. At most one map may be supplied; passing more is
/// reported as [`WireError::TooManyArguments`] before anything is
/// dialed.
pub struct HeaderArgs(Vec<HeaderMap>);

impl HeaderArgs {
    fn none() -> Self {
        HeaderArgs(Vec::new())
    }

    fn into_single(self) -> Result<Option<HeaderMap>, WireError> {
        if self.0.len() > 1 {
            return Err(WireError::TooManyArguments(self.0.len()));
        }
        Ok(self.0.into_iter().next())
    }
}

impl From<()> for HeaderArgs {
    fn from(_: ()) -> Self {
        HeaderArgs::none()
    }
}

impl From<HeaderMap> for HeaderArgs {
    fn from(map: HeaderMap) -> Self {
        HeaderArgs(vec![map])
    }
}

impl From<Vec<HeaderMap>> for HeaderArgs {
    fn from(maps: Vec<HeaderMap>) -> Self {
        HeaderArgs(maps)
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    config: TransportConfig,
    timeout: Option<Duration>,
    delegate: Option<Arc<dyn Delegate>>,
}

impl ClientBuilder {
    /// Set TLS options for both dispatch paths.
    pub fn tls_options(mut self, tls: TlsOptions) -> Self {
        self.config.tls = tls;
        self
    }

    /// Set a timeout covering each whole round trip.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set how long the delegate keeps idle pooled connections.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = Some(timeout);
        self
    }

    /// Cap idle pooled connections per host on the delegate path.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Disable connection reuse on the delegate path.
    pub fn disable_keep_alive(mut self, disable: bool) -> Self {
        self.config.disable_keep_alive = disable;
        self
    }

    /// Speak HTTP/2 only on the delegate path.
    pub fn force_http2(mut self, force: bool) -> Self {
        self.config.force_http2 = force;
        self
    }

    /// Cap delegate response heads at `max` bytes.
    pub fn max_response_header_bytes(mut self, max: usize) -> Self {
        self.config.max_response_header_bytes = Some(max);
        self
    }

    /// Use an exact read buffer size for delegate connections.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = Some(size);
        self
    }

    /// Bound delegate TLS handshakes.
    pub fn tls_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.tls_handshake_timeout = Some(timeout);
        self
    }

    /// Replace the bundled delegate with a caller-supplied one. Raw
    /// dispatch is unaffected.
    pub fn delegate(mut self, delegate: Arc<dyn Delegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Build the client.
    pub fn build(self) -> Client {
        let transport = match self.delegate {
            Some(delegate) => Transport::with_delegate(self.config, delegate),
            None => Transport::new(self.config),
        };
        Client {
            transport: Arc::new(transport),
            timeout: self.timeout,
        }
    }
}

/// Builder for a single request.
pub struct RequestBuilder {
    client: Client,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: RequestBody,
}

impl RequestBuilder {
    /// Add a header.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: http::header::IntoHeaderName,
        V: TryInto<http::HeaderValue>,
    {
        if let Ok(val) = value.try_into() {
            self.headers.insert(key, val);
        }
        self
    }

    /// Merge a set of headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set the request body.
    pub fn body<B: Into<RequestBody>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body.
    #[cfg(feature = "json")]
    pub fn json<T: serde::Serialize>(mut self, json: &T) -> Self {
        if let Ok(bytes) = serde_json::to_vec(json) {
            self.body = RequestBody::from(bytes);
            self.headers.insert(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static("application/json"),
            );
        }
        self
    }

    /// Send the request.
    pub async fn send(self) -> Result<Response, WireError> {
        let url = Url::parse(&self.url).map_err(|e| WireError::InvalidUrl(e.to_string()))?;
        let mut req = Request::new(self.method, url);
        *req.headers_mut() = self.headers;
        req.set_body(self.body);
        self.client.execute(req).await
    }
}

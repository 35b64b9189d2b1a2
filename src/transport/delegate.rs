//! The conventional-path seam and its bundled implementation.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http_body_util::Full;
use hyper_util::client::legacy::Client as PooledClient;
use hyper_util::rt::{TokioExecutor, TokioTimer};

use crate::base::WireError;
use crate::http::{Request, Response};
use crate::transport::config::TransportConfig;
use crate::transport::connector::BoringConnector;

/// Boxed future returned by [`Delegate::round_trip`].
pub type DelegateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Response, WireError>> + Send + 'a>>;

/// A conventional HTTP transport handling every request that is not raw.
///
/// Implementations own their connection management, protocol negotiation,
/// and header normalization. The dispatcher hands the request over
/// unchanged and returns the response unchanged; failures surface as
/// [`WireError::Delegate`].
pub trait Delegate: Send + Sync {
    fn round_trip(&self, req: Request) -> DelegateFuture<'_>;
}

/// The bundled delegate: hyper's pooled client over a boring TLS
/// connector.
pub struct HyperDelegate {
    client: PooledClient<BoringConnector, Full<Bytes>>,
}

impl HyperDelegate {
    pub fn new(config: &TransportConfig) -> Self {
        let connector = BoringConnector::new(config);
        let mut builder = PooledClient::builder(TokioExecutor::new());
        builder.pool_timer(TokioTimer::new());
        builder.pool_max_idle_per_host(if config.disable_keep_alive {
            0
        } else {
            config.pool_max_idle_per_host
        });
        if let Some(idle) = config.pool_idle_timeout {
            builder.pool_idle_timeout(idle);
        }
        if config.force_http2 {
            builder.http2_only(true);
        }
        if let Some(max) = config.max_response_header_bytes {
            builder.http1_max_buf_size(max);
        }
        if let Some(size) = config.read_buffer_size {
            builder.http1_read_buf_exact_size(size);
        }
        Self {
            client: builder.build(connector),
        }
    }
}

impl Delegate for HyperDelegate {
    fn round_trip(&self, req: Request) -> DelegateFuture<'_> {
        let client = self.client.clone();
        Box::pin(async move {
            let (method, url, headers, body) = req.into_parts();
            let bytes = body.into_bytes().await?;

            let uri: http::Uri = url
                .as_str()
                .parse()
                .map_err(|e: http::uri::InvalidUri| WireError::InvalidUrl(e.to_string()))?;
            let mut out = http::Request::builder()
                .method(method)
                .uri(uri)
                .body(Full::new(bytes))
                .map_err(WireError::delegate)?;
            *out.headers_mut() = headers;

            let resp = client.request(out).await.map_err(WireError::delegate)?;
            Ok(Response::from_hyper(resp))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_round_trip_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut req = vec![0u8; 4096];
            let _ = sock.read(&mut req).await;
            sock.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok")
                .await
                .unwrap();
        });

        let delegate = HyperDelegate::new(&TransportConfig::default());
        let url = format!("http://127.0.0.1:{port}/").parse().unwrap();
        let req = Request::new(http::Method::GET, url);
        let resp = delegate.round_trip(req).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.bytes().await.unwrap().as_ref(), b"ok");
    }

    #[tokio::test]
    async fn test_connect_failure_is_delegate_error() {
        let delegate = HyperDelegate::new(&TransportConfig::default());
        let url = "http://127.0.0.1:1/".parse().unwrap();
        let req = Request::new(http::Method::GET, url);
        let err = delegate.round_trip(req).await.unwrap_err();
        assert!(matches!(err, WireError::Delegate { .. }));
    }
}

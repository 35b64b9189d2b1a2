//! TCP/TLS connector backing the bundled delegate.
//!
//! Unlike raw dials, delegate dials infer default ports from the scheme
//! and may negotiate h2 over ALPN when the transport forces HTTP/2.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use http::Uri;

use crate::socket::connect;
use crate::socket::{SocketStream, TlsOptions};
use crate::transport::config::TransportConfig;

const ALPN_H1: &[&str] = &["http/1.1"];
const ALPN_H2: &[&str] = &["h2"];

/// Dials conventional connections: plain TCP for `http`, a boring TLS
/// handshake for `https`.
#[derive(Clone)]
pub(crate) struct BoringConnector {
    tls: TlsOptions,
    force_http2: bool,
    handshake_timeout: Option<Duration>,
}

impl BoringConnector {
    pub(crate) fn new(config: &TransportConfig) -> Self {
        Self {
            tls: config.tls.clone(),
            force_http2: config.force_http2,
            handshake_timeout: config.tls_handshake_timeout,
        }
    }

    async fn connect(self, dst: Uri) -> Result<SocketStream, io::Error> {
        let scheme = dst.scheme_str().unwrap_or("http").to_owned();
        let host = dst
            .host()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "URI has no host"))?
            .to_owned();
        let port = dst
            .port_u16()
            .unwrap_or(if scheme == "https" { 443 } else { 80 });

        // `Uri::host` keeps the brackets on IPv6 literals, which is what
        // the resolver wants but not what TLS wants.
        let authority = format!("{host}:{port}");
        let sni_host = host.trim_start_matches('[').trim_end_matches(']');

        tracing::debug!(%scheme, %authority, "delegate dialing");
        let tcp = connect::connect_tcp(&authority).await?;

        if scheme != "https" {
            return Ok(SocketStream::Tcp(tcp));
        }

        let default_alpn = if self.force_http2 { ALPN_H2 } else { ALPN_H1 };
        let connector = self.tls.build_connector(default_alpn)?;
        let mut config = connector.configure().map_err(io::Error::other)?;
        if self.tls.danger_accept_invalid_certs {
            config.set_verify_hostname(false);
        }
        if !crate::socket::tls::should_set_sni(sni_host) {
            config.set_use_server_name_indication(false);
            config.set_verify_hostname(false);
        }

        let handshake = tokio_boring::connect(config, sni_host, tcp);
        let stream = match self.handshake_timeout {
            Some(limit) => tokio::time::timeout(limit, handshake)
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "TLS handshake timed out"))?,
            None => handshake.await,
        }
        .map_err(|e| io::Error::other(format!("TLS handshake failed: {e:?}")))?;

        tracing::debug!(%authority, h2 = stream.ssl().selected_alpn_protocol() == Some(b"h2"), "delegate TLS established");
        Ok(SocketStream::Tls(stream))
    }
}

impl tower_service::Service<Uri> for BoringConnector {
    type Response = SocketStream;
    type Error = io::Error;
    type Future = Pin<Box<dyn Future<Output = Result<SocketStream, io::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, dst: Uri) -> Self::Future {
        Box::pin(self.clone().connect(dst))
    }
}

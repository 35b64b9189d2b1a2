//! Fresh-connection dialing for raw exchanges.

use std::io;

use tokio::net::TcpStream;

use crate::base::WireError;
use crate::socket::stream::SocketStream;
use crate::socket::tls::{should_set_sni, TlsOptions};

/// ALPN offered on raw-path TLS dials. Raw responses are framed as
/// HTTP/1.x, so h2 must never be negotiated here.
const RAW_ALPN: &[&str] = &["http/1.1"];

/// Open a fresh connection to `authority` on behalf of a raw exchange.
///
/// The authority must already carry an explicit port; no default is
/// inferred here. `https` gets a TLS client handshake, every other scheme
/// is plain TCP.
pub(crate) async fn dial(
    scheme: &str,
    authority: &str,
    tls: &TlsOptions,
) -> Result<SocketStream, WireError> {
    let host = authority_host(authority)
        .ok_or_else(|| WireError::dial(authority, missing_port_error()))?;

    tracing::debug!(%scheme, %authority, "dialing raw connection");

    let tcp = connect_tcp(authority)
        .await
        .map_err(|e| WireError::dial(authority, e))?;

    if scheme != "https" {
        return Ok(SocketStream::Tcp(tcp));
    }

    let connector = tls
        .build_connector(RAW_ALPN)
        .map_err(|e| WireError::dial(authority, e))?;
    let mut config = connector
        .configure()
        .map_err(|e| WireError::dial(authority, io::Error::other(e)))?;
    if tls.danger_accept_invalid_certs {
        config.set_verify_hostname(false);
    }
    if !should_set_sni(host) {
        config.set_use_server_name_indication(false);
        config.set_verify_hostname(false);
    }

    let stream = tokio_boring::connect(config, host, tcp).await.map_err(|e| {
        WireError::dial(
            authority,
            io::Error::other(format!("TLS handshake failed: {e:?}")),
        )
    })?;

    tracing::debug!(%authority, "raw TLS connection established");
    Ok(SocketStream::Tls(stream))
}

/// Resolve and connect, trying each address in order.
pub(crate) async fn connect_tcp(authority: &str) -> Result<TcpStream, io::Error> {
    let addrs = tokio::net::lookup_host(authority).await?;

    let mut last_err: Option<io::Error> = None;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no addresses resolved")
    }))
}

/// Split the host out of `host:port`, requiring an explicit, valid port.
fn authority_host(authority: &str) -> Option<&str> {
    let (host, port) = authority.rsplit_once(':')?;
    if host.is_empty() || port.parse::<u16>().is_err() {
        return None;
    }
    // bracketed IPv6 literal, e.g. [::1]:8080
    Some(host.trim_start_matches('[').trim_end_matches(']'))
}

fn missing_port_error() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "authority must include an explicit port",
    )
}

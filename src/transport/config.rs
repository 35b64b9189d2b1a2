//! Transport configuration.

use std::time::Duration;

use crate::socket::TlsOptions;

/// Settings a [`Transport`](crate::transport::Transport) is built with.
///
/// Raw exchanges consult only `tls`; every connection they open is fresh
/// and closed after one response. The remaining knobs tune the bundled
/// delegate, and a caller-supplied delegate is free to ignore them.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// TLS options applied to `https` dials on both dispatch paths.
    pub tls: TlsOptions,

    /// How long the delegate keeps an idle pooled connection around.
    pub pool_idle_timeout: Option<Duration>,

    /// Idle connections the delegate may pool per host.
    pub pool_max_idle_per_host: usize,

    /// Disable connection reuse on the delegate path entirely.
    pub disable_keep_alive: bool,

    /// Speak HTTP/2 only on the delegate path. The delegate's connector
    /// then offers `h2` via ALPN instead of `http/1.1`.
    pub force_http2: bool,

    /// Upper bound on delegate response heads, in bytes.
    pub max_response_header_bytes: Option<usize>,

    /// Exact read buffer size for delegate connections.
    pub read_buffer_size: Option<usize>,

    /// Time allowed for a delegate TLS handshake before the dial fails.
    pub tls_handshake_timeout: Option<Duration>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsOptions::default(),
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: usize::MAX,
            disable_keep_alive: false,
            force_http2: false,
            max_response_header_bytes: None,
            read_buffer_size: None,
            tls_handshake_timeout: Some(Duration::from_secs(10)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.pool_idle_timeout, Some(Duration::from_secs(90)));
        assert!(!config.disable_keep_alive);
        assert!(!config.force_http2);
        assert!(config.max_response_header_bytes.is_none());
    }
}

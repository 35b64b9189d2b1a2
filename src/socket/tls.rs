//! TLS configuration for dialed connections.

use boring::ssl::{SslConnector, SslConnectorBuilder, SslMethod, SslVerifyMode, SslVersion};

/// TLS protocol version selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsVersion(pub(crate) SslVersion);

impl TlsVersion {
    pub const TLS_1_0: TlsVersion = TlsVersion(SslVersion::TLS1);
    pub const TLS_1_1: TlsVersion = TlsVersion(SslVersion::TLS1_1);
    pub const TLS_1_2: TlsVersion = TlsVersion(SslVersion::TLS1_2);
    pub const TLS_1_3: TlsVersion = TlsVersion(SslVersion::TLS1_3);
}

/// Builder for `TlsOptions`.
#[must_use]
#[derive(Debug, Clone)]
pub struct TlsOptionsBuilder {
    config: TlsOptions,
}

/// TLS connection configuration options.
///
/// One value serves both paths: raw exchanges apply it when dialing an
/// `https` target, and the bundled delegate's connector applies it to
/// conventional requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsOptions {
    /// ALPN protocols to offer. `None` lets each path pick its default;
    /// the raw path never offers `h2` regardless.
    pub alpn_protocols: Option<Vec<String>>,

    /// Minimum TLS version.
    pub min_tls_version: Option<TlsVersion>,

    /// Maximum TLS version.
    pub max_tls_version: Option<TlsVersion>,

    /// Cipher suite configuration string.
    pub cipher_list: Option<String>,

    /// Disable certificate chain and hostname verification.
    ///
    /// Useful against lab servers with self-signed certificates; dangerous
    /// anywhere else.
    pub danger_accept_invalid_certs: bool,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            alpn_protocols: None,
            min_tls_version: Some(TlsVersion::TLS_1_2),
            max_tls_version: None,
            cipher_list: None,
            danger_accept_invalid_certs: false,
        }
    }
}

impl TlsOptionsBuilder {
    pub fn new() -> Self {
        Self {
            config: TlsOptions::default(),
        }
    }

    pub fn alpn_protocols(mut self, alpn: &[&str]) -> Self {
        self.config.alpn_protocols = Some(alpn.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn min_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.min_tls_version = Some(version);
        self
    }

    pub fn max_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.max_tls_version = Some(version);
        self
    }

    pub fn cipher_list(mut self, ciphers: &str) -> Self {
        self.config.cipher_list = Some(ciphers.to_string());
        self
    }

    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.danger_accept_invalid_certs = accept;
        self
    }

    pub fn build(self) -> TlsOptions {
        self.config
    }
}

impl Default for TlsOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsOptions {
    pub fn builder() -> TlsOptionsBuilder {
        TlsOptionsBuilder::new()
    }

    /// Apply this configuration to an SSL connector builder. `default_alpn`
    /// is offered when the options do not pin their own protocol list.
    pub(crate) fn apply_to_builder(
        &self,
        builder: &mut SslConnectorBuilder,
        default_alpn: &[&str],
    ) -> Result<(), std::io::Error> {
        if let Some(min) = self.min_tls_version {
            builder
                .set_min_proto_version(Some(min.0))
                .map_err(std::io::Error::other)?;
        }
        if let Some(max) = self.max_tls_version {
            builder
                .set_max_proto_version(Some(max.0))
                .map_err(std::io::Error::other)?;
        }

        if let Some(ciphers) = &self.cipher_list {
            builder
                .set_cipher_list(ciphers)
                .map_err(std::io::Error::other)?;
        }

        let protos: Vec<&str> = match &self.alpn_protocols {
            Some(list) => list.iter().map(String::as_str).collect(),
            None => default_alpn.to_vec(),
        };
        if !protos.is_empty() {
            let mut alpn_wire = Vec::new();
            for proto in &protos {
                if proto.len() > 255 {
                    return Err(std::io::Error::other(format!(
                        "ALPN protocol {proto:?} exceeds 255 bytes"
                    )));
                }
                alpn_wire.push(proto.len() as u8);
                alpn_wire.extend_from_slice(proto.as_bytes());
            }
            builder
                .set_alpn_protos(&alpn_wire)
                .map_err(std::io::Error::other)?;
        }

        builder.set_verify(if self.danger_accept_invalid_certs {
            SslVerifyMode::NONE
        } else {
            SslVerifyMode::PEER
        });

        Ok(())
    }

    /// Build a connector with these options applied.
    pub(crate) fn build_connector(
        &self,
        default_alpn: &[&str],
    ) -> Result<SslConnector, std::io::Error> {
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(std::io::Error::other)?;
        self.apply_to_builder(&mut builder, default_alpn)?;
        Ok(builder.build())
    }
}

/// Check if SNI should be set for this host.
/// Per RFC 6066, SNI must not carry a raw IP address.
pub(crate) fn should_set_sni(host: &str) -> bool {
    host.parse::<std::net::IpAddr>().is_err()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = TlsOptions::default();
        assert_eq!(opts.min_tls_version, Some(TlsVersion::TLS_1_2));
        assert!(opts.alpn_protocols.is_none());
        assert!(!opts.danger_accept_invalid_certs);
    }

    #[test]
    fn test_builder_sets_fields() {
        let opts = TlsOptions::builder()
            .alpn_protocols(&["http/1.1"])
            .max_tls_version(TlsVersion::TLS_1_3)
            .danger_accept_invalid_certs(true)
            .build();
        assert_eq!(opts.alpn_protocols, Some(vec!["http/1.1".to_string()]));
        assert_eq!(opts.max_tls_version, Some(TlsVersion::TLS_1_3));
        assert!(opts.danger_accept_invalid_certs);
    }

    #[test]
    fn test_options_apply_cleanly() {
        let opts = TlsOptions::builder()
            .alpn_protocols(&["http/1.1"])
            .build();
        assert!(opts.build_connector(&[]).is_ok());
    }

    #[test]
    fn test_sni_host_detection() {
        assert!(should_set_sni("example.org"));
        assert!(!should_set_sni("127.0.0.1"));
        assert!(!should_set_sni("::1"));
    }
}

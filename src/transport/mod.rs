//! Request dispatch.
//!
//! Every request enters through [`Transport::round_trip`]. Ordinary
//! methods are handed to the configured [`Delegate`] untouched; the
//! `RAW` pseudo-method instead ships the request body verbatim over a
//! fresh connection and reads one framed response back.

pub mod config;
pub(crate) mod connector;
pub mod delegate;
pub(crate) mod raw;

pub use config::TransportConfig;
pub use delegate::{Delegate, DelegateFuture, HyperDelegate};

use std::sync::Arc;

use http::Method;
use url::Url;

use crate::base::{DispatchPhase, WireError};
use crate::http::{Request, Response};
use raw::RawExchange;

/// Method string that routes a request to the raw wire exchange.
pub const RAW_METHOD: &str = "RAW";

/// Whether `method` names the raw escape hatch. Matching ignores ASCII
/// case, so `raw` and `Raw` dispatch the same way.
pub fn is_raw_method(method: &Method) -> bool {
    method.as_str().eq_ignore_ascii_case(RAW_METHOD)
}

/// The raw pseudo-method as an [`http::Method`] value.
pub fn raw_method() -> Method {
    Method::from_bytes(RAW_METHOD.as_bytes()).expect("RAW is a valid method token")
}

/// Routes requests to the raw exchange or the delegate.
pub struct Transport {
    config: TransportConfig,
    delegate: Arc<dyn Delegate>,
}

impl Transport {
    /// Build a transport backed by the bundled hyper delegate.
    pub fn new(config: TransportConfig) -> Self {
        let delegate = Arc::new(HyperDelegate::new(&config));
        Self { config, delegate }
    }

    /// Build a transport with a caller-supplied delegate for the
    /// conventional path. Raw dispatch is unaffected.
    pub fn with_delegate(config: TransportConfig, delegate: Arc<dyn Delegate>) -> Self {
        Self { config, delegate }
    }

    /// The configuration this transport was built with.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Dispatch one request.
    ///
    /// The raw path serializes nothing: whatever bytes the request body
    /// holds are what cross the wire. Envelope headers on a raw request
    /// are ignored; anything the peer should see must already be in the
    /// payload.
    pub async fn round_trip(&self, req: Request) -> Result<Response, WireError> {
        if !is_raw_method(req.method()) {
            tracing::debug!(
                method = %req.method(),
                url = %req.url(),
                phase = ?DispatchPhase::Delegated,
                "delegating request"
            );
            return self.delegate.round_trip(req).await;
        }

        let (method, url, _headers, body) = req.into_parts();
        let scheme = url.scheme().to_owned();
        let authority = raw_authority(&url)?;
        let payload = body.into_bytes().await?;
        tracing::debug!(%method, %authority, bytes = payload.len(), "dispatching raw request");

        let mut exchange = RawExchange::new(&scheme, &authority, payload);
        exchange.run(&self.config.tls).await
    }
}

/// Authority (`host:port`) for a raw dial.
///
/// The URL parser folds an explicit default port into its scheme, so the
/// effective port is used when the scheme has one. A scheme with no known
/// default and no explicit port cannot be dialed.
fn raw_authority(url: &Url) -> Result<String, WireError> {
    let host = url
        .host_str()
        .ok_or_else(|| WireError::InvalidUrl(format!("no host in {url}")))?;
    let port = url.port_or_known_default().ok_or_else(|| {
        WireError::dial(
            host,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "URL carries no port and its scheme has no default",
            ),
        )
    })?;
    Ok(format!("{host}:{port}"))
}

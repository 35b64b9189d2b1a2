//! # rawwire
//!
//! An HTTP client with a wire-level escape hatch.
//!
//! `rawwire` behaves like an ordinary client for ordinary methods and
//! hands them to a conventional transport. Give a request the `RAW`
//! pseudo-method instead and the body bytes are sent over the connection
//! exactly as written: no request line is generated, no headers are
//! added or reordered, nothing is escaped, completed, or validated. The
//! response is read back with plain HTTP/1.x framing and fully buffered
//! before the connection is closed.
//!
//! That makes deliberately malformed traffic a first-class citizen:
//! protocol compliance testing, server fuzzing, and request smuggling
//! research all need bytes on the wire that a well-behaved client
//! refuses to produce.
//!
//! ## Features
//!
//! - **Two dispatch paths**: conventional verbs ride a pooled hyper
//!   client, `RAW` gets a fresh connection per exchange
//! - **Verbatim payloads**: one write call, unaltered bytes, short
//!   writes surface as errors rather than retries
//! - **Framed reads**: status line, headers, and body framing per
//!   HTTP/1.x, including chunked decoding
//! - **TLS**: BoringSSL via `boring`, with ALPN pinned to HTTP/1.1 on
//!   the raw path
//! - **Replayable responses**: raw bodies are buffered in full, so they
//!   can be read any number of times after the connection is gone
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rawwire::Client;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::new();
//!     let resp = client
//!         .raw(
//!             "https://example.org",
//!             "GET / HTTP/1.1\r\nHost: example.org\r\nConnection: close\r\n\r\n",
//!         )
//!         .await
//!         .unwrap();
//!     println!("Status: {}", resp.status());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error and dispatch-phase definitions
//! - [`client`] - High-level client, builders, and convenience verbs
//! - [`http`] - Request and response types, bodies, and framing
//! - [`socket`] - Connection dialing, TLS options, and socket streams
//! - [`transport`] - Dispatch between the raw exchange and the delegate

pub mod base;
pub mod client;
pub mod http;
pub mod socket;
pub mod transport;

pub use base::{DispatchPhase, WireError};
pub use client::{Client, ClientBuilder, HeaderArgs, RequestBuilder};
pub use http::{Request, RequestBody, Response, ResponseBody};
pub use socket::{TlsOptions, TlsOptionsBuilder, TlsVersion};
pub use transport::{Delegate, Transport, TransportConfig, RAW_METHOD};

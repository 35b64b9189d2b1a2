//! Connection establishment and stream types.

pub(crate) mod connect;
pub mod stream;
pub mod tls;

pub use stream::SocketStream;
pub use tls::{TlsOptions, TlsOptionsBuilder, TlsVersion};

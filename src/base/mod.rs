//! Base types and error handling.
//!
//! Foundational vocabulary shared across the crate:
//! - [`WireError`]: the error kinds surfaced by dispatch and raw exchanges
//! - [`DispatchPhase`]: the stages a dispatched request moves through

pub mod error;
pub mod phase;

pub use error::WireError;
pub use phase::DispatchPhase;

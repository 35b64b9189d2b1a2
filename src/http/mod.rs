pub mod body;
pub(crate) mod framing;
pub mod request;
pub mod response;

// Re-exports for convenience
pub use body::{RequestBody, ResponseBody};
pub use request::Request;
pub use response::Response;

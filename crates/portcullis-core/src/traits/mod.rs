//! Core traits defined in `portcullis-core` and implemented by other crates.

pub mod storage;
pub mod transport;

pub use storage::KeyValueStorage;
pub use transport::{ApiRequest, ApiResponse, HttpMethod, HttpTransport};

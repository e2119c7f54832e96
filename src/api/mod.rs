//! Backend wire types and the transport used to reach it.

pub mod error;
pub mod transport;
pub mod types;

pub use error::FetchError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};

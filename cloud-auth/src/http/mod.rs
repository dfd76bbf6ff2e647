//! HTTP client building with middleware.

mod client;
mod retry;

pub use client::{ClientBuilder, HttpClient, HttpClientConfig};
pub use retry::BackoffPolicy;

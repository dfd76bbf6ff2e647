//! # cloud-auth
//!
//! Credentials and request authentication for the services the dashboard talks to:
//! - Google OAuth 2.0 sign-in (authorization URL, code exchange, user info)
//! - V4 HMAC signing of object storage URLs
//! - HTTP client building with retry middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cloud_auth::{
//!     oauth::{Provider, providers::google},
//!     signing::{HmacCredentials, UrlSigner},
//!     http::ClientBuilder,
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;
pub mod signing;

// Re-export commonly used types
pub use error::{Error, ErrorKind};

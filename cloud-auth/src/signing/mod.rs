//! V4 signing of object storage URLs with HMAC service account keys.

mod v4;

use secrecy::SecretString;

pub use v4::{UrlSigner, MAX_EXPIRATION_SECS};

/// HMAC key pair of the service account that owns the storage bucket.
#[derive(Debug, Clone)]
pub struct HmacCredentials {
    pub access_id: String,
    pub secret: SecretString,
}

impl HmacCredentials {
    pub fn new(access_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            secret: SecretString::new(secret.into()),
        }
    }
}

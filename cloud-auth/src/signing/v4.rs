//! Query-string (V4) signing for the storage XML API.
//!
//! A signed URL carries the credential scope, timestamp, lifetime and the list of signed
//! headers as `X-Goog-*` query parameters, followed by an HMAC-SHA256 signature over the
//! canonical request. Anyone holding the URL can perform exactly that request until it
//! expires.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::*;
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use url::Url;

use super::HmacCredentials;
use crate::error::{signing_error, Error, SigningErrorKind};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "GOOG4-HMAC-SHA256";
const REGION: &str = "auto";
const SERVICE: &str = "storage";
const REQUEST_TYPE: &str = "goog4_request";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// Longest lifetime the storage service accepts for a signed URL (seven days).
pub const MAX_EXPIRATION_SECS: u64 = 604_800;

/// Produces V4 signed URLs for objects under one storage endpoint.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    base_url: String,
    host: String,
    credentials: HmacCredentials,
}

impl UrlSigner {
    pub fn new(base_url: &str, credentials: HmacCredentials) -> Result<Self, Error> {
        let parsed = Url::parse(base_url)
            .map_err(|e| signing_error(SigningErrorKind::InvalidEndpoint, &e.to_string()))?;

        // The host header is signed, so it must match what the client will send,
        // including a non-default port.
        let host = match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(signing_error(
                    SigningErrorKind::InvalidEndpoint,
                    "storage endpoint has no host",
                ))
            }
        };

        if credentials.access_id.is_empty() || credentials.secret.expose_secret().is_empty() {
            return Err(signing_error(
                SigningErrorKind::MissingCredentials,
                "HMAC access id and secret are required",
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            host,
            credentials,
        })
    }

    /// Signs `method` on `/{bucket}/{object}`, valid for `expires_in_secs` from `now`.
    ///
    /// `headers` lists extra request headers the client must send verbatim (for uploads,
    /// `content-type`). The `host` header is always signed.
    pub fn sign(
        &self,
        method: &str,
        bucket: &str,
        object: &str,
        expires_in_secs: u64,
        headers: &[(&str, &str)],
        now: DateTime<Utc>,
    ) -> Result<String, Error> {
        if expires_in_secs == 0 || expires_in_secs > MAX_EXPIRATION_SECS {
            return Err(signing_error(
                SigningErrorKind::InvalidExpiration,
                &format!("expiration must be between 1 and {MAX_EXPIRATION_SECS} seconds"),
            ));
        }

        let datestamp = now.format("%Y%m%d").to_string();
        let timestamp = now.format("%Y%m%dT%H%M%SZ").to_string();
        let scope = format!("{datestamp}/{REGION}/{SERVICE}/{REQUEST_TYPE}");
        let path = canonical_uri(bucket, object);

        let mut canonical_headers: Vec<(String, String)> = headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
            .filter(|(name, _)| name != "host")
            .collect();
        canonical_headers.push(("host".to_string(), self.host.clone()));
        canonical_headers.sort();

        let signed_headers = canonical_headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        // Already in byte order of the keys.
        let query = [
            ("X-Goog-Algorithm", ALGORITHM.to_string()),
            (
                "X-Goog-Credential",
                format!("{}/{scope}", self.credentials.access_id),
            ),
            ("X-Goog-Date", timestamp.clone()),
            ("X-Goog-Expires", expires_in_secs.to_string()),
            ("X-Goog-SignedHeaders", signed_headers.clone()),
        ];
        let canonical_query = query
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let header_block: String = canonical_headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();

        let canonical_request = format!(
            "{}\n{path}\n{canonical_query}\n{header_block}\n{signed_headers}\n{UNSIGNED_PAYLOAD}",
            method.to_ascii_uppercase()
        );
        let string_to_sign = format!(
            "{ALGORITHM}\n{timestamp}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let signing_key = self.signing_key(&datestamp)?;
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes())?);

        debug!("Signed {method} URL for {path} valid for {expires_in_secs}s");

        Ok(format!(
            "{}{path}?{canonical_query}&X-Goog-Signature={signature}",
            self.base_url
        ))
    }

    fn signing_key(&self, datestamp: &str) -> Result<Vec<u8>, Error> {
        let secret = format!("GOOG4{}", self.credentials.secret.expose_secret());
        let key = hmac_sha256(secret.as_bytes(), datestamp.as_bytes())?;
        let key = hmac_sha256(&key, REGION.as_bytes())?;
        let key = hmac_sha256(&key, SERVICE.as_bytes())?;
        hmac_sha256(&key, REQUEST_TYPE.as_bytes())
    }
}

/// `/{bucket}/{object}` with every path segment percent-encoded.
fn canonical_uri(bucket: &str, object: &str) -> String {
    let object = object
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}/{object}", urlencoding::encode(bucket))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| {
        signing_error(SigningErrorKind::MissingCredentials, "invalid HMAC key")
    })?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

//! Storage object addresses of the form `scheme://bucket/path`.

use std::fmt;
use std::str::FromStr;

use crate::error::{EntityErrorKind, Error};

pub const GCS_SCHEME: &str = "gs";

/// Address of an object in a blob store.
///
/// Produced by the upload workflow and parsed back when signing read URLs, so both
/// directions go through this one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUri {
    scheme: String,
    bucket: String,
    path: String,
}

impl ObjectUri {
    pub fn gcs(bucket: &str, path: &str) -> Self {
        Self {
            scheme: GCS_SCHEME.to_string(),
            bucket: bucket.to_string(),
            path: path.to_string(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key within the bucket, without a leading slash.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}/{}", self.scheme, self.bucket, self.path)
    }
}

impl FromStr for ObjectUri {
    type Err = Error;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            log::warn!("Malformed object address: {uri}");
            Error::entity(EntityErrorKind::Invalid)
        };

        let (scheme, rest) = uri.split_once("://").ok_or_else(invalid)?;
        let (bucket, path) = rest.split_once('/').ok_or_else(invalid)?;

        if scheme.is_empty() || bucket.is_empty() || path.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            scheme: scheme.to_string(),
            bucket: bucket.to_string(),
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, InternalErrorKind};

    #[test]
    fn parses_bucket_and_nested_path() {
        let uri: ObjectUri = "gs://bucket-x/a/b/c.wav".parse().unwrap();
        assert_eq!(uri.scheme(), "gs");
        assert_eq!(uri.bucket(), "bucket-x");
        assert_eq!(uri.path(), "a/b/c.wav");
        assert_eq!(uri.to_string(), "gs://bucket-x/a/b/c.wav");
    }

    #[test]
    fn gcs_constructor_formats_as_gs_uri() {
        let uri = ObjectUri::gcs("acme-operation-insights-audio-files", "__id1__call-5.mp3");
        assert_eq!(
            uri.to_string(),
            "gs://acme-operation-insights-audio-files/__id1__call-5.mp3"
        );
    }

    #[test]
    fn rejects_incomplete_addresses() {
        for bad in ["", "gs://", "gs://bucket", "gs://bucket/", "://bucket/key", "gs:///key", "bucket/key"] {
            let err = bad.parse::<ObjectUri>().unwrap_err();
            assert_eq!(
                err.error_kind,
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid)),
                "expected {bad:?} to be rejected"
            );
        }
    }
}

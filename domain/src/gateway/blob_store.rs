//! Object storage for uploaded audio.
//!
//! [`GcsBlobStore`] talks to the storage XML API. Every request, including uploads, goes
//! through a V4 signed URL, so the only credential the process needs is an HMAC key.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use cloud_auth::http::{ClientBuilder, HttpClient};
use cloud_auth::signing::{HmacCredentials, UrlSigner};
use log::*;
use service::config::Config;

use crate::error::{DomainErrorKind, Error, ExternalErrorKind, InternalErrorKind};
use crate::object_uri::ObjectUri;

/// How long the signed URL used for a single upload stays valid.
const UPLOAD_URL_TTL_SECS: u64 = 900;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` under `key` in `bucket`, replacing any existing object.
    async fn put(&self, bucket: &str, key: &str, content_type: &str, data: Bytes)
        -> Result<(), Error>;

    /// A URL granting read access to `object` for `ttl`.
    fn signed_read_url(&self, object: &ObjectUri, ttl: Duration) -> Result<String, Error>;
}

pub struct GcsBlobStore {
    signer: UrlSigner,
    http_client: HttpClient,
}

impl GcsBlobStore {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let (Some(access_id), Some(secret)) = (
            config.storage_hmac_access_id(),
            config.storage_hmac_secret(),
        ) else {
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
            });
        };

        let signer = UrlSigner::new(
            config.storage_base_url(),
            HmacCredentials::new(access_id, secret),
        )?;
        let http_client = ClientBuilder::new()
            .with_timeout(Duration::from_secs(config.storage_timeout_secs))
            .with_max_retries(config.storage_max_retries)
            .build()?;

        Ok(Self {
            signer,
            http_client,
        })
    }
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<(), Error> {
        let url = self.signer.sign(
            "PUT",
            bucket,
            key,
            UPLOAD_URL_TTL_SECS,
            &[("content-type", content_type)],
            Utc::now(),
        )?;

        debug!("Uploading {} bytes to {bucket}/{key}", data.len());

        let response = self
            .http_client
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        if response.status().is_success() {
            info!("Stored object {bucket}/{key}");
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Storage rejected upload of {bucket}/{key} with {status}: {error_text}");
            Err(Error {
                source: None,
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(format!(
                    "storage responded with {status}"
                ))),
            })
        }
    }

    fn signed_read_url(&self, object: &ObjectUri, ttl: Duration) -> Result<String, Error> {
        Ok(self.signer.sign(
            "GET",
            object.bucket(),
            object.path(),
            ttl.as_secs(),
            &[],
            Utc::now(),
        )?)
    }
}

#[cfg(any(test, feature = "mock"))]
pub use memory::MemoryBlobStore;

#[cfg(any(test, feature = "mock"))]
mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-process [`BlobStore`] for tests. Can be told to fail uploads.
    #[derive(Default)]
    pub struct MemoryBlobStore {
        objects: Mutex<HashMap<(String, String), (String, Bytes)>>,
        fail_uploads: AtomicBool,
        signed: AtomicUsize,
    }

    impl MemoryBlobStore {
        pub fn failing() -> Self {
            let store = Self::default();
            store.fail_uploads.store(true, Ordering::SeqCst);
            store
        }

        /// Content type and bytes stored under `bucket`/`key`.
        pub fn get(&self, bucket: &str, key: &str) -> Option<(String, Bytes)> {
            self.objects
                .lock()
                .ok()?
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
        }

        pub fn len(&self) -> usize {
            self.objects.lock().map(|objects| objects.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Number of read URLs handed out so far.
        pub fn signed_count(&self) -> usize {
            self.signed.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn put(
            &self,
            bucket: &str,
            key: &str,
            content_type: &str,
            data: Bytes,
        ) -> Result<(), Error> {
            if self.fail_uploads.load(Ordering::SeqCst) {
                return Err(Error {
                    source: None,
                    error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
                });
            }
            self.objects
                .lock()
                .map_err(|_| Error::other("blob store lock poisoned"))?
                .insert(
                    (bucket.to_string(), key.to_string()),
                    (content_type.to_string(), data),
                );
            Ok(())
        }

        fn signed_read_url(&self, object: &ObjectUri, ttl: Duration) -> Result<String, Error> {
            self.signed.fetch_add(1, Ordering::SeqCst);
            Ok(format!(
                "https://signed.test/{}/{}?ttl={}",
                object.bucket(),
                object.path(),
                ttl.as_secs()
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcs_store(base_url: &str) -> GcsBlobStore {
        let config = Config::try_from_args(["call_insights", "--storage-max-retries", "0"])
            .unwrap()
            .set_storage_base_url(base_url.to_string())
            .set_storage_hmac_credentials("GOOG1TEST".to_string(), "secret".to_string());
        GcsBlobStore::new(&config).unwrap()
    }

    #[tokio::test]
    async fn put_uploads_through_signed_url() {
        let mut server = mockito::Server::new_async().await;
        let upload = server
            .mock(
                "PUT",
                mockito::Matcher::Regex(r"^/acme-bucket/__id1__call-5\.mp3".to_string()),
            )
            .match_query(mockito::Matcher::Regex(
                "X-Goog-Signature=[0-9a-f]{64}".to_string(),
            ))
            .match_header("content-type", "audio/mpeg")
            .match_body("abc")
            .with_status(200)
            .create_async()
            .await;

        gcs_store(&server.url())
            .put("acme-bucket", "__id1__call-5.mp3", "audio/mpeg", Bytes::from_static(b"abc"))
            .await
            .unwrap();

        upload.assert_async().await;
    }

    #[tokio::test]
    async fn put_reports_rejected_upload() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", mockito::Matcher::Any)
            .with_status(403)
            .with_body("<Error><Code>SignatureDoesNotMatch</Code></Error>")
            .create_async()
            .await;

        let err = gcs_store(&server.url())
            .put("acme-bucket", "key.mp3", "audio/mpeg", Bytes::from_static(b"abc"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other(_))
        ));
    }

    #[test]
    fn signed_read_url_targets_object() {
        let store = gcs_store("https://storage.googleapis.com");
        let object: ObjectUri = "gs://acme-bucket/__id1__call-5.mp3".parse().unwrap();

        let url = store
            .signed_read_url(&object, Duration::from_secs(600))
            .unwrap();

        assert!(url.starts_with("https://storage.googleapis.com/acme-bucket/__id1__call-5.mp3?"));
        assert!(url.contains("X-Goog-Expires=600"));
        assert!(url.contains("X-Goog-Signature="));
    }

    #[test]
    fn new_requires_hmac_credentials() {
        let config = Config::try_from_args(["call_insights"]).unwrap();
        let err = GcsBlobStore::new(&config).err().unwrap();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
    }

    #[tokio::test]
    async fn memory_store_keeps_uploads() {
        let store = MemoryBlobStore::default();
        store
            .put("b", "k", "audio/wav", Bytes::from_static(b"data"))
            .await
            .unwrap();
        assert_eq!(
            store.get("b", "k"),
            Some(("audio/wav".to_string(), Bytes::from_static(b"data")))
        );
        assert!(MemoryBlobStore::failing()
            .put("b", "k", "audio/wav", Bytes::new())
            .await
            .is_err());
    }
}

//! Upload, search and insight retrieval for case recordings.
//!
//! An upload writes the metadata record twice: once to obtain the record id, which is
//! embedded in the object key, and once more to record the object address after the
//! audio has been stored. The two writes are not atomic. If the upload fails the
//! record stays in `processing` with no address, and retrieval reports the audio as
//! not yet available.

use std::time::Duration;

use bytes::Bytes;
use chrono::Utc;
use chrono_tz::Tz;
use entity_api::case_recording;
use log::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::ConnectionTrait;

use crate::case_recordings::Model;
use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use crate::gateway::blob_store::BlobStore;
use crate::insight::{Insight, InsightReport};
use crate::object_uri::ObjectUri;
use crate::site_config;
use crate::Id;

const DEFAULT_BASE_NAME: &str = "audio";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DISPLAY_FORMAT: &str = "%d/%m/%Y, %I:%M:%S %p";

/// An audio file as received from the browser.
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Registers a recording for `case_id` and stores its audio.
///
/// Returns the record with its object address set.
pub async fn upload(
    db: &impl ConnectionTrait,
    blob_store: &dyn BlobStore,
    case_id: &str,
    file: AudioFile,
) -> Result<Model, Error> {
    let case_id = case_id.trim();
    if case_id.is_empty() {
        warn!("Rejected upload without a case id");
        return Err(Error::entity(EntityErrorKind::Invalid));
    }

    let current = site_config::find_or_placeholder(db).await?;
    if current.is_placeholder {
        error!("Site configuration has not been saved, refusing upload for case {case_id}");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        });
    }
    let bucket = current.config.bucket_name();

    let submitted_at = Utc::now().fixed_offset();
    let record = case_recording::create(db, case_id, submitted_at).await?;

    let key = object_key(record.id, &file.file_name, submitted_at.timestamp_millis());
    let content_type = file
        .content_type
        .as_deref()
        .filter(|content_type| !content_type.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    if let Err(err) = blob_store.put(&bucket, &key, content_type, file.data).await {
        error!(
            "Upload of recording {} for case {case_id} failed, record left without audio: {err:?}",
            record.id
        );
        return Err(err);
    }

    let object_uri = ObjectUri::gcs(&bucket, &key).to_string();
    case_recording::set_object_uri(db, record.id, &object_uri).await?;

    info!("Stored recording {} for case {case_id} at {object_uri}", record.id);

    Ok(Model {
        object_uri: Some(object_uri),
        ..record
    })
}

/// Object key for a recording: `__id{id}__{base}-{millis}.{ext}`.
///
/// `base` and `ext` come from the file name the browser sent, with any directory
/// components removed and split at the last dot.
pub fn object_key(id: Id, file_name: &str, submitted_at_millis: i64) -> String {
    let file_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    let (base, extension) = match file_name.rsplit_once('.') {
        Some((base, extension)) => (base, extension),
        None => (file_name, ""),
    };
    let base = if base.is_empty() { DEFAULT_BASE_NAME } else { base };

    if extension.is_empty() {
        format!("__id{id}__{base}-{submitted_at_millis}")
    } else {
        format!("__id{id}__{base}-{submitted_at_millis}.{extension}")
    }
}

/// Recordings filed under exactly `case_id`. A blank case id matches nothing.
pub async fn find_by_case_id(db: &impl ConnectionTrait, case_id: &str) -> Result<Vec<Model>, Error> {
    let case_id = case_id.trim();
    if case_id.is_empty() {
        return Ok(vec![]);
    }
    Ok(case_recording::find_by_case_id(db, case_id).await?)
}

/// Insights for a recording plus a fresh read URL for its audio, valid for `ttl`.
pub async fn insights(
    db: &impl ConnectionTrait,
    blob_store: &dyn BlobStore,
    id: &str,
    ttl: Duration,
) -> Result<InsightReport, Error> {
    let record = case_recording::find_by_id_str(db, id).await?;

    let Some(object_uri) = record.object_uri.as_deref() else {
        debug!("Recording {} has no stored audio yet", record.id);
        return Err(Error::entity(EntityErrorKind::MissingObject));
    };
    let object_uri: ObjectUri = object_uri.parse()?;

    let signed_url = blob_store.signed_read_url(&object_uri, ttl)?;
    let insight = Insight::from_payload(record.insight_payload.as_deref()).map_err(|err| {
        error!("Recording {} has an unreadable insight payload: {err:?}", record.id);
        err
    })?;

    Ok(InsightReport::new(signed_url, insight))
}

/// Submission time as shown to users, e.g. `05/03/2024, 02:07:09 PM`.
pub fn format_submitted_at(submitted_at: &DateTimeWithTimeZone, tz: Tz) -> String {
    submitted_at.with_timezone(&tz).format(DISPLAY_FORMAT).to_string()
}

use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use domain::case_recording::{self, AudioFile};
use log::*;

use crate::error::WebErrorKind;
use crate::page::{self, RecordingRow};
use crate::{AppState, Error};

const CASE_ID_FIELD: &str = "case-id";
const AUDIO_FIELD: &str = "audio";

/// POST /upload
///
/// Takes a multipart form with a `case-id` text field and an `audio` file field. The
/// response is always the upload page; failures carry a generic message and the
/// error's status.
pub(crate) async fn upload(State(app_state): State<AppState>, multipart: Multipart) -> Response {
    let max_upload_bytes = app_state.config().max_upload_bytes;
    let (case_id, file) = match read_form(multipart, max_upload_bytes).await {
        Ok(form) => form,
        Err(err) => return failed(err),
    };

    debug!(
        "Received {} ({} bytes) for case {case_id}",
        file.file_name,
        file.data.len()
    );

    match case_recording::upload(
        app_state.db_conn_ref(),
        app_state.blob_store(),
        &case_id,
        file,
    )
    .await
    {
        Ok(record) => {
            let row = RecordingRow::new(&record, app_state.config().display_timezone);
            Html(page::upload_page(page::UPLOAD_SUCCEEDED, &[row])).into_response()
        }
        Err(err) => failed(err.into()),
    }
}

/// Client errors keep their status. Every server side failure, storage outages
/// included, is reported as a plain 500.
fn failed(err: Error) -> Response {
    let status = match err.status_code() {
        status if status.is_server_error() => {
            error!("Upload failed: {err:?}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        status => {
            warn!("Upload rejected with {status}: {err:?}");
            status
        }
    };
    (status, Html(page::upload_page(page::UPLOAD_FAILED, &[]))).into_response()
}

async fn read_form(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> Result<(String, AudioFile), Error> {
    let mut case_id = None;
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(from_multipart)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(CASE_ID_FIELD) => {
                case_id = Some(field.text().await.map_err(from_multipart)?);
            }
            Some(AUDIO_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(from_multipart)?;
                if data.len() > max_upload_bytes {
                    warn!(
                        "Audio file of {} bytes exceeds the {max_upload_bytes} byte limit",
                        data.len()
                    );
                    return Err(Error::Web(WebErrorKind::PayloadTooLarge));
                }
                file = Some(AudioFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            other => debug!("Ignoring unexpected upload field {other:?}"),
        }
    }

    let Some(file) = file else {
        warn!("Upload without an audio file");
        return Err(Error::Web(WebErrorKind::Input));
    };

    // A missing case id is handled like a blank one.
    Ok((case_id.unwrap_or_default(), file))
}

fn from_multipart(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::Web(WebErrorKind::PayloadTooLarge)
    } else {
        debug!("Unreadable upload form: {}", err.body_text());
        Error::Web(WebErrorKind::Input)
    }
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use crate::test_support::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use domain::case_recordings::Model;
    use domain::gateway::blob_store::MemoryBlobStore;
    use domain::object_uri::ObjectUri;
    use domain::recording_status::RecordingStatus;
    use sea_orm::MockExecResult;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "X-CALL-INSIGHTS-BOUNDARY";

    fn multipart_body(case_id: Option<&str>, audio: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(case_id) = case_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"case-id\"\r\n\r\n{case_id}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(audio) = audio {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"call.mp3\"\r\nContent-Type: audio/mpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(audio);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri("/upload")
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn created_record() -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: domain::Id::parse_str("0b7c0f4e-3d35-4c59-9f0c-2a0b6c1e9d11").unwrap(),
            case_id: "CASE-1".to_string(),
            submitted_at: now,
            status: RecordingStatus::Processing,
            object_uri: None,
            insight_payload: None,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn upload_requires_a_session() {
        let store = Arc::new(MemoryBlobStore::default());
        let app = app(empty_db(), store.clone());

        let response = app
            .oneshot(upload_request(None, multipart_body(Some("CASE-1"), Some(b"ID3"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn upload_stores_audio_in_project_bucket() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let store = Arc::new(MemoryBlobStore::default());
        let db = signed_in_db()
            .append_query_results([[stored_site_config()]])
            .append_query_results([[created_record()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let app = app_with_config(db, store.clone(), config().set_google_base_url(&server.url()));
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(upload_request(
                Some(&cookie),
                multipart_body(Some("CASE-1"), Some(b"ID3")),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("File uploaded successfully."));

        assert_eq!(store.len(), 1);
        let start = html.find("gs://").unwrap();
        let end = start + html[start..].find('<').unwrap();
        let uri: ObjectUri = html[start..end].parse().unwrap();
        assert_eq!(uri.bucket(), "acme-operation-insights-audio-files");
        let (content_type, data) = store.get(uri.bucket(), uri.path()).unwrap();
        assert_eq!(content_type, "audio/mpeg");
        assert_eq!(&data[..], b"ID3");
    }

    #[tokio::test]
    async fn failed_storage_shows_generic_failure() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let store = Arc::new(MemoryBlobStore::failing());
        let db = signed_in_db()
            .append_query_results([[stored_site_config()]])
            .append_query_results([[created_record()]]);
        let app = app_with_config(db, store.clone(), config().set_google_base_url(&server.url()));
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(upload_request(
                Some(&cookie),
                multipart_body(Some("CASE-1"), Some(b"ID3")),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let html = body_text(response).await;
        assert!(html.contains("Upload failed."));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn upload_without_case_id_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let store = Arc::new(MemoryBlobStore::default());
        let app = app_with_config(
            signed_in_db(),
            store.clone(),
            config().set_google_base_url(&server.url()),
        );
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(upload_request(Some(&cookie), multipart_body(None, Some(b"ID3"))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn upload_without_audio_is_a_bad_request() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let app = app_with_config(
            signed_in_db(),
            Arc::new(MemoryBlobStore::default()),
            config().set_google_base_url(&server.url()),
        );
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(upload_request(Some(&cookie), multipart_body(Some("CASE-1"), None)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    fn limited_config(
        server: &mockito::ServerGuard,
        max_upload_bytes: &str,
    ) -> service::config::Config {
        service::config::Config::try_from_args([
            "call_insights",
            "--max-upload-bytes",
            max_upload_bytes,
        ])
        .unwrap()
        .set_google_base_url(&server.url())
    }

    #[tokio::test]
    async fn audio_at_the_size_limit_is_accepted() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let store = Arc::new(MemoryBlobStore::default());
        let db = signed_in_db()
            .append_query_results([[stored_site_config()]])
            .append_query_results([[created_record()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let app = app_with_config(db, store.clone(), limited_config(&server, "1024"));
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(upload_request(
                Some(&cookie),
                multipart_body(Some("CASE-1"), Some(&[7u8; 1024])),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn audio_one_byte_over_the_limit_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let store = Arc::new(MemoryBlobStore::default());
        let app = app_with_config(
            signed_in_db(),
            store.clone(),
            limited_config(&server, "1024"),
        );
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(upload_request(
                Some(&cookie),
                multipart_body(Some("CASE-1"), Some(&[7u8; 1025])),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let store = Arc::new(MemoryBlobStore::default());
        let app = app_with_config(
            signed_in_db(),
            store.clone(),
            limited_config(&server, "1024"),
        );
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(upload_request(
                Some(&cookie),
                multipart_body(Some("CASE-1"), Some(&[0u8; 128 * 1024])),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(store.is_empty());
    }
}

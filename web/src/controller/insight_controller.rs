use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use domain::case_recording;
use domain::insight::InsightReport;

use crate::{AppState, Error};

/// GET the AI insights for a recording, with a fresh signed URL for its audio.
///
/// Every call signs a new URL. Nothing is written.
#[utoipa::path(
    get,
    path = "/api/insights/{record_id}",
    params(
        ("record_id" = String, Path, description = "Id of the case recording"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved the insights for a recording", body = InsightReport),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Recording not found"),
        (status = 409, description = "The recording's audio has not been stored yet"),
        (status = 422, description = "The stored object address is malformed"),
        (status = 500, description = "The stored insight document is unreadable"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn read(
    State(app_state): State<AppState>,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let ttl = Duration::from_secs(app_state.config().signed_url_ttl_secs);
    let report = case_recording::insights(
        app_state.db_conn_ref(),
        app_state.blob_store(),
        &record_id,
        ttl,
    )
    .await?;

    Ok(Json(report))
}

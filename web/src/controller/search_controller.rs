use axum::extract::{Query, State};
use axum::response::Html;
use domain::case_recording;
use log::*;

use crate::page::{self, RecordingRow};
use crate::params::search::SearchParams;
use crate::{AppState, Error};

/// GET /search?case-id=
///
/// Lists the recordings filed under exactly the given case id, newest first.
pub(crate) async fn search(
    State(app_state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Html<String>, Error> {
    let case_id = params.case_id();
    let records = case_recording::find_by_case_id(app_state.db_conn_ref(), case_id).await?;
    debug!("Found {} recordings for case {case_id}", records.len());

    let tz = app_state.config().display_timezone;
    let rows: Vec<RecordingRow> = records
        .iter()
        .map(|record| RecordingRow::new(record, tz))
        .collect();

    Ok(Html(page::upload_page("", &rows)))
}

use axum::http::header;
use axum::response::{Html, IntoResponse};

use crate::page;

/// GET /success
///
/// Landing page after sign-in: the upload form with an empty search.
pub(crate) async fn success() -> Html<String> {
    Html(page::upload_page("", &[]))
}

/// GET /static/audio-player.js
pub(crate) async fn audio_player_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/javascript; charset=utf-8")],
        page::AUDIO_PLAYER_JS,
    )
}

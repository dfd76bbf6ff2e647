use crate::{
    controller::{
        auth_controller, config_controller, health_check_controller, insight_controller,
        page_controller, search_controller, upload_controller,
    },
    middleware::auth::{require_auth, require_login},
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Call Insights API"
        ),
        paths(
            health_check_controller::health_check,
            insight_controller::read,
        ),
        components(
            schemas(
                domain::insight::InsightReport,
                domain::insight::ActionItem,
                domain::insight::TranscriptEntry,
            )
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "call_insights", description = "Call recording upload and insights API")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines our cookie session based authentication requirement for gaining access to our
// API endpoints for OpenAPI.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "id",
                    "Session id value returned via Set-Cookie header after Google sign-in",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(sign_in_routes(app_state.clone()))
        .merge(page_routes(app_state.clone()))
        .merge(upload_routes(app_state.clone()))
        .merge(config_routes(app_state.clone()))
        .merge(insight_routes(app_state))
        .merge(health_routes())
        .merge(static_routes())
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

/// Public routes for Google sign-in. Browsers reach these through redirects.
fn sign_in_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(auth_controller::login_page))
        .route("/auth/google", get(auth_controller::authorize))
        .route("/auth/google/callback", get(auth_controller::callback))
        .route("/failure", get(auth_controller::failure))
        .route("/logout", get(auth_controller::logout))
        .with_state(app_state)
}

/// Dashboard pages. Visitors without a session are sent back to the login page.
fn page_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/success", get(page_controller::success))
        .route("/search", get(search_controller::search))
        .route("/site-settings", get(config_controller::read))
        .route_layer(from_fn(require_login))
        .with_state(app_state)
}

/// Room for the multipart boundaries, part headers and the case id around the audio.
const UPLOAD_FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// The audio file itself is measured against `max_upload_bytes` in the controller.
fn upload_routes(app_state: AppState) -> Router {
    let body_limit = app_state
        .config()
        .max_upload_bytes
        .saturating_add(UPLOAD_FORM_OVERHEAD_BYTES);
    Router::new()
        .route("/upload", post(upload_controller::upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn config_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/config", post(config_controller::update))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn insight_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/api/insights/:record_id", get(insight_controller::read))
        .route_layer(from_fn(require_auth))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn static_routes() -> Router {
    Router::new().route(
        "/static/audio-player.js",
        get(page_controller::audio_player_js),
    )
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use crate::test_support::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use domain::gateway::blob_store::MemoryBlobStore;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn get(uri: &str) -> axum::response::Response {
        app(empty_db(), Arc::new(MemoryBlobStore::default()))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_check_is_public() {
        let response = get("/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "healthy");
    }

    #[tokio::test]
    async fn login_page_links_to_google_sign_in() {
        let response = get("/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"href="/auth/google""#));
    }

    #[tokio::test]
    async fn openapi_document_lists_insights_endpoint() {
        let response = get("/api-docs/openapi.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response)
            .await
            .contains("/api/insights/{record_id}"));
    }

    #[tokio::test]
    async fn audio_player_script_is_served() {
        let response = get("/static/audio-player.js").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("/api/insights/"));
    }
}

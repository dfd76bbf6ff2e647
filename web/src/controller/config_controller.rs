use axum::extract::State;
use axum::response::Html;
use axum::Form;
use domain::site_config::{self, UPDATED_MESSAGE};
use log::*;

use crate::page;
use crate::params::site_config::ConfigForm;
use crate::{AppState, Error};

/// GET /site-settings
///
/// Shows the saved settings, or the placeholders with a notice when nothing is saved yet.
pub(crate) async fn read(State(app_state): State<AppState>) -> Result<Html<String>, Error> {
    let current = site_config::find_or_placeholder(app_state.db_conn_ref()).await?;
    Ok(Html(page::settings_page(current.message(), &current.config)))
}

/// POST /config
pub(crate) async fn update(
    State(app_state): State<AppState>,
    Form(form): Form<ConfigForm>,
) -> Result<Html<String>, Error> {
    debug!("Saving site configuration for project: {}", form.project_id);
    let saved = site_config::replace(app_state.db_conn_ref(), form.into()).await?;
    Ok(Html(page::settings_page(Some(UPDATED_MESSAGE), &saved)))
}

#[cfg(test)]
#[cfg(feature = "mock")]
mod tests {
    use crate::test_support::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use domain::gateway::blob_store::MemoryBlobStore;
    use domain::site_configs::Model;
    use std::sync::Arc;
    use tower::ServiceExt;

    const FORM: &str = "clientId=client-456&clientSecret=new-secret\
        &callbackUrl=https%3A%2F%2Finsights.example.com%2Fauth%2Fgoogle%2Fcallback\
        &allowedDomains=example.com%2C+example.org&projectId=acme-prod\
        &promptSummary=Summarise&promptActionItems=List";

    fn config_request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri("/config")
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(FORM)).unwrap()
    }

    #[tokio::test]
    async fn update_requires_a_session() {
        let app = app(empty_db(), Arc::new(MemoryBlobStore::default()));

        let response = app.oneshot(config_request(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Unauthorized");
    }

    #[tokio::test]
    async fn update_saves_and_confirms() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let saved = Model {
            client_id: "client-456".to_string(),
            allowed_domains: vec!["example.com".to_string(), "example.org".to_string()],
            project_id: "acme-prod".to_string(),
            ..stored_site_config()
        };
        let db = signed_in_db().append_query_results([[saved]]);
        let app = app_with_config(
            db,
            Arc::new(MemoryBlobStore::default()),
            config().set_google_base_url(&server.url()),
        );
        let cookie = sign_in(&app).await;

        let response = app.oneshot(config_request(Some(&cookie))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Config updated successfully."));
        assert!(html.contains(r#"value="example.com, example.org""#));
    }

    #[tokio::test]
    async fn settings_page_redirects_without_session() {
        let app = app(empty_db(), Arc::new(MemoryBlobStore::default()));

        let response = app
            .oneshot(Request::builder().uri("/site-settings").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }

    #[tokio::test]
    async fn settings_page_shows_placeholder_notice_when_unsaved() {
        let mut server = mockito::Server::new_async().await;
        mock_google(&mut server, "agent@example.com").await;

        let db = signed_in_db().append_query_results([Vec::<Model>::new()]);
        let app = app_with_config(
            db,
            Arc::new(MemoryBlobStore::default()),
            config().set_google_base_url(&server.url()),
        );
        let cookie = sign_in(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/site-settings")
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response)
            .await
            .contains("No config found. Please create one."));
    }
}

use axum::http::{header, HeaderValue};
use axum_login::{
    tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer},
    AuthManagerLayerBuilder,
};
use domain::gateway::blob_store::BlobStore;
use domain::identity::Backend;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use service::DB_SCHEMA;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_sessions_sqlx_store::PostgresStore;

mod controller;
mod error;
pub(crate) mod middleware;
mod page;
mod params;
mod router;

pub use error::{Error, Result};

/// Everything a request handler needs: the database pool, process settings and the
/// object store that holds uploaded audio.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    blob_store: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(app_config: Config, db: &Arc<DatabaseConnection>, blob_store: Arc<dyn BlobStore>) -> Self {
        Self {
            service_state: service::AppState::new(app_config, db),
            blob_store,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }

    pub fn blob_store(&self) -> &dyn BlobStore {
        self.blob_store.as_ref()
    }
}

pub async fn init_server(app_state: AppState) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let config = app_state.config().clone();

    info!("Connecting to Postgres backed session store");
    let session_store = PostgresStore::new(
        app_state
            .db_conn_ref()
            .get_postgres_connection_pool()
            .clone(),
    )
    .with_schema_name(DB_SCHEMA)?;
    session_store.migrate().await?;

    // Session layer
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.backend_session_expiry_seconds as i64,
        )));

    // Auth service
    let backend = Backend::new(&app_state.service_state.database_connection, &config)?;
    let auth_layer = AuthManagerLayerBuilder::new(backend, session_layer).build();

    let server_url = format!(
        "{}:{}",
        config.interface.as_deref().unwrap_or("0.0.0.0"),
        config.port
    );
    let listener = TcpListener::bind(&server_url).await?;

    let router = router::define_routes(app_state)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(auth_layer);

    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}

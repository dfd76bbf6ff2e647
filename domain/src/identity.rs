//! Sign-in for dashboard users.
//!
//! Users authenticate with their Google account. The OAuth client is whatever the
//! site configuration holds at the moment of sign-in, and only accounts whose email
//! domain is on the configured allow-list get a session. Sessions identify users by
//! email; nothing about them is stored beyond the session itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum_login::{AuthUser, AuthnBackend, UserId};
use cloud_auth::http::{ClientBuilder, HttpClient};
use cloud_auth::oauth::providers::google;
use cloud_auth::oauth::Provider as _;
use log::*;
use sea_orm::DatabaseConnection;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use service::config::Config;

use crate::error::Error;
use crate::site_config::{self, SiteConfig};

const OAUTH_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
}

impl AuthUser for User {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.email.clone()
    }

    fn session_auth_hash(&self) -> &[u8] {
        self.email.as_bytes()
    }
}

/// Authorization code returned to the OAuth callback.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub code: String,
}

#[derive(Clone)]
pub struct Backend {
    db: Arc<DatabaseConnection>,
    endpoints: google::Endpoints,
    http_client: HttpClient,
}

impl Backend {
    pub fn new(db: &Arc<DatabaseConnection>, config: &Config) -> Result<Self, Error> {
        let http_client = ClientBuilder::new()
            .with_timeout(Duration::from_secs(OAUTH_TIMEOUT_SECS))
            .with_max_retries(1)
            .build()?;

        Ok(Self {
            // Arc is cloned, but the source DatabaseConnection refers to the same instance
            // as the one passed in to new() (see the Arc documentation for more info)
            db: Arc::clone(db),
            endpoints: google::Endpoints {
                auth_url: config.google_auth_url().to_string(),
                token_url: config.google_token_url().to_string(),
                userinfo_url: config.google_userinfo_url().to_string(),
            },
            http_client,
        })
    }

    fn provider(&self, config: &SiteConfig) -> google::Provider {
        google::Provider::new(
            config.client_id.clone(),
            SecretString::new(config.client_secret.clone()),
            config.callback_url.clone(),
            self.endpoints.clone(),
            self.http_client.clone(),
        )
    }

    /// Google authorization URL for the current site configuration, carrying `state`.
    pub async fn authorization_url(&self, state: &str) -> Result<String, Error> {
        let current = site_config::find_or_placeholder(self.db.as_ref()).await?;
        if current.is_placeholder {
            warn!("Starting sign-in with placeholder OAuth settings");
        }
        Ok(self.provider(&current.config).authorization_url(state)?.url)
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthnBackend for Backend {
    type User = User;
    type Credentials = Credentials;
    type Error = Error;

    async fn authenticate(
        &self,
        creds: Self::Credentials,
    ) -> Result<Option<Self::User>, Self::Error> {
        let current = site_config::find_or_placeholder(self.db.as_ref()).await?;
        let provider = self.provider(&current.config);

        let tokens = provider.exchange_code(&creds.code).await?;
        let info = provider
            .get_user_info(tokens.access_token.expose_secret())
            .await?;

        if info.email_verified == Some(false) {
            warn!("Rejected sign-in for unverified email: {}", info.email);
            return Ok(None);
        }

        if !current.config.allows_email(&info.email) {
            warn!("Rejected sign-in from a domain that is not allowed: {}", info.email);
            return Ok(None);
        }

        info!("User signed in: {}", info.email);
        Ok(Some(User { email: info.email }))
    }

    async fn get_user(&self, user_id: &UserId<Self>) -> Result<Option<Self::User>, Self::Error> {
        Ok(Some(User {
            email: user_id.clone(),
        }))
    }
}

pub type AuthSession = axum_login::AuthSession<Backend>;

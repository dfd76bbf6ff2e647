//! Google OAuth provider implementation.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::http::HttpClient;
use crate::oauth::{AuthorizationRequest, ProviderKind, Tokens, UserInfo};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const SCOPES: &str = "openid email profile";

/// Google OAuth endpoint URLs. Overridable so tests can target a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            userinfo_url: DEFAULT_USERINFO_URL.to_string(),
        }
    }
}

/// OAuth token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    scope: String,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Request to exchange authorization code for tokens
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

/// User info from Google
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    #[serde(alias = "sub")]
    id: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default, alias = "verified_email")]
    email_verified: Option<bool>,
}

/// Google OAuth provider.
///
/// Runs the authorization-code flow for Google accounts with the
/// `openid email profile` scopes.
pub struct Provider {
    client_id: String,
    client_secret: SecretString,
    redirect_uri: String,
    endpoints: Endpoints,
    http_client: HttpClient,
}

impl Provider {
    /// Create a new Google OAuth provider.
    ///
    /// # Arguments
    ///
    /// * `client_id` - Google OAuth client ID
    /// * `client_secret` - Google OAuth client secret
    /// * `redirect_uri` - OAuth redirect URI registered for the client
    pub fn new(
        client_id: String,
        client_secret: SecretString,
        redirect_uri: String,
        endpoints: Endpoints,
        http_client: HttpClient,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_uri,
            endpoints,
            http_client,
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn authorization_url(&self, state: &str) -> Result<AuthorizationRequest, Error> {
        let url = Url::parse_with_params(
            &self.endpoints.auth_url,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("access_type", "online"),
                ("prompt", "select_account"),
                ("state", state),
            ],
        )
        .map_err(|e| oauth_error(OAuthErrorKind::InvalidConfiguration, &e.to_string()))?;

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state: state.to_string(),
        })
    }

    async fn exchange_code(&self, code: &str) -> Result<Tokens, Error> {
        let request = TokenExchangeRequest {
            code,
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            redirect_uri: &self.redirect_uri,
            grant_type: "authorization_code",
        };

        debug!("Exchanging Google OAuth code for tokens");

        let response = self
            .http_client
            .post(&self.endpoints.token_url)
            .form(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google token endpoint returned {status}: {error_text}");
            return Err(oauth_error(OAuthErrorKind::TokenExchangeFailed, &error_text));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Google token response: {:?}", e);
            oauth_error(OAuthErrorKind::InvalidResponse, &e.to_string())
        })?;

        debug!("Successfully exchanged Google OAuth code for tokens");

        Ok(Tokens {
            access_token: SecretString::new(tokens.access_token),
            id_token: tokens.id_token.map(SecretString::new),
            expires_at: tokens
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            token_type: tokens.token_type,
            scopes: tokens.scope.split_whitespace().map(String::from).collect(),
        })
    }

    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error> {
        let response = self
            .http_client
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Google userinfo endpoint returned {status}");
            return Err(oauth_error(
                OAuthErrorKind::InvalidResponse,
                &format!("userinfo request failed with {status}"),
            ));
        }

        let info: GoogleUserInfo = response.json().await.map_err(|e| {
            warn!("Failed to parse Google user info: {:?}", e);
            oauth_error(OAuthErrorKind::InvalidResponse, &e.to_string())
        })?;

        Ok(UserInfo {
            id: info.id,
            email: info.email,
            name: info.name,
            picture: info.picture,
            email_verified: info.email_verified,
        })
    }
}

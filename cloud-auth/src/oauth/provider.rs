//! OAuth provider trait and types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::tokens::Tokens;
use crate::error::Error;

/// Known OAuth identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Google,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
        }
    }
}

/// Authorization request with the URL to redirect the browser to.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// CSRF state parameter, to be checked on the callback.
    pub state: String,
}

/// User information retrieved from an OAuth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    /// Provider's unique user identifier.
    pub id: String,
    /// User's email address.
    pub email: String,
    /// User's display name.
    pub name: Option<String>,
    /// User's profile picture URL.
    pub picture: Option<String>,
    /// Whether the provider has verified the email address.
    pub email_verified: Option<bool>,
}

/// Trait for OAuth 2.0 providers.
///
/// Implementations handle:
/// - Authorization URL generation
/// - Authorization code exchange for tokens
/// - User info retrieval
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn provider(&self) -> ProviderKind;

    /// Build the authorization URL carrying `state`.
    fn authorization_url(&self, state: &str) -> Result<AuthorizationRequest, Error>;

    /// Exchange an authorization code from the OAuth callback for tokens.
    async fn exchange_code(&self, code: &str) -> Result<Tokens, Error>;

    /// Get user information using an access token.
    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error>;
}

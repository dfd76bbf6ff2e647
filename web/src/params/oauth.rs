use serde::Deserialize;

/// Query parameters Google sends back to the callback.
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthCallback {
    pub(crate) code: Option<String>,
    pub(crate) state: Option<String>,
    /// Set instead of `code` when the user denied consent.
    pub(crate) error: Option<String>,
}

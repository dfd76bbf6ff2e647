//! Google sign-in.
//!
//! These endpoints are reached through browser redirects, so failures become redirects
//! to the failure page rather than error statuses.

use axum::extract::Query;
use axum::response::{Html, IntoResponse, Redirect};
use axum_login::tower_sessions::Session;
use cloud_auth::oauth::{generate_state, state_matches};
use domain::identity::{AuthSession, Backend, Credentials};
use log::*;

use crate::error::WebErrorKind;
use crate::page;
use crate::params::oauth::OAuthCallback;
use crate::Error;

/// Session key holding the CSRF state of the sign-in in progress.
const OAUTH_STATE_KEY: &str = "oauth.state";

/// GET /
pub(crate) async fn login_page() -> Html<&'static str> {
    Html(page::LOGIN_PAGE)
}

/// GET /auth/google
///
/// Stores a fresh state in the session and redirects to Google's consent screen.
pub(crate) async fn authorize(
    auth_session: AuthSession,
    session: Session,
) -> Result<impl IntoResponse, Error> {
    let state = generate_state();
    session
        .insert(OAUTH_STATE_KEY, &state)
        .await
        .map_err(|err| {
            error!("Failed to store sign-in state in session: {err:?}");
            Error::Web(WebErrorKind::Other)
        })?;

    let url = auth_session.backend.authorization_url(&state).await?;
    debug!("Redirecting to Google for sign-in");
    Ok(Redirect::to(&url))
}

/// GET /auth/google/callback
pub(crate) async fn callback(
    mut auth_session: AuthSession,
    session: Session,
    Query(params): Query<OAuthCallback>,
) -> Redirect {
    match complete_sign_in(&mut auth_session, &session, params).await {
        Ok(()) => Redirect::to("/success"),
        Err(err) => {
            warn!("Sign-in failed: {err:?}");
            Redirect::to("/failure")
        }
    }
}

async fn complete_sign_in(
    auth_session: &mut AuthSession,
    session: &Session,
    params: OAuthCallback,
) -> Result<(), Error> {
    // The state is single use, remove it before anything else can fail.
    let expected: Option<String> = session
        .remove(OAUTH_STATE_KEY)
        .await
        .map_err(|err| {
            error!("Failed to read sign-in state from session: {err:?}");
            Error::Web(WebErrorKind::Other)
        })?;

    if let Some(error) = params.error {
        info!("Google returned an error to the callback: {error}");
        return Err(Error::Web(WebErrorKind::Auth));
    }

    let (Some(expected), Some(received)) = (expected, params.state) else {
        warn!("Sign-in callback without a pending state");
        return Err(Error::Web(WebErrorKind::Auth));
    };
    if !state_matches(&expected, &received) {
        warn!("Sign-in callback state does not match the session");
        return Err(Error::Web(WebErrorKind::Auth));
    }

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        return Err(Error::Web(WebErrorKind::Input));
    };

    let user = match auth_session.authenticate(Credentials { code }).await {
        Ok(Some(user)) => user,
        Ok(None) => return Err(Error::Web(WebErrorKind::Auth)),
        Err(err) => return Err(from_auth_error(err)),
    };

    auth_session.login(&user).await.map_err(from_auth_error)?;

    Ok(())
}

fn from_auth_error(err: axum_login::Error<Backend>) -> Error {
    match err {
        axum_login::Error::Backend(err) => Error::from(err),
        axum_login::Error::Session(err) => {
            error!("Session store failure during sign-in: {err:?}");
            Error::Web(WebErrorKind::Other)
        }
    }
}

/// GET /logout
pub(crate) async fn logout(mut auth_session: AuthSession) -> Redirect {
    match auth_session.logout().await {
        Ok(Some(user)) => info!("User signed out: {}", user.email),
        Ok(None) => debug!("Sign out without a session"),
        Err(err) => warn!("Failed to end session: {err:?}"),
    }
    Redirect::to("/")
}

/// GET /failure
pub(crate) async fn failure() -> Html<&'static str> {
    Html(page::LOGIN_FAILED)
}

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use domain::identity::AuthSession;
use log::*;

/// Gate for API and form endpoints: answers 401 Unauthorized when there is no
/// signed-in user, before the handler runs.
pub async fn require_auth(auth_session: AuthSession, request: Request, next: Next) -> Response {
    match auth_session.user {
        Some(_user) => next.run(request).await,
        None => {
            debug!("Rejected unauthenticated {} {}", request.method(), request.uri().path());
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}

/// Gate for pages: sends visitors without a session back to the login page.
pub async fn require_login(auth_session: AuthSession, request: Request, next: Next) -> Response {
    match auth_session.user {
        Some(_user) => next.run(request).await,
        None => Redirect::to("/").into_response(),
    }
}

use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{
    DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind,
};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Errors raised by the web layer itself, before a request reaches the domain.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// A required form field or query parameter is missing or unreadable.
    Input,
    Auth,
    PayloadTooLarge,
    Other,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Domain(err) => domain_status(&err.error_kind),
            Error::Web(kind) => match kind {
                WebErrorKind::Input => StatusCode::BAD_REQUEST,
                WebErrorKind::Auth => StatusCode::UNAUTHORIZED,
                WebErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
                WebErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

fn domain_status(kind: &DomainErrorKind) -> StatusCode {
    match kind {
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                EntityErrorKind::NotFound => StatusCode::NOT_FOUND,
                EntityErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
                EntityErrorKind::MissingObject => StatusCode::CONFLICT,
                EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Network | ExternalErrorKind::Other(_) => StatusCode::BAD_GATEWAY,
        },
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match status {
            StatusCode::NOT_FOUND => "NOT FOUND",
            StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE ENTITY",
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::CONFLICT => "NOT YET AVAILABLE",
            StatusCode::BAD_GATEWAY => "BAD GATEWAY",
            StatusCode::BAD_REQUEST => "BAD REQUEST",
            StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD TOO LARGE",
            _ => "INTERNAL SERVER ERROR",
        };

        if status.is_server_error() {
            error!("{status}: {self:?}");
        } else {
            debug!("{status}: {self:?}");
        }

        (status, body).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}

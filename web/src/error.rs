use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// Every failure becomes a plain text body; callers of the authorization
// endpoints are people in a browser.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let detail = self.0.detail().unwrap_or_default();
        match &self.0.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Config) => {
                error!("Configuration error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("OAuth provider not configured: {detail}"),
                )
                    .into_response()
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(message)) => {
                error!("Internal error: {message}: {detail}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
            DomainErrorKind::External(ExternalErrorKind::AuthorizationDenied) => {
                warn!("Authorization denied: {detail}");
                (
                    StatusCode::BAD_REQUEST,
                    format!("Authorization was not granted: {detail}"),
                )
                    .into_response()
            }
            DomainErrorKind::External(ExternalErrorKind::Upstream) => {
                let body = match self.0.provider_rejection() {
                    Some(rejection) => format!(
                        "Token exchange failed: provider responded with status {}\n{}",
                        rejection.status, rejection.body
                    ),
                    None => "Token exchange failed: provider returned an invalid response".to_string(),
                };
                warn!("{body}");
                (StatusCode::BAD_GATEWAY, body).into_response()
            }
            DomainErrorKind::External(ExternalErrorKind::Network) => {
                warn!("Upstream unreachable: {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    "Token exchange failed: provider could not be reached",
                )
                    .into_response()
            }
            DomainErrorKind::External(ExternalErrorKind::Other(message)) => {
                warn!("External error: {message}");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

//! Error types for the `oauth-client` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for oauth-client crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in oauth-client.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    Http(HttpErrorKind),
    Config(ConfigErrorKind),
}

/// Errors from OAuth operations.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// The provider redirected back with an `error` parameter instead of a code.
    AuthorizationDenied,
    TokenExchangeFailed,
    TokenRefreshFailed,
    /// The token endpoint answered 2xx but the body was not a usable token response.
    InvalidResponse,
    Network,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Timeout,
    Network,
}

/// Errors from missing or malformed configuration values.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    MissingValue,
    InvalidValue,
}

/// Non-success answer from a provider endpoint.
///
/// Kept as the `source` of token exchange errors so callers can report the
/// provider's status and error body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRejection {
    pub status: u16,
    pub body: String,
}

impl fmt::Display for ProviderRejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "provider responded with status {}: {}", self.status, self.body)
    }
}

impl StdError for ProviderRejection {}

impl Error {
    /// Returns the provider's rejection if this error, or any error it wraps, carries one.
    pub fn provider_rejection(&self) -> Option<&ProviderRejection> {
        let source = self.source.as_deref()?;
        if let Some(rejection) = source.downcast_ref::<ProviderRejection>() {
            return Some(rejection);
        }
        source
            .downcast_ref::<Error>()
            .and_then(|inner| inner.provider_rejection())
    }

    /// True for transport-level failures (connection refused, timeouts) which
    /// may succeed when attempted again.
    pub fn is_retryable(&self) -> bool {
        match &self.error_kind {
            ErrorKind::Http(HttpErrorKind::Network)
            | ErrorKind::Http(HttpErrorKind::Timeout)
            | ErrorKind::OAuth(OAuthErrorKind::Network) => true,
            _ => self
                .source
                .as_deref()
                .and_then(|source| source.downcast_ref::<Error>())
                .is_some_and(Error::is_retryable),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
            ErrorKind::Config(kind) => write!(f, "Configuration error: {:?}", kind)?,
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_timeout() {
            ErrorKind::Http(HttpErrorKind::Timeout)
        } else if err.is_connect() {
            ErrorKind::Http(HttpErrorKind::Network)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            reqwest_middleware::Error::Middleware(err) => Error {
                source: Some(err.into()),
                error_kind: ErrorKind::Http(HttpErrorKind::Network),
            },
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create configuration errors naming the offending setting.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Wraps a lower-level error under a new OAuth error kind, keeping it as the source.
pub fn wrap_oauth_error(kind: OAuthErrorKind, err: Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::OAuth(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_rejection_is_found_through_wrapping() {
        let inner = Error {
            source: Some(Box::new(ProviderRejection {
                status: 400,
                body: "{\"error\":\"invalid_grant\"}".to_string(),
            })),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed),
        };
        let outer = wrap_oauth_error(OAuthErrorKind::TokenRefreshFailed, inner);

        let rejection = outer.provider_rejection().expect("rejection should be reachable");
        assert_eq!(rejection.status, 400);
        assert!(rejection.body.contains("invalid_grant"));
    }

    #[test]
    fn test_network_errors_are_retryable() {
        let err = oauth_error(OAuthErrorKind::Network, "connection refused");
        assert!(err.is_retryable());

        let wrapped = wrap_oauth_error(OAuthErrorKind::TokenRefreshFailed, err);
        assert!(wrapped.is_retryable());
    }

    #[test]
    fn test_protocol_errors_are_not_retryable() {
        let err = oauth_error(OAuthErrorKind::InvalidResponse, "not json");
        assert!(!err.is_retryable());
        assert!(err.provider_rejection().is_none());
    }

    #[test]
    fn test_display_includes_source_message() {
        let err = config_error(ConfigErrorKind::MissingValue, "GoogleClientID is not set");
        assert_eq!(
            err.to_string(),
            "Configuration error: MissingValue (GoogleClientID is not set)"
        );
    }
}

//! Error types for the `domain` layer.
use oauth_client::error::{
    Error as OAuthClientError, ErrorKind as OAuthClientErrorKind, HttpErrorKind, OAuthErrorKind,
    ProviderRejection,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field holds the original error. `web` depends on
/// `domain` but not on `oauth-client` error kinds directly; it maps the kinds below
/// to HTTP status codes.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// A required configuration value is missing or malformed.
    Config,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// The remote service could not be reached or timed out.
    Network,
    /// The remote service answered, but with an error or an unusable body.
    Upstream,
    /// The OAuth provider reported that the user did not grant access.
    AuthorizationDenied,
    Other(String),
}

impl Error {
    /// The provider's non-success answer, if one caused this error.
    pub fn provider_rejection(&self) -> Option<&ProviderRejection> {
        self.source
            .as_deref()?
            .downcast_ref::<OAuthClientError>()?
            .provider_rejection()
    }

    /// Message from the error that caused this one, for user-facing output.
    pub fn detail(&self) -> Option<String> {
        let source = self.source.as_deref()?;
        match source.downcast_ref::<OAuthClientError>() {
            Some(err) => err.source.as_ref().map(|inner| inner.to_string()),
            None => Some(source.to_string()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {:?}", self.error_kind)?;
        if let Some(source) = &self.source {
            write!(f, " caused by {source}")?;
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

// This is where we translate errors from the `oauth-client` layer to the `domain` layer.
impl From<OAuthClientError> for Error {
    fn from(err: OAuthClientError) -> Self {
        let error_kind = match &err.error_kind {
            OAuthClientErrorKind::Config(_) => DomainErrorKind::Internal(InternalErrorKind::Config),
            OAuthClientErrorKind::Http(HttpErrorKind::BuilderFailed) => DomainErrorKind::Internal(
                InternalErrorKind::Other("Failed to build HTTP client".to_string()),
            ),
            OAuthClientErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            OAuthClientErrorKind::OAuth(OAuthErrorKind::AuthorizationDenied) => {
                DomainErrorKind::External(ExternalErrorKind::AuthorizationDenied)
            }
            OAuthClientErrorKind::OAuth(_) if err.is_retryable() => {
                DomainErrorKind::External(ExternalErrorKind::Network)
            }
            OAuthClientErrorKind::OAuth(_) => DomainErrorKind::External(ExternalErrorKind::Upstream),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oauth_client::error::{config_error as oauth_config_error, oauth_error, ConfigErrorKind};

    #[test]
    fn test_config_errors_are_internal() {
        let err: Error = oauth_config_error(ConfigErrorKind::MissingValue, "GoogleClientID").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
        assert_eq!(err.detail().as_deref(), Some("GoogleClientID"));
    }

    #[test]
    fn test_provider_rejection_is_upstream() {
        let rejected = OAuthClientError {
            source: Some(Box::new(ProviderRejection {
                status: 401,
                body: "invalid_client".to_string(),
            })),
            error_kind: OAuthClientErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed),
        };

        let err: Error = rejected.into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Upstream)
        );
        assert_eq!(err.provider_rejection().unwrap().status, 401);
    }

    #[test]
    fn test_network_failures_are_network() {
        let err: Error = oauth_error(OAuthErrorKind::Network, "connection reset").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Network)
        );
    }

    #[test]
    fn test_denied_authorization_keeps_its_kind() {
        let err: Error = oauth_error(OAuthErrorKind::AuthorizationDenied, "error=access_denied").into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::AuthorizationDenied)
        );
        assert_eq!(err.detail().as_deref(), Some("error=access_denied"));
    }
}

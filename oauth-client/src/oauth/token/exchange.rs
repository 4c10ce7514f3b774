//! Form-encoded grant requests against a provider's token endpoint.

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::TokenResponse;
use crate::error::{Error, ErrorKind, OAuthErrorKind, ProviderRejection};
use crate::http::HttpClient;
use crate::oauth::ClientCredentials;

/// Grant request sent to the token endpoint.
#[derive(Debug, Clone)]
pub enum TokenExchangeRequest {
    /// Exchange an authorization code received on the redirect URI.
    AuthorizationCode { code: String, redirect_uri: String },
    /// Mint a new access token from a stored refresh token.
    RefreshToken { refresh_token: SecretString },
}

impl TokenExchangeRequest {
    pub fn grant_type(&self) -> &'static str {
        match self {
            TokenExchangeRequest::AuthorizationCode { .. } => "authorization_code",
            TokenExchangeRequest::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Key/value pairs of the form-encoded request body.
    pub fn form_parameters(&self, credentials: &ClientCredentials) -> Vec<(&'static str, String)> {
        let mut params = match self {
            TokenExchangeRequest::AuthorizationCode { code, redirect_uri } => vec![
                ("code", code.clone()),
                ("client_id", credentials.client_id().to_string()),
                (
                    "client_secret",
                    credentials.client_secret().expose_secret().clone(),
                ),
                ("redirect_uri", redirect_uri.clone()),
            ],
            TokenExchangeRequest::RefreshToken { refresh_token } => vec![
                ("refresh_token", refresh_token.expose_secret().clone()),
                ("client_id", credentials.client_id().to_string()),
                (
                    "client_secret",
                    credentials.client_secret().expose_secret().clone(),
                ),
            ],
        };
        params.push(("grant_type", self.grant_type().to_string()));
        params
    }
}

/// A provider token endpoint reached through the shared HTTP client.
#[derive(Clone)]
pub struct TokenEndpoint {
    http_client: HttpClient,
    url: String,
}

impl TokenEndpoint {
    pub fn new(http_client: HttpClient, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// POST `params` form-encoded and parse the JSON answer.
    ///
    /// A non-2xx status fails with `TokenExchangeFailed` carrying the provider's
    /// [`ProviderRejection`]; a body that is not a JSON object fails with
    /// `InvalidResponse`. Transport failures keep their `Http` kind so callers
    /// can tell them apart with [`Error::is_retryable`].
    pub async fn exchange(&self, params: &[(&'static str, String)]) -> Result<TokenResponse, Error> {
        debug!("Sending token request to {}", self.url);

        let response = self
            .http_client
            .post(&self.url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach token endpoint {}: {:?}", self.url, e);
                Error::from(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read token endpoint response body: {:?}", e);
            Error::from(e)
        })?;

        if !status.is_success() {
            warn!(
                "Token endpoint {} rejected request with status {}",
                self.url, status
            );
            return Err(Error {
                source: Some(Box::new(ProviderRejection {
                    status: status.as_u16(),
                    body,
                })),
                error_kind: ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed),
            });
        }

        serde_json::from_str::<TokenResponse>(&body).map_err(|e| {
            warn!("Token endpoint returned an unparsable body: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })
    }
}

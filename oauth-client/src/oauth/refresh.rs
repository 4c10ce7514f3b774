//! Minting access tokens from a stored refresh token.

use chrono::Utc;
use secrecy::SecretString;
use tracing::{debug, info, warn};

use super::providers::ProviderConfig;
use super::token::{AccessToken, TokenEndpoint, TokenExchangeRequest};
use super::ClientCredentials;
use crate::error::{wrap_oauth_error, Error, OAuthErrorKind};
use crate::http::HttpClient;

/// Exchanges a long-lived refresh token for new access tokens.
///
/// There is no caching: each call performs one token endpoint round-trip. The
/// stored refresh token is never rotated or returned.
pub struct TokenRefreshService {
    provider: ProviderConfig,
    credentials: ClientCredentials,
    refresh_token: SecretString,
    token_endpoint: TokenEndpoint,
}

impl TokenRefreshService {
    pub fn new(
        provider: ProviderConfig,
        credentials: ClientCredentials,
        refresh_token: SecretString,
        http_client: HttpClient,
    ) -> Self {
        let token_endpoint = TokenEndpoint::new(http_client, provider.token_endpoint.clone());
        Self {
            provider,
            credentials,
            refresh_token,
            token_endpoint,
        }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Obtain a new access token.
    ///
    /// Any failure (transport, provider rejection, unparsable body, or a
    /// response without `access_token`) is reported as `TokenRefreshFailed`
    /// wrapping the underlying error.
    pub async fn refresh(&self) -> Result<AccessToken, Error> {
        info!("Refreshing {} access token", self.provider.kind);

        let request = TokenExchangeRequest::RefreshToken {
            refresh_token: self.refresh_token.clone(),
        };
        let issued_at = Utc::now();

        let result = self
            .token_endpoint
            .exchange(&request.form_parameters(&self.credentials))
            .await
            .and_then(|response| {
                debug!("Refresh response: {}", response.redacted_summary());
                response.into_access_token(issued_at)
            });

        match result {
            Ok(token) => {
                info!(
                    "Refreshed {} access token, expires at {:?}",
                    self.provider.kind, token.expires_at
                );
                Ok(token)
            }
            Err(err) => {
                warn!("Failed to refresh {} access token: {}", self.provider.kind, err);
                Err(wrap_oauth_error(OAuthErrorKind::TokenRefreshFailed, err))
            }
        }
    }
}

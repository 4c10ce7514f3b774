//! Authorization code flow: consent redirect and code exchange.

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

use super::providers::ProviderConfig;
use super::token::{TokenEndpoint, TokenExchangeRequest, TokenResponse};
use super::ClientCredentials;
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::http::HttpClient;

/// Parameters of an inbound authorization request or provider callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationRequest {
    /// Authorization code issued by the provider.
    pub code: Option<String>,
    /// Scope reported back by the provider; informational only.
    pub scope: Option<String>,
    /// Redirect URI to register with the provider. Defaults to the request's own URL.
    #[serde(alias = "redirect_url")]
    pub redirect: Option<String>,
    /// Set by the provider when the user denied consent or the request was invalid.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl AuthorizationRequest {
    pub fn code(&self) -> Option<&str> {
        non_empty(&self.code)
    }

    /// The redirect URI for this request: the `redirect` parameter when given,
    /// otherwise `request_url` without its query string or fragment.
    pub fn resolve_redirect(&self, request_url: &str) -> String {
        if let Some(redirect) = non_empty(&self.redirect) {
            return redirect.to_string();
        }

        match Url::parse(request_url) {
            Ok(mut url) => {
                url.set_query(None);
                url.set_fragment(None);
                url.to_string()
            }
            Err(_) => request_url
                .split(|c| c == '?' || c == '#')
                .next()
                .unwrap_or(request_url)
                .to_string(),
        }
    }
}

/// Result of handling an authorization request.
#[derive(Debug)]
pub enum AuthorizationOutcome {
    /// No code yet: send the caller to the provider's consent screen.
    Redirect { location: String },
    /// A code was exchanged for tokens.
    Exchanged(TokenSummary),
}

/// What a successful code exchange produced, for display to the operator who
/// completed the consent screen.
#[derive(Debug)]
pub struct TokenSummary {
    pub code: String,
    pub scope: Option<String>,
    pub tokens: TokenResponse,
}

impl TokenSummary {
    /// Plain text body listing the code, scope and tokens.
    ///
    /// This deliberately exposes the tokens so the refresh token can be copied
    /// into configuration. Never pass it to a logger; use
    /// [`TokenResponse::redacted_summary`] instead.
    pub fn to_plain_text(&self) -> String {
        const NOT_PRESENT: &str = "(not present)";

        format!(
            "Code: {}\nScope: {}\nAccess Token: {}\nRefresh Token: {}\nExpires In: {}",
            self.code,
            self.scope.as_deref().unwrap_or(NOT_PRESENT),
            self.tokens
                .access_token
                .as_ref()
                .map(|t| t.expose_secret().as_str())
                .unwrap_or(NOT_PRESENT),
            self.tokens
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().as_str())
                .unwrap_or(NOT_PRESENT),
            self.tokens
                .expires_in
                .map(|secs| secs.to_string())
                .unwrap_or_else(|| NOT_PRESENT.to_string()),
        )
    }
}

/// Handles the authorization code grant for one provider.
pub struct AuthorizationHandler {
    provider: ProviderConfig,
    credentials: ClientCredentials,
    token_endpoint: TokenEndpoint,
}

impl AuthorizationHandler {
    pub fn new(
        provider: ProviderConfig,
        credentials: ClientCredentials,
        http_client: HttpClient,
    ) -> Self {
        let token_endpoint = TokenEndpoint::new(http_client, provider.token_endpoint.clone());
        Self {
            provider,
            credentials,
            token_endpoint,
        }
    }

    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Consent screen URL requesting offline access with the provider's default scope.
    pub fn authorization_url(&self, redirect_uri: &str) -> String {
        format!(
            "{}?\
            client_id={}&\
            redirect_uri={}&\
            access_type=offline&\
            scope={}&\
            response_type=code",
            self.provider.authorization_endpoint,
            urlencoding::encode(self.credentials.client_id()),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.provider.default_scope),
        )
    }

    /// Redirect to the consent screen when `request` has no code, otherwise
    /// exchange the code for tokens.
    ///
    /// # Arguments
    ///
    /// * `request` - Query parameters of the inbound request
    /// * `request_url` - URL the request arrived on, used when no redirect is given
    pub async fn handle(
        &self,
        request: &AuthorizationRequest,
        request_url: &str,
    ) -> Result<AuthorizationOutcome, Error> {
        if let Some(error) = non_empty(&request.error) {
            warn!(
                "{} authorization was not granted: {}",
                self.provider.kind, error
            );
            let message = match non_empty(&request.error_description) {
                Some(description) => format!("error={error} error_description={description}"),
                None => format!("error={error}"),
            };
            return Err(oauth_error(OAuthErrorKind::AuthorizationDenied, &message));
        }

        let redirect_uri = request.resolve_redirect(request_url);
        info!("{} redirect URI: {}", self.provider.kind, redirect_uri);

        let Some(code) = request.code() else {
            let location = self.authorization_url(&redirect_uri);
            info!("Redirecting to {} consent screen", self.provider.kind);
            return Ok(AuthorizationOutcome::Redirect { location });
        };

        let exchange = TokenExchangeRequest::AuthorizationCode {
            code: code.to_string(),
            redirect_uri,
        };
        let tokens = self
            .token_endpoint
            .exchange(&exchange.form_parameters(&self.credentials))
            .await?;
        info!(
            "Exchanged {} authorization code: {}",
            self.provider.kind,
            tokens.redacted_summary()
        );

        Ok(AuthorizationOutcome::Exchanged(TokenSummary {
            code: code.to_string(),
            scope: request.scope.clone(),
            tokens,
        }))
    }
}

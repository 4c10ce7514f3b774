//! Builds OAuth handlers and the refresh service from process configuration.
//!
//! Validation happens here, once, when the components are constructed at
//! startup. A missing setting disables only the component that needs it.

use crate::error::Error;
use log::*;
use oauth_client::oauth::providers::{google, microsoft, ProviderConfig};
use oauth_client::oauth::ProviderKind;
use secrecy::ExposeSecret;
use service::config::Config;

pub use oauth_client::http::{HttpClient, HttpClientBuilder};
pub use oauth_client::oauth::providers;
pub use oauth_client::oauth::token::AccessToken;
pub use oauth_client::oauth::{
    AuthorizationHandler, AuthorizationOutcome, AuthorizationRequest, ClientCredentials,
    TokenRefreshService, TokenSummary,
};

/// Configuration keys naming each provider's client credentials.
fn credential_keys(kind: ProviderKind) -> (&'static str, &'static str) {
    match kind {
        ProviderKind::Google => ("GoogleClientID", "GoogleClientSecret"),
        ProviderKind::MicrosoftGraph => ("MS_GRAPH_CLIENT_ID", "MS_GRAPH_CLIENT_SECRET"),
    }
}

fn provider_config(config: &Config, kind: ProviderKind) -> ProviderConfig {
    match kind {
        ProviderKind::Google => google::config(config.google_default_scope()),
        ProviderKind::MicrosoftGraph => microsoft::config(config.ms_graph_default_scope()),
    }
}

fn client_credentials(config: &Config, kind: ProviderKind) -> Result<ClientCredentials, Error> {
    let (id_key, secret_key) = credential_keys(kind);
    let (client_id, client_secret) = match kind {
        ProviderKind::Google => (config.google_client_id(), config.google_client_secret()),
        ProviderKind::MicrosoftGraph => {
            (config.ms_graph_client_id(), config.ms_graph_client_secret())
        }
    };

    Ok(ClientCredentials::from_optional(
        client_id,
        client_secret,
        id_key,
        secret_key,
    )?)
}

/// HTTP client for token endpoint calls: bounded timeout, retried on transient failures.
pub fn token_http_client(config: &Config) -> Result<HttpClient, Error> {
    Ok(HttpClientBuilder::new()
        .with_timeout(config.token_exchange_timeout())
        .with_max_retries(config.token_exchange_max_retries)
        .build()?)
}

/// Build the authorization handler for `kind` from validated configuration.
pub fn authorization_handler(
    config: &Config,
    kind: ProviderKind,
    http_client: HttpClient,
) -> Result<AuthorizationHandler, Error> {
    let credentials = client_credentials(config, kind)?;
    let provider = provider_config(config, kind);
    info!(
        "{} authorization enabled with default scope \"{}\"",
        kind, provider.default_scope
    );

    Ok(AuthorizationHandler::new(provider, credentials, http_client))
}

/// Configuration key holding each provider's stored refresh token.
fn refresh_token_key(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::Google => "GmailRefreshToken",
        ProviderKind::MicrosoftGraph => "MS_GRAPH_REFRESH_TOKEN",
    }
}

/// Build the refresh service for `kind` from its client credentials and the
/// refresh token stored in configuration (`GmailRefreshToken` or
/// `MS_GRAPH_REFRESH_TOKEN`).
pub fn refresh_service(
    config: &Config,
    kind: ProviderKind,
    http_client: HttpClient,
) -> Result<TokenRefreshService, Error> {
    let credentials = client_credentials(config, kind)?;
    let refresh_token = match kind {
        ProviderKind::Google => config.gmail_refresh_token(),
        ProviderKind::MicrosoftGraph => config.ms_graph_refresh_token(),
    }
    .filter(|token| !token.expose_secret().trim().is_empty())
    .ok_or_else(|| {
        crate::error::config_error(&format!(
            "{} not found in configuration",
            refresh_token_key(kind)
        ))
    })?;
    info!("{} token refresh enabled", kind);

    Ok(TokenRefreshService::new(
        provider_config(config, kind),
        credentials,
        refresh_token,
        http_client,
    ))
}

/// Obtain a fresh access token. Performs one token endpoint round-trip per call.
pub async fn refresh_access_token(service: &TokenRefreshService) -> Result<AccessToken, Error> {
    service.refresh().await.map_err(|err| {
        warn!(
            "Access token refresh for {} failed: {}",
            service.provider().kind,
            err
        );
        Error::from(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, ExternalErrorKind, InternalErrorKind};
    use clap::Parser;

    /// Settings read from the environment are pinned to blank unless given, so
    /// exported credentials on the test machine do not leak in.
    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["leo"];
        for flag in [
            "--google-client-id",
            "--google-client-secret",
            "--gmail-refresh-token",
            "--ms-graph-client-id",
            "--ms-graph-client-secret",
            "--ms-graph-refresh-token",
        ] {
            if !args.contains(&flag) {
                argv.extend_from_slice(&[flag, ""]);
            }
        }
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    fn http_client() -> HttpClient {
        HttpClientBuilder::new().build().unwrap()
    }

    #[test]
    fn test_authorization_handler_requires_client_secret() {
        let config = config(&["--google-client-id", "client"]);

        let err = authorization_handler(&config, ProviderKind::Google, http_client())
            .err()
            .unwrap();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
        assert!(err.detail().unwrap().contains("GoogleClientSecret"));
    }

    #[test]
    fn test_authorization_handler_uses_configured_scope() {
        let config = config(&[
            "--ms-graph-client-id",
            "ms-client",
            "--ms-graph-client-secret",
            "ms-secret",
            "--ms-graph-default-scope",
            "offline_access User.Read",
        ]);

        let handler =
            authorization_handler(&config, ProviderKind::MicrosoftGraph, http_client()).unwrap();
        assert_eq!(handler.provider().kind, ProviderKind::MicrosoftGraph);
        assert_eq!(handler.provider().default_scope, "offline_access User.Read");
    }

    #[test]
    fn test_refresh_service_requires_refresh_token() {
        let config = config(&[
            "--google-client-id",
            "client",
            "--google-client-secret",
            "secret",
        ]);

        let err = refresh_service(&config, ProviderKind::Google, http_client())
            .err()
            .unwrap();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
        assert!(err.detail().unwrap().contains("GmailRefreshToken"));
    }

    #[test]
    fn test_ms_graph_refresh_service_uses_its_own_refresh_token() {
        let config = config(&[
            "--ms-graph-client-id",
            "ms-client",
            "--ms-graph-client-secret",
            "ms-secret",
            "--gmail-refresh-token",
            "1//gmail",
        ]);

        let err = refresh_service(&config, ProviderKind::MicrosoftGraph, http_client())
            .err()
            .unwrap();
        assert!(err.detail().unwrap().contains("MS_GRAPH_REFRESH_TOKEN"));

        let config = self::config(&[
            "--ms-graph-client-id",
            "ms-client",
            "--ms-graph-client-secret",
            "ms-secret",
            "--ms-graph-refresh-token",
            "M.C5_refresh",
        ]);
        let service =
            refresh_service(&config, ProviderKind::MicrosoftGraph, http_client()).unwrap();
        assert_eq!(service.provider().kind, ProviderKind::MicrosoftGraph);
        assert_eq!(
            service.provider().token_endpoint,
            providers::microsoft::TOKEN_ENDPOINT
        );
    }

    #[tokio::test]
    async fn test_refresh_access_token_surfaces_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let config = config(&[
            "--google-client-id",
            "client",
            "--google-client-secret",
            "secret",
            "--gmail-refresh-token",
            "1//refresh",
        ]);
        let mut provider = provider_config(&config, ProviderKind::Google);
        provider.token_endpoint = format!("{}/token", server.url());
        let service = TokenRefreshService::new(
            provider,
            client_credentials(&config, ProviderKind::Google).unwrap(),
            config.gmail_refresh_token().unwrap(),
            http_client(),
        );

        let err = refresh_access_token(&service).await.unwrap_err();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Upstream)
        );
        assert_eq!(err.provider_rejection().unwrap().status, 401);
    }
}

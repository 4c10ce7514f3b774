//! Controller for OAuth authorization code flows.
//!
//! Each provider has one endpoint serving both legs of the flow: without a
//! `code` it redirects to the consent screen, and the provider redirects back
//! to the same endpoint with the code.

use crate::{AppState, Error};

use axum::extract::{OriginalUri, Query, State};
use axum::http::header::{HOST, LOCATION};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::{IntoResponse, Response};

use domain::oauth::{self as OAuthApi, AuthorizationOutcome, AuthorizationRequest};
use domain::ProviderKind;
use log::*;
use service::config::Config;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// The URL this request arrived on, without its query string.
///
/// `PUBLIC_BASE_URL` wins over the request's own scheme and host so the
/// redirect URI matches the one registered with the provider behind a proxy.
fn request_url(config: &Config, headers: &HeaderMap, uri: &Uri) -> String {
    let path = uri.path();
    if let Some(base_url) = config.public_base_url() {
        return format!("{base_url}{path}");
    }

    let scheme = headers
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.scheme_str())
        .unwrap_or("http");
    let host = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or("localhost");

    format!("{scheme}://{host}{path}")
}

async fn authorize(
    kind: ProviderKind,
    app_state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    params: &AuthorizationRequest,
) -> Result<Response, Error> {
    debug!("{kind} authorization request processing.");

    let handler = app_state.authorization_handler(kind)?;
    let request_url = request_url(&app_state.config, headers, uri);

    let outcome = handler.handle(params, &request_url).await.map_err(|e| {
        warn!("{kind} authorization failed: {e}");
        domain::error::Error::from(e)
    })?;

    Ok(match outcome {
        AuthorizationOutcome::Redirect { location } => {
            (StatusCode::FOUND, [(LOCATION, location)]).into_response()
        }
        AuthorizationOutcome::Exchanged(summary) => {
            (StatusCode::OK, summary.to_plain_text()).into_response()
        }
    })
}

/// GET|POST /oauth/google
///
/// Redirects to Google's consent screen, or exchanges the returned code for tokens.
#[utoipa::path(
    get,
    path = "/oauth/google",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from Google"),
        ("scope" = Option<String>, Query, description = "Scope reported by Google, echoed in the summary"),
        ("redirect" = Option<String>, Query, description = "Redirect URI; defaults to this endpoint's URL"),
        ("error" = Option<String>, Query, description = "Error reported by Google instead of a code"),
    ),
    responses(
        (status = 302, description = "Redirect to Google's consent screen"),
        (status = 200, description = "Code exchanged; plain text token summary", body = String),
        (status = 400, description = "Google reported an authorization error"),
        (status = 500, description = "Google OAuth is not configured"),
        (status = 502, description = "Token exchange failed"),
    )
)]
pub async fn authorize_google(
    State(app_state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<AuthorizationRequest>,
) -> Result<Response, Error> {
    authorize(ProviderKind::Google, &app_state, &headers, &uri, &params).await
}

/// GET|POST /oauth/microsoft
///
/// Redirects to the Microsoft identity platform consent screen, or exchanges
/// the returned code for Microsoft Graph tokens.
#[utoipa::path(
    get,
    path = "/oauth/microsoft",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from Microsoft"),
        ("scope" = Option<String>, Query, description = "Scope reported back, echoed in the summary"),
        ("redirect" = Option<String>, Query, description = "Redirect URI; defaults to this endpoint's URL"),
        ("error" = Option<String>, Query, description = "Error reported instead of a code"),
    ),
    responses(
        (status = 302, description = "Redirect to Microsoft's consent screen"),
        (status = 200, description = "Code exchanged; plain text token summary", body = String),
        (status = 400, description = "Microsoft reported an authorization error"),
        (status = 500, description = "Microsoft Graph OAuth is not configured"),
        (status = 502, description = "Token exchange failed"),
    )
)]
pub async fn authorize_microsoft(
    State(app_state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    Query(params): Query<AuthorizationRequest>,
) -> Result<Response, Error> {
    authorize(
        ProviderKind::MicrosoftGraph,
        &app_state,
        &headers,
        &uri,
        &params,
    )
    .await
}

async fn refresh(kind: ProviderKind, app_state: &AppState) -> Result<impl IntoResponse, Error> {
    let service = app_state.refresh_service(kind)?;
    let access_token = OAuthApi::refresh_access_token(service).await?;

    let expiry = access_token
        .expires_at
        .map(|expires_at| expires_at.to_rfc3339())
        .unwrap_or_else(|| "(not reported)".to_string());
    Ok((
        StatusCode::OK,
        format!("Access token refreshed. Expires at: {expiry}"),
    ))
}

/// POST /oauth/google/refresh
///
/// Mints an access token from `GmailRefreshToken` to confirm the stored
/// refresh token still works. Only the expiry is returned.
#[utoipa::path(
    post,
    path = "/oauth/google/refresh",
    responses(
        (status = 200, description = "Access token refreshed", body = String),
        (status = 500, description = "Gmail token refresh is not configured"),
        (status = 502, description = "Refresh failed"),
    )
)]
pub async fn refresh_gmail(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    refresh(ProviderKind::Google, &app_state).await
}

/// POST /oauth/microsoft/refresh
///
/// Same as the Gmail refresh, using `MS_GRAPH_REFRESH_TOKEN`.
#[utoipa::path(
    post,
    path = "/oauth/microsoft/refresh",
    responses(
        (status = 200, description = "Access token refreshed", body = String),
        (status = 500, description = "Microsoft Graph token refresh is not configured"),
        (status = 502, description = "Refresh failed"),
    )
)]
pub async fn refresh_microsoft(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, Error> {
    refresh(ProviderKind::MicrosoftGraph, &app_state).await
}

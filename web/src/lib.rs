//! HTTP surface of the Leo automation service.

use std::sync::Arc;

use domain::device_shutoff::{DeviceDirectory, DeviceShutoffDispatcher};
use domain::error::{config_error, Error as DomainError};
use domain::oauth::{self as OAuthApi, AuthorizationHandler, TokenRefreshService};
use domain::ProviderKind;
use log::*;
use service::config::Config;
use tokio::net::TcpListener;

mod controller;
mod error;
pub mod router;
#[cfg(test)]
mod test_support;

pub use error::{Error, Result};

/// Components shared by every request. Built once at startup; read-only afterwards.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub google_authorization: Option<Arc<AuthorizationHandler>>,
    pub ms_graph_authorization: Option<Arc<AuthorizationHandler>>,
    pub gmail_refresh: Option<Arc<TokenRefreshService>>,
    pub ms_graph_refresh: Option<Arc<TokenRefreshService>>,
    pub device_dispatcher: Arc<DeviceShutoffDispatcher>,
}

impl AppState {
    /// Build every component the configuration allows.
    ///
    /// OAuth components with missing credentials are left out with a warning;
    /// their routes answer with a configuration error instead.
    pub fn new(config: Config, device_directory: DeviceDirectory) -> core::result::Result<Self, DomainError> {
        let http_client = OAuthApi::token_http_client(&config)?;

        let google_authorization =
            OAuthApi::authorization_handler(&config, ProviderKind::Google, http_client.clone())
                .inspect_err(|e| warn!("Google authorization disabled: {e}"))
                .ok()
                .map(Arc::new);
        let ms_graph_authorization = OAuthApi::authorization_handler(
            &config,
            ProviderKind::MicrosoftGraph,
            http_client.clone(),
        )
        .inspect_err(|e| warn!("Microsoft Graph authorization disabled: {e}"))
        .ok()
        .map(Arc::new);
        let gmail_refresh =
            OAuthApi::refresh_service(&config, ProviderKind::Google, http_client.clone())
                .inspect_err(|e| warn!("Gmail token refresh disabled: {e}"))
                .ok()
                .map(Arc::new);
        let ms_graph_refresh =
            OAuthApi::refresh_service(&config, ProviderKind::MicrosoftGraph, http_client)
                .inspect_err(|e| warn!("Microsoft Graph token refresh disabled: {e}"))
                .ok()
                .map(Arc::new);

        let device_dispatcher = Arc::new(DeviceShutoffDispatcher::from_config(
            &config,
            device_directory,
        )?);

        Ok(Self {
            config,
            google_authorization,
            ms_graph_authorization,
            gmail_refresh,
            ms_graph_refresh,
            device_dispatcher,
        })
    }

    pub fn authorization_handler(
        &self,
        kind: ProviderKind,
    ) -> core::result::Result<&AuthorizationHandler, DomainError> {
        let handler = match kind {
            ProviderKind::Google => self.google_authorization.as_deref(),
            ProviderKind::MicrosoftGraph => self.ms_graph_authorization.as_deref(),
        };
        handler.ok_or_else(|| config_error(&format!("{kind} authorization is not configured")))
    }

    pub fn refresh_service(
        &self,
        kind: ProviderKind,
    ) -> core::result::Result<&TokenRefreshService, DomainError> {
        let service = match kind {
            ProviderKind::Google => self.gmail_refresh.as_deref(),
            ProviderKind::MicrosoftGraph => self.ms_graph_refresh.as_deref(),
        };
        service.ok_or_else(|| config_error(&format!("{kind} token refresh is not configured")))
    }
}

/// Bind the configured interface and port and serve until the process ends.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{}:{}", interface, app_state.config.port);

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    axum::serve(listener, router::define_routes(app_state)).await
}

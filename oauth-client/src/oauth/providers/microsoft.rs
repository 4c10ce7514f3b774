//! Microsoft identity platform endpoints used for Microsoft Graph.
//!
//! The application must be registered with the redirect URI listed under its
//! Web redirect URIs.

use super::ProviderConfig;
use crate::oauth::ProviderKind;

pub const AUTHORIZATION_ENDPOINT: &str =
    "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";
pub const TOKEN_ENDPOINT: &str = "https://login.microsoftonline.com/common/oauth2/v2.0/token";
pub const DEFAULT_SCOPE: &str = "offline_access Files.ReadWrite User.Read";

/// Microsoft Graph provider configuration requesting `default_scope` on the consent screen.
pub fn config(default_scope: &str) -> ProviderConfig {
    ProviderConfig {
        kind: ProviderKind::MicrosoftGraph,
        authorization_endpoint: AUTHORIZATION_ENDPOINT.to_string(),
        token_endpoint: TOKEN_ENDPOINT.to_string(),
        default_scope: default_scope.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_microsoft_config() {
        let config = config("User.Read");
        assert_eq!(config.kind, ProviderKind::MicrosoftGraph);
        assert!(config.token_endpoint.ends_with("/oauth2/v2.0/token"));
        assert_eq!(config.default_scope, "User.Read");
    }
}

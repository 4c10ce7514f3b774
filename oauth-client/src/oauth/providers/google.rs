//! Google OAuth endpoints.
//!
//! See <https://developers.google.com/identity/protocols/OAuth2WebServer>.

use super::ProviderConfig;
use crate::oauth::ProviderKind;

pub const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v4/token";
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Google provider configuration requesting `default_scope` on the consent screen.
pub fn config(default_scope: &str) -> ProviderConfig {
    ProviderConfig {
        kind: ProviderKind::Google,
        authorization_endpoint: AUTHORIZATION_ENDPOINT.to_string(),
        token_endpoint: TOKEN_ENDPOINT.to_string(),
        default_scope: default_scope.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_config() {
        let config = config(DEFAULT_SCOPE);
        assert_eq!(config.kind, ProviderKind::Google);
        assert_eq!(
            config.token_endpoint,
            "https://www.googleapis.com/oauth2/v4/token"
        );
        assert_eq!(
            config.authorization_endpoint,
            "https://accounts.google.com/o/oauth2/v2/auth"
        );
        assert_eq!(config.default_scope, DEFAULT_SCOPE);
    }
}

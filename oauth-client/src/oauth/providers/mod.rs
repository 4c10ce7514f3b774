//! Provider endpoint configurations.

pub mod google;
pub mod microsoft;

use super::ProviderKind;

/// Endpoints and defaults of one OAuth provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// Consent screen the user is redirected to.
    pub authorization_endpoint: String,
    /// Endpoint accepting form-encoded grant requests.
    pub token_endpoint: String,
    /// Scope requested on the consent screen.
    pub default_scope: String,
}

//! OAuth 2.0 authorization code grant with refresh tokens.
//!
//! One grant pairing only: `authorization_code` to obtain tokens, then
//! `refresh_token` to mint new access tokens.

mod authorization;
mod credentials;
mod provider;
mod refresh;

pub mod providers;
pub mod token;

pub use authorization::{
    AuthorizationHandler, AuthorizationOutcome, AuthorizationRequest, TokenSummary,
};
pub use credentials::ClientCredentials;
pub use provider::ProviderKind;
pub use refresh::TokenRefreshService;

//! Domain layer: turns validated configuration into the OAuth and device
//! components the web layer serves, and translates their errors.

pub use oauth_client::oauth::ProviderKind;

pub mod device_shutoff;
pub mod error;
pub mod oauth;

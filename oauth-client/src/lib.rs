//! # oauth-client
//!
//! OAuth 2.0 authorization code client for the Leo automation service:
//! - Consent screen redirects and authorization code exchange
//! - Access token refresh from a stored refresh token
//! - Provider configurations (Google, Microsoft Graph)
//! - HTTP client building with timeout and retry middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_client::{
//!     http::HttpClientBuilder,
//!     oauth::{providers::google, AuthorizationHandler, ClientCredentials},
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};

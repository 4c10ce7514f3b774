//! Token types and the token endpoint exchange.

mod exchange;
mod tokens;

pub use exchange::{TokenEndpoint, TokenExchangeRequest};
pub use tokens::{AccessToken, TokenResponse};

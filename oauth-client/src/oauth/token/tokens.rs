//! OAuth token types.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Token endpoint response.
///
/// Every field is optional: providers omit `refresh_token` on refresh grants and
/// a field missing from the response is kept as `None` instead of an empty value.
/// Token values are [`SecretString`]s, so `Debug` output is redacted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    /// Lifetime of the access token in seconds.
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    /// Scopes actually granted, space separated.
    pub scope: Option<String>,
}

impl TokenResponse {
    /// One-line description safe to write to logs.
    pub fn redacted_summary(&self) -> String {
        fn presence(value: &Option<SecretString>) -> &'static str {
            if value.is_some() {
                "[REDACTED]"
            } else {
                "absent"
            }
        }

        format!(
            "access_token={} refresh_token={} expires_in={} token_type={} scope={}",
            presence(&self.access_token),
            presence(&self.refresh_token),
            self.expires_in
                .map(|secs| secs.to_string())
                .unwrap_or_else(|| "absent".to_string()),
            self.token_type.as_deref().unwrap_or("absent"),
            self.scope.as_deref().unwrap_or("absent"),
        )
    }

    /// Extract the access token, failing if the provider did not send one.
    ///
    /// # Arguments
    ///
    /// * `issued_at` - When the response was received, used to compute the expiry
    pub fn into_access_token(self, issued_at: DateTime<Utc>) -> Result<AccessToken, Error> {
        let token = self.access_token.ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::InvalidResponse,
                "Token response did not contain an access_token",
            )
        })?;

        let expires_at = match self.expires_in {
            Some(secs) => Some(
                chrono::Duration::try_seconds(secs)
                    .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        oauth_error(
                            OAuthErrorKind::InvalidResponse,
                            &format!("expires_in out of range: {secs}"),
                        )
                    })?,
            ),
            None => None,
        };

        Ok(AccessToken { token, expires_at })
    }
}

/// Access token minted by a refresh grant.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer token for API requests.
    pub token: SecretString,
    /// When the access token expires, if the provider reported a lifetime.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| {
                let now = Utc::now();
                let buffer = chrono::Duration::minutes(5);
                expires <= (now + buffer)
            })
            .unwrap_or(false)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> Option<chrono::Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }
}

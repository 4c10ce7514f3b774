//! OAuth client credentials.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{config_error, ConfigErrorKind, Error};

/// Client id and secret issued by the provider when the application was registered.
///
/// The secret is held as a [`SecretString`], so `Debug` output never shows it.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: SecretString,
}

impl ClientCredentials {
    pub fn new(client_id: String, client_secret: SecretString) -> Self {
        Self {
            client_id,
            client_secret,
        }
    }

    /// Build credentials from optional configuration values.
    ///
    /// `id_key` and `secret_key` name the settings so a missing one can be reported.
    pub fn from_optional(
        client_id: Option<String>,
        client_secret: Option<SecretString>,
        id_key: &str,
        secret_key: &str,
    ) -> Result<Self, Error> {
        let client_id = client_id.filter(|id| !id.trim().is_empty()).ok_or_else(|| {
            config_error(
                ConfigErrorKind::MissingValue,
                &format!("{id_key} not found in configuration"),
            )
        })?;
        let client_secret = client_secret
            .filter(|secret| !secret.expose_secret().trim().is_empty())
            .ok_or_else(|| {
                config_error(
                    ConfigErrorKind::MissingValue,
                    &format!("{secret_key} not found in configuration"),
                )
            })?;

        Ok(Self::new(client_id, client_secret))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }
}

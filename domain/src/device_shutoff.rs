//! Turns off physical devices by calling a per-device shutoff URL.
//!
//! A message names a device; the URL to GET is configured under the key
//! `<device>Off` (for `{"device": "light"}` the key is `lightOff`). Missing
//! devices and unknown device names are logged and dropped.

use crate::error::Error;
use log::*;
use oauth_client::http::{HttpClient, HttpClientBuilder};
use serde::Deserialize;
use service::config::Config;
use std::collections::HashMap;

/// Suffix appended to a device name to form its configuration key.
pub const DEVICE_OFF_SUFFIX: &str = "Off";

/// Shutoff URLs by configuration key, collected once at startup.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    urls: HashMap<String, String>,
}

impl DeviceDirectory {
    /// Collect every `<device>Off` variable from the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Collect every `<device>Off` entry with a non-empty device name and value.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let urls = vars
            .into_iter()
            .filter(|(key, value)| {
                key.len() > DEVICE_OFF_SUFFIX.len()
                    && key.ends_with(DEVICE_OFF_SUFFIX)
                    && !value.trim().is_empty()
            })
            .collect();
        Self { urls }
    }

    /// The shutoff URL configured for `device`, if any.
    pub fn shutoff_url(&self, device: &str) -> Option<&str> {
        self.urls
            .get(&format!("{device}{DEVICE_OFF_SUFFIX}"))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Inbound message asking for a device to be turned off.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShutoffMessage {
    /// Name of the device to turn off.
    pub device: Option<String>,
    /// Name of the device that triggered the message; used in logs only.
    pub sender: Option<String>,
}

/// What happened to one message.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The shutoff URL answered with a success status.
    Dispatched { status: u16 },
    /// The message was not a JSON object of strings.
    InvalidPayload,
    /// The message had no `device` field.
    MissingDevice,
    /// No `<device>Off` URL is configured.
    UnknownDevice { device: String },
    /// Every attempt failed, by transport error or non-success status.
    Failed { device: String },
}

pub struct DeviceShutoffDispatcher {
    http_client: HttpClient,
    directory: DeviceDirectory,
}

impl DeviceShutoffDispatcher {
    pub fn new(http_client: HttpClient, directory: DeviceDirectory) -> Self {
        Self {
            http_client,
            directory,
        }
    }

    /// Build a dispatcher whose requests are retried up to
    /// `device_request_max_attempts` attempts in total.
    pub fn from_config(config: &Config, directory: DeviceDirectory) -> Result<Self, Error> {
        let http_client = HttpClientBuilder::new()
            .with_timeout(config.device_request_timeout())
            .with_max_attempts(config.device_request_max_attempts)
            .build()?;
        info!("Device shutoff enabled for {} device(s)", directory.len());

        Ok(Self::new(http_client, directory))
    }

    /// Parse a JSON message and turn off the device it names.
    pub async fn handle_message(&self, payload: &str) -> DispatchOutcome {
        info!("Turn off device message received: {}", payload);

        let message: ShutoffMessage = match serde_json::from_str(payload) {
            Ok(message) => message,
            Err(e) => {
                error!("Turn off device message is not valid JSON: {}", e);
                return DispatchOutcome::InvalidPayload;
            }
        };

        match message.device.as_deref().filter(|d| !d.is_empty()) {
            Some(device) => self.turn_off(device, message.sender.as_deref()).await,
            None => {
                error!("\"device\" parameter not found.");
                DispatchOutcome::MissingDevice
            }
        }
    }

    /// Send the shutoff request for `device`.
    pub async fn turn_off(&self, device: &str, sender: Option<&str>) -> DispatchOutcome {
        let Some(url) = self.directory.shutoff_url(device) else {
            error!("Trigger for turning off {} not found.", device);
            return DispatchOutcome::UnknownDevice {
                device: device.to_string(),
            };
        };

        info!(
            "Turning off {} (requested by {})",
            device,
            sender.unwrap_or("unknown sender")
        );

        match self.http_client.get(url).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Turned off {}: {}", device, response.status());
                DispatchOutcome::Dispatched {
                    status: response.status().as_u16(),
                }
            }
            Ok(response) => {
                error!(
                    "Shutoff request for {} failed with status {}",
                    device,
                    response.status()
                );
                DispatchOutcome::Failed {
                    device: device.to_string(),
                }
            }
            Err(e) => {
                error!("Shutoff request for {} failed: {:?}", device, e);
                DispatchOutcome::Failed {
                    device: device.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::time::Duration;

    fn dispatcher(vars: Vec<(&str, String)>) -> DeviceShutoffDispatcher {
        let http_client = HttpClientBuilder::new()
            .with_max_attempts(3)
            .with_base_delay(Duration::from_millis(1))
            .build()
            .unwrap();
        let directory =
            DeviceDirectory::from_vars(vars.into_iter().map(|(k, v)| (k.to_string(), v)));
        DeviceShutoffDispatcher::new(http_client, directory)
    }

    #[test]
    fn test_directory_collects_off_keys_only() {
        let directory = DeviceDirectory::from_vars(vec![
            ("lightOff".to_string(), "http://example/off".to_string()),
            ("Off".to_string(), "http://example/nameless".to_string()),
            ("fanOff".to_string(), "".to_string()),
            ("GoogleClientID".to_string(), "client".to_string()),
        ]);

        assert_eq!(directory.len(), 1);
        assert_eq!(directory.shutoff_url("light"), Some("http://example/off"));
        assert_eq!(directory.shutoff_url("fan"), None);
    }

    #[test]
    #[serial]
    fn test_directory_reads_process_environment() {
        let saved = env::var("porchLightOff").ok();
        env::set_var("porchLightOff", "http://example/porch/off");

        let directory = DeviceDirectory::from_env();

        match saved {
            Some(value) => env::set_var("porchLightOff", value),
            None => env::remove_var("porchLightOff"),
        }
        assert_eq!(
            directory.shutoff_url("porchLight"),
            Some("http://example/porch/off")
        );
    }

    #[tokio::test]
    async fn test_message_turns_off_configured_device() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/off")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let dispatcher = dispatcher(vec![("lightOff", format!("{}/off", server.url()))]);
        let outcome = dispatcher
            .handle_message(r#"{"device":"light","sender":"doorSensor"}"#)
            .await;

        assert_eq!(outcome, DispatchOutcome::Dispatched { status: 200 });
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_device_issues_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/off")
            .expect(0)
            .create_async()
            .await;

        let dispatcher = dispatcher(vec![("lightOff", format!("{}/off", server.url()))]);
        let outcome = dispatcher.handle_message(r#"{"sender":"doorSensor"}"#).await;

        assert_eq!(outcome, DispatchOutcome::MissingDevice);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unconfigured_device_issues_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/off")
            .expect(0)
            .create_async()
            .await;

        let dispatcher = dispatcher(vec![("lightOff", format!("{}/off", server.url()))]);
        let outcome = dispatcher.handle_message(r#"{"device":"heater"}"#).await;

        assert_eq!(
            outcome,
            DispatchOutcome::UnknownDevice {
                device: "heater".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failing_device_is_attempted_three_times() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/off")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let dispatcher = dispatcher(vec![("lightOff", format!("{}/off", server.url()))]);
        let outcome = dispatcher.turn_off("light", None).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                device: "light".to_string()
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let dispatcher = dispatcher(vec![]);
        assert_eq!(
            dispatcher.handle_message("not json").await,
            DispatchOutcome::InvalidPayload
        );
    }
}

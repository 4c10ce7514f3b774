use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use secrecy::SecretString;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Scope requested on the Google consent screen when `GOOGLE_DEFAULT_SCOPE` is not set.
pub const DEFAULT_GOOGLE_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// Scope requested on the Microsoft consent screen when `MS_GRAPH_DEFAULT_SCOPE` is not set.
pub const DEFAULT_MS_GRAPH_SCOPE: &str = "offline_access Files.ReadWrite User.Read";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The OAuth client ID of the Google Cloud project.
    #[arg(long, env = "GoogleClientID")]
    google_client_id: Option<String>,

    /// The OAuth client secret of the Google Cloud project.
    #[arg(long, env = "GoogleClientSecret", hide_env_values = true)]
    google_client_secret: Option<String>,

    /// The refresh token previously obtained through the Google authorization endpoint.
    #[arg(long, env = "GmailRefreshToken", hide_env_values = true)]
    gmail_refresh_token: Option<String>,

    /// Scope requested on the Google consent screen.
    #[arg(long, env = "GOOGLE_DEFAULT_SCOPE", default_value = DEFAULT_GOOGLE_SCOPE)]
    google_default_scope: String,

    /// The client ID of the Microsoft Graph app registration.
    #[arg(long, env = "MS_GRAPH_CLIENT_ID")]
    ms_graph_client_id: Option<String>,

    /// The client secret of the Microsoft Graph app registration.
    #[arg(long, env = "MS_GRAPH_CLIENT_SECRET", hide_env_values = true)]
    ms_graph_client_secret: Option<String>,

    /// The refresh token previously obtained through the Microsoft authorization endpoint.
    #[arg(long, env = "MS_GRAPH_REFRESH_TOKEN", hide_env_values = true)]
    ms_graph_refresh_token: Option<String>,

    /// Scope requested on the Microsoft consent screen.
    #[arg(long, env = "MS_GRAPH_DEFAULT_SCOPE", default_value = DEFAULT_MS_GRAPH_SCOPE)]
    ms_graph_default_scope: String,

    /// Externally visible base URL (e.g. https://leo.example.com). When unset the
    /// scheme and host of each authorization request are used to build the default
    /// redirect URI.
    #[arg(long, env)]
    public_base_url: Option<String>,

    /// Per-attempt timeout in seconds for requests to OAuth token endpoints.
    #[arg(long, env, default_value_t = 10)]
    pub token_exchange_timeout_secs: u64,

    /// Retries after a transient token endpoint failure.
    #[arg(long, env, default_value_t = 1)]
    pub token_exchange_max_retries: u32,

    /// Per-attempt timeout in seconds for device shutoff requests.
    #[arg(long, env, default_value_t = 10)]
    pub device_request_timeout_secs: u64,

    /// Total attempts, first request included, for a device shutoff request.
    #[arg(long, env, default_value_t = 3)]
    pub device_request_max_attempts: u32,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn google_client_id(&self) -> Option<String> {
        self.google_client_id.clone()
    }

    pub fn google_client_secret(&self) -> Option<SecretString> {
        self.google_client_secret.clone().map(SecretString::new)
    }

    pub fn gmail_refresh_token(&self) -> Option<SecretString> {
        self.gmail_refresh_token.clone().map(SecretString::new)
    }

    pub fn google_default_scope(&self) -> &str {
        &self.google_default_scope
    }

    pub fn ms_graph_client_id(&self) -> Option<String> {
        self.ms_graph_client_id.clone()
    }

    pub fn ms_graph_client_secret(&self) -> Option<SecretString> {
        self.ms_graph_client_secret.clone().map(SecretString::new)
    }

    pub fn ms_graph_refresh_token(&self) -> Option<SecretString> {
        self.ms_graph_refresh_token.clone().map(SecretString::new)
    }

    pub fn ms_graph_default_scope(&self) -> &str {
        &self.ms_graph_default_scope
    }

    /// Returns the public base URL without a trailing slash, if configured.
    pub fn public_base_url(&self) -> Option<&str> {
        self.public_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }

    pub fn token_exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.token_exchange_timeout_secs)
    }

    pub fn device_request_timeout(&self) -> Duration {
        Duration::from_secs(self.device_request_timeout_secs)
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["leo", "--google-client-id", "client"]).unwrap();

        assert_eq!(config.google_client_id(), Some("client".to_string()));
        assert_eq!(config.token_exchange_timeout(), Duration::from_secs(10));
        assert_eq!(config.device_request_max_attempts, 3);
        assert_eq!(config.port, 4000);
    }

    #[test]
    fn test_secrets_are_wrapped() {
        let config = Config::try_parse_from([
            "leo",
            "--google-client-secret",
            "very-secret",
            "--gmail-refresh-token",
            "1//refresh",
        ])
        .unwrap();

        let secret = config.google_client_secret().unwrap();
        assert!(!format!("{:?}", secret).contains("very-secret"));
        assert!(config.gmail_refresh_token().is_some());

        let config =
            Config::try_parse_from(["leo", "--ms-graph-refresh-token", "M.C5_refresh"]).unwrap();
        assert!(config.ms_graph_refresh_token().is_some());
    }

    #[test]
    fn test_public_base_url_is_trimmed() {
        let config =
            Config::try_parse_from(["leo", "--public-base-url", "https://leo.example/"]).unwrap();
        assert_eq!(config.public_base_url(), Some("https://leo.example"));
    }

    #[test]
    fn test_runtime_env_parsing() {
        assert_eq!("PRODUCTION".parse::<RustEnv>(), Ok(RustEnv::Production));
        assert_eq!("staging".parse::<RustEnv>(), Ok(RustEnv::Staging));
        assert_eq!("qa".parse::<RustEnv>(), Err(RustEnvParseError));
    }
}

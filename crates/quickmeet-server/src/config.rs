//! Server configuration.
//!
//! Every setting has a default and can be overridden from the environment:
//!
//! | variable                      | default                    |
//! |-------------------------------|----------------------------|
//! | `HOST`                        | `127.0.0.1`                |
//! | `PORT`                        | `5000`                     |
//! | `PUBLIC_URL`                  | `http://localhost:{PORT}`  |
//! | `QUICKMEET_CREDENTIALS_PATH`  | `credentials.json`         |
//! | `QUICKMEET_TOKEN_PATH`        | `token.json`               |
//! | `QUICKMEET_CALENDAR_ID`       | `primary`                  |
//! | `QUICKMEET_TIMEOUT_SECS`      | `30`                       |

use std::path::PathBuf;
use std::time::Duration;

use quickmeet_providers::google::{CALLBACK_PATH, GoogleConfig};

use crate::error::{ServerError, ServerResult};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default listening address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Externally reachable base URL, used to build the OAuth redirect URI.
    /// `None` means `http://localhost:{port}`.
    pub public_url: Option<String>,

    /// OAuth client-secret file.
    pub credentials_path: PathBuf,

    /// Persisted refresh-token file.
    pub token_path: PathBuf,

    /// Calendar receiving scheduled events.
    pub calendar_id: String,

    /// Timeout of vendor API calls.
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let google = GoogleConfig::default();
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            public_url: None,
            credentials_path: google.credentials_path,
            token_path: google.token_path,
            calendar_id: google.calendar_id,
            timeout: google.timeout,
        }
    }
}

impl ServerConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> ServerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, starting from the defaults.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ServerError::config(format!("invalid PORT: {port}")))?;
        }
        if let Some(url) = get("PUBLIC_URL") {
            config.public_url = Some(url);
        }
        if let Some(path) = get("QUICKMEET_CREDENTIALS_PATH") {
            config.credentials_path = PathBuf::from(path);
        }
        if let Some(path) = get("QUICKMEET_TOKEN_PATH") {
            config.token_path = PathBuf::from(path);
        }
        if let Some(id) = get("QUICKMEET_CALENDAR_ID") {
            config.calendar_id = id;
        }
        if let Some(secs) = get("QUICKMEET_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ServerError::config(format!("invalid QUICKMEET_TIMEOUT_SECS: {secs}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Builder: set the bind address.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Builder: set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder: set the public base URL.
    pub fn with_public_url(mut self, url: impl Into<String>) -> Self {
        self.public_url = Some(url.into());
        self
    }

    /// Builder: set the client-secret file.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Builder: set the token file.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Builder: set the calendar id.
    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    /// Builder: set the vendor call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host:port`, as passed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The public base URL without a trailing slash.
    pub fn public_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://localhost:{}", self.port),
        }
    }

    /// Where the vendor redirects after consent.
    pub fn redirect_uri(&self) -> String {
        format!("{}{}", self.public_url(), CALLBACK_PATH)
    }

    /// Provider configuration derived from these settings.
    pub fn to_google_config(&self) -> GoogleConfig {
        GoogleConfig::new()
            .with_credentials_path(&self.credentials_path)
            .with_token_path(&self.token_path)
            .with_calendar_id(&self.calendar_id)
            .with_timeout(self.timeout)
            .with_redirect_uri(self.redirect_uri())
    }
}

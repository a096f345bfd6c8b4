//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/quickmeet/config.toml` by default:
//!
//! ```toml
//! [server]
//! url = "http://localhost:5000"
//! timeout = 30
//!
//! [google]
//! credentials_path = "/home/me/.config/quickmeet/credentials.json"
//! token_path = "/home/me/.config/quickmeet/token.json"
//! calendar_id = "primary"
//! ```
//!
//! `QUICKMEET_CONFIG` or `--config` point at another file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use quickmeet_providers::google::GoogleConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Default server base URL.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

/// Configuration for the quickmeet client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Where the HTTP server lives.
    pub server: ServerSettings,

    /// Google paths, used by `auth` and `server`.
    pub google: GoogleSettings,
}

/// Server/connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the server.
    pub url: String,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            timeout: 30,
        }
    }
}

/// Google provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client-secret file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,

    /// Refresh-token file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    /// Calendar receiving scheduled events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<String>,
}

impl ClientConfig {
    /// Loads `path` if given, otherwise the default file.
    ///
    /// An explicit path must exist; a missing default file yields the
    /// defaults.
    pub fn resolve(path: Option<&Path>) -> ClientResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load(),
        }
    }

    /// Loads configuration from the default path.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| ClientError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Parses TOML content.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quickmeet")
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout)
    }

    /// Parsed server URL.
    pub fn server_url(&self) -> ClientResult<Url> {
        let url = Url::parse(&self.server.url).map_err(|e| {
            ClientError::Config(format!("invalid server url '{}': {}", self.server.url, e))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClientError::Config(format!(
                "server url must be http or https, got '{other}'"
            ))),
        }
    }

    /// Provider configuration for the interactive authorization.
    pub fn google_config(&self) -> GoogleConfig {
        let mut config = GoogleConfig::new();
        if let Some(path) = &self.google.credentials_path {
            config = config.with_credentials_path(path);
        }
        if let Some(path) = &self.google.token_path {
            config = config.with_token_path(path);
        }
        if let Some(id) = &self.google.calendar_id {
            config = config.with_calendar_id(id);
        }
        config.with_timeout(self.timeout())
    }

    /// Checks every setting.
    pub fn validate(&self) -> ClientResult<()> {
        self.server_url()?;
        if self.server.timeout == 0 {
            return Err(ClientError::Config("server timeout must be positive".into()));
        }
        self.google_config()
            .validate()
            .map_err(|e| ClientError::Config(format!("invalid [google] settings: {}", e.message())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ClientConfig::parse("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.server.url, DEFAULT_SERVER_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());

        let google = config.google_config();
        assert_eq!(google.token_path, PathBuf::from("token.json"));
        assert_eq!(google.calendar_id, "primary");
    }

    #[test]
    fn full_file() {
        let config = ClientConfig::parse(
            r#"
[server]
url = "https://meet.example.com"
timeout = 5

[google]
credentials_path = "/etc/quickmeet/credentials.json"
token_path = "/var/lib/quickmeet/token.json"
calendar_id = "team@example.com"
"#,
        )
        .unwrap();

        assert_eq!(config.server_url().unwrap().host_str(), Some("meet.example.com"));
        let google = config.google_config();
        assert_eq!(
            google.credentials_path,
            PathBuf::from("/etc/quickmeet/credentials.json")
        );
        assert_eq!(google.token_path, PathBuf::from("/var/lib/quickmeet/token.json"));
        assert_eq!(google.calendar_id, "team@example.com");
        assert_eq!(google.timeout, Duration::from_secs(5));
    }

    #[test]
    fn partial_server_section_keeps_defaults() {
        let config = ClientConfig::parse("[server]\ntimeout = 10\n").unwrap();
        assert_eq!(config.server.url, DEFAULT_SERVER_URL);
        assert_eq!(config.server.timeout, 10);
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.server.url = "ftp://example.com".into();
        assert!(config.validate().unwrap_err().to_string().contains("http or https"));

        let mut config = ClientConfig::default();
        config.server.url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.server.timeout = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.google.calendar_id = Some("  ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn dump_round_trips() {
        let mut config = ClientConfig::default();
        config.google.token_path = Some(PathBuf::from("/tmp/token.json"));
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ClientConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nurl = \"http://127.0.0.1:5050\"").unwrap();

        let config = ClientConfig::resolve(Some(file.path())).unwrap();
        assert_eq!(config.server.url, "http://127.0.0.1:5050");
    }

    #[test]
    fn explicit_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ClientConfig::resolve(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn invalid_toml_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nurl = 1").unwrap();
        let err = ClientConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}

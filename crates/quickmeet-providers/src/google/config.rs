//! Google Calendar/Meet provider configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// OAuth 2.0 client credentials, read from the client-secret file.
///
/// Users must provide their own OAuth client, as Google requires registered
/// applications for Calendar and Meet API access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

/// Structure of Google's OAuth client-secret JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with "installed" or "web" section
/// 2. Flat format with client_id and client_secret at root level
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads OAuth credentials from a client-secret file.
    ///
    /// A missing or malformed file is a configuration error: the operator has
    /// to download the file from the Google Cloud Console.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read client-secret file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        let credentials = Self::from_json(&content)?;
        credentials.validate()?;
        Ok(credentials)
    }

    /// Parses OAuth credentials from a client-secret JSON string.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse client-secret JSON: {}", e))
        })?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(ProviderError::configuration(
            "client-secret file must contain an 'installed'/'web' section or 'client_id'/'client_secret' at root level",
        ))
    }

    /// Validates that the credentials appear to be correctly formatted.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.client_id.is_empty() {
            return Err(ProviderError::configuration("client_id is required"));
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err(ProviderError::configuration(
                "client_id should end with .apps.googleusercontent.com",
            ));
        }
        if self.client_secret.is_empty() {
            return Err(ProviderError::configuration("client_secret is required"));
        }
        Ok(())
    }
}

/// Base URLs of the Google services the provider talks to.
///
/// Overridable so tests can point every call at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    /// OAuth consent page.
    pub auth_url: String,
    /// OAuth token endpoint.
    pub token_url: String,
    /// Calendar API v3 root.
    pub calendar_api: String,
    /// Meet API v2 root.
    pub meet_api: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            calendar_api: "https://www.googleapis.com/calendar/v3".to_string(),
            meet_api: "https://meet.googleapis.com/v2".to_string(),
        }
    }
}

impl GoogleEndpoints {
    /// Routes every endpoint under a single base URL.
    ///
    /// Paths are `{base}/auth`, `{base}/token`, `{base}/calendar/v3` and
    /// `{base}/meet/v2`.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            auth_url: format!("{base}/auth"),
            token_url: format!("{base}/token"),
            calendar_api: format!("{base}/calendar/v3"),
            meet_api: format!("{base}/meet/v2"),
        }
    }
}

/// Configuration for the Google provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Path of the client-secret file. Defaults to `./credentials.json`.
    pub credentials_path: PathBuf,

    /// Path of the persisted token file. Defaults to `./token.json`.
    pub token_path: PathBuf,

    /// Calendar that receives new events. Defaults to `primary`.
    pub calendar_id: String,

    /// Request timeout for vendor calls.
    pub timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Port range for the interactive loopback OAuth server.
    pub loopback_port_range: (u16, u16),

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Redirect target for server-driven consent flows.
    ///
    /// When unset, a missing credential cannot start a consent flow on its
    /// own and the operator must run the interactive flow.
    pub redirect_uri: Option<String>,

    /// Vendor endpoints.
    pub endpoints: GoogleEndpoints,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default client-secret file.
    pub const DEFAULT_CREDENTIALS_PATH: &'static str = "credentials.json";

    /// Default token file.
    pub const DEFAULT_TOKEN_PATH: &'static str = "token.json";

    /// Default calendar.
    pub const DEFAULT_CALENDAR_ID: &'static str = "primary";

    /// Scope for creating events on the user's calendars.
    pub const CALENDAR_SCOPE: &'static str = "https://www.googleapis.com/auth/calendar";

    /// Scope for creating Meet spaces.
    pub const MEET_SCOPE: &'static str =
        "https://www.googleapis.com/auth/meetings.space.created";

    /// Creates a configuration with default paths and endpoints.
    pub fn new() -> Self {
        Self {
            credentials_path: PathBuf::from(Self::DEFAULT_CREDENTIALS_PATH),
            token_path: PathBuf::from(Self::DEFAULT_TOKEN_PATH),
            calendar_id: Self::DEFAULT_CALENDAR_ID.to_string(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("quickmeet/{}", env!("CARGO_PKG_VERSION")),
            loopback_port_range: (8080, 8090),
            scopes: vec![Self::CALENDAR_SCOPE.to_string(), Self::MEET_SCOPE.to_string()],
            redirect_uri: None,
            endpoints: GoogleEndpoints::default(),
        }
    }

    /// Sets the client-secret file path.
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the calendar that receives new events.
    pub fn with_calendar_id(mut self, id: impl Into<String>) -> Self {
        self.calendar_id = id.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the loopback port range for OAuth.
    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the consent redirect target.
    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Sets the vendor endpoints.
    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Loads the client credentials named by this configuration.
    pub fn load_credentials(&self) -> ProviderResult<OAuthCredentials> {
        OAuthCredentials::from_file(&self.credentials_path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ProviderResult<()> {
        if self.scopes.is_empty() {
            return Err(ProviderError::configuration(
                "at least one OAuth scope is required",
            ));
        }

        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err(ProviderError::configuration("invalid loopback port range"));
        }

        if self.calendar_id.trim().is_empty() {
            return Err(ProviderError::configuration("calendar id must not be empty"));
        }

        if self.timeout.is_zero() {
            return Err(ProviderError::configuration("timeout must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;

    fn test_credentials() -> OAuthCredentials {
        OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    #[test]
    fn credentials_validation() {
        assert!(test_credentials().validate().is_ok());
        assert!(OAuthCredentials::new("", "secret").validate().is_err());
        assert!(OAuthCredentials::new("bad-id", "secret").validate().is_err());
        assert!(
            OAuthCredentials::new("test.apps.googleusercontent.com", "")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn config_defaults() {
        let config = GoogleConfig::default();
        assert_eq!(config.credentials_path, PathBuf::from("credentials.json"));
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.redirect_uri.is_none());
        assert_eq!(
            config.scopes,
            vec![
                "https://www.googleapis.com/auth/calendar".to_string(),
                "https://www.googleapis.com/auth/meetings.space.created".to_string(),
            ]
        );
        assert_eq!(
            config.endpoints.token_url,
            "https://oauth2.googleapis.com/token"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new()
            .with_credentials_path("/etc/quickmeet/credentials.json")
            .with_token_path("/var/lib/quickmeet/token.json")
            .with_calendar_id("team@example.com")
            .with_timeout(Duration::from_secs(60))
            .with_loopback_port_range(9000, 9010)
            .with_redirect_uri("http://localhost:5000/oauth2callback");

        assert_eq!(config.calendar_id, "team@example.com");
        assert_eq!(
            config.redirect_uri.as_deref(),
            Some("http://localhost:5000/oauth2callback")
        );
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.loopback_port_range, (9000, 9010));
    }

    #[test]
    fn config_validation() {
        assert!(GoogleConfig::new().with_scopes(vec![]).validate().is_err());
        assert!(
            GoogleConfig::new()
                .with_loopback_port_range(9010, 9000)
                .validate()
                .is_err()
        );
        assert!(GoogleConfig::new().with_calendar_id(" ").validate().is_err());
        assert!(
            GoogleConfig::new()
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn endpoints_with_base() {
        let endpoints = GoogleEndpoints::with_base("http://127.0.0.1:1234/");
        assert_eq!(endpoints.token_url, "http://127.0.0.1:1234/token");
        assert_eq!(endpoints.calendar_api, "http://127.0.0.1:1234/calendar/v3");
        assert_eq!(endpoints.meet_api, "http://127.0.0.1:1234/meet/v2");
    }

    #[test]
    fn credentials_from_json_installed() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "project_id": "my-project",
                "redirect_uris": ["http://localhost"]
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn credentials_from_json_web() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret"
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id.apps.googleusercontent.com");
    }

    #[test]
    fn credentials_from_json_flat() {
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret",
            "refresh_token": "some-refresh-token"
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_secret, "flat-secret");
    }

    #[test]
    fn credentials_from_json_invalid() {
        let err = OAuthCredentials::from_json(r#"{ "other": {} }"#).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("client_id"));

        let err = OAuthCredentials::from_json("not json").unwrap_err();
        assert!(err.message().contains("parse"));
    }

    #[test]
    fn missing_credentials_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = GoogleConfig::new().with_credentials_path(dir.path().join("missing.json"));
        let err = config.load_credentials().unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("missing.json"));
    }

    #[test]
    fn credentials_file_is_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"installed":{"client_id":"bad-id","client_secret":"s"}}"#)
            .unwrap();

        let config = GoogleConfig::new().with_credentials_path(&path);
        let err = config.load_credentials().unwrap_err();
        assert!(err.message().contains(".apps.googleusercontent.com"));

        std::fs::write(
            &path,
            r#"{"installed":{"client_id":"ok.apps.googleusercontent.com","client_secret":"s"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.load_credentials().unwrap().client_id,
            "ok.apps.googleusercontent.com"
        );
    }
}

//! OAuth 2.0 PKCE flow implementation for Google APIs.
//!
//! Implements the Authorization Code flow with PKCE (Proof Key for Code
//! Exchange). Two redirect styles are supported:
//!
//! - **Callback**: the server's own `/oauth2callback` route receives the
//!   redirect; [`super::Authorizer`] keeps the pending [`PkceFlow`] between
//!   `begin_consent` and `complete_consent`.
//! - **Loopback**: [`OAuthClient::authorize_loopback`] starts a throwaway
//!   listener on `127.0.0.1`, opens the browser and blocks until the
//!   redirect arrives. Only the CLI uses it.
//!
//! # Security
//!
//! - PKCE prevents authorization code interception attacks
//! - The state parameter prevents CSRF attacks
//! - The loopback server only listens on localhost

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::OAuthCredentials;
use super::tokens::AccessToken;

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// Timeout for waiting for the loopback callback.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Path the loopback listener accepts redirects on.
pub const CALLBACK_PATH: &str = "/oauth2callback";

/// Page shown in the browser after a successful consent.
pub const SUCCESS_PAGE: &str = "<html><body><h1>Authorization Successful</h1>\
    <p>You can close this window.</p></body></html>";

/// Page shown in the browser after a failed or denied consent.
pub const FAILURE_PAGE: &str = "<html><body><h1>Authorization Failed</h1>\
    <p>You can close this window and try again.</p></body></html>";

/// Tokens returned by the token endpoint.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// Fresh access token.
    pub access_token: AccessToken,
    /// Refresh token, only present on code exchange.
    pub refresh_token: Option<String>,
}

/// OAuth client for Google APIs.
///
/// Client credentials are passed per call because the client-secret file is
/// read lazily and may appear after startup.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http_client: reqwest::Client,
    auth_url: String,
    token_url: String,
}

impl OAuthClient {
    /// Creates a new OAuth client.
    pub fn new(
        http_client: reqwest::Client,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            auth_url: auth_url.into(),
            token_url: token_url.into(),
        }
    }

    /// Returns the consent URL for a flow.
    pub fn auth_url(
        &self,
        flow: &PkceFlow,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        flow.build_auth_url(&self.auth_url, client_id, redirect_uri, scopes)
    }

    /// Runs the whole consent flow through a loopback listener.
    ///
    /// Opens the browser (or prints the URL when that fails) and blocks a
    /// worker thread for at most five minutes waiting for the redirect.
    pub async fn authorize_loopback(
        &self,
        credentials: &OAuthCredentials,
        scopes: &[String],
        port_range: (u16, u16),
    ) -> ProviderResult<TokenGrant> {
        let flow = PkceFlow::new();

        let (listener, port) = Self::bind_loopback_server(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}{}", port, CALLBACK_PATH);
        let auth_url = self.auth_url(&flow, &credentials.client_id, &redirect_uri, scopes);

        info!("starting OAuth flow, opening browser...");
        debug!(url = %auth_url, "authorization URL");

        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nPlease open this URL in your browser:\n\n{}\n", auth_url);
        }

        let (code, received_state) = tokio::task::spawn_blocking(move || {
            Self::wait_for_callback(listener)
        })
        .await
        .map_err(|e| ProviderError::internal(format!("callback listener panicked: {}", e)))??;

        if received_state != flow.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch - possible CSRF attack",
            ));
        }

        info!("received authorization code, exchanging for tokens...");
        self.exchange_code(credentials, &code, &flow.verifier, &redirect_uri)
            .await
    }

    /// Obtains a new access token with a refresh token.
    ///
    /// A 4xx answer (typically `invalid_grant`) means the refresh token is
    /// no longer valid and is reported as an authentication failure.
    pub async fn refresh(
        &self,
        credentials: &OAuthCredentials,
        refresh_token: &str,
    ) -> ProviderResult<TokenGrant> {
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let grant = self.token_request(&params, "token refresh").await?;
        debug!("refreshed access token");
        Ok(grant)
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        credentials: &OAuthCredentials,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> ProviderResult<TokenGrant> {
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let grant = self.token_request(&params, "token exchange").await?;
        info!("successfully obtained tokens");
        Ok(grant)
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenGrant> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{} request failed: {}", what, e)).with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
        })?;

        if !status.is_success() {
            let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
            let err = if status.is_server_error() {
                ProviderError::server(format!("{} failed ({})", what, status))
            } else {
                ProviderError::authentication(format!("{} rejected ({})", what, status))
            };
            return Err(err.with_details(details));
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
        })?;

        Ok(TokenGrant {
            access_token: AccessToken::new(token_response.access_token, token_response.expires_in),
            refresh_token: token_response.refresh_token.filter(|t| !t.is_empty()),
        })
    }

    /// Tries to bind a TCP listener on an available port in the given range.
    fn bind_loopback_server(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
        for port in port_range.0..=port_range.1 {
            match TcpListener::bind(("127.0.0.1", port)) {
                Ok(listener) => {
                    debug!("bound loopback server on port {}", port);
                    return Ok((listener, port));
                }
                Err(_) => continue,
            }
        }
        Err(ProviderError::configuration(format!(
            "no available port in range {}-{}",
            port_range.0, port_range.1
        )))
    }

    /// Waits for the OAuth callback and extracts the authorization code.
    fn wait_for_callback(listener: TcpListener) -> ProviderResult<(String, String)> {
        let (tx, rx) = mpsc::channel();

        // The accept loop has no timeout of its own
        let _handle = thread::spawn(move || {
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => {
                        if let Some(result) = Self::handle_callback(stream) {
                            let _ = tx.send(result);
                            return;
                        }
                    }
                    Err(e) => {
                        error!("failed to accept connection: {}", e);
                    }
                }
            }
        });

        match rx.recv_timeout(CALLBACK_TIMEOUT) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Err(ProviderError::authentication("OAuth callback timeout"))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(ProviderError::internal("callback channel disconnected"))
            }
        }
    }

    /// Handles an incoming HTTP request on the loopback server.
    ///
    /// Returns `None` for requests that are not the redirect (favicon etc.).
    fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<(String, String)>> {
        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();

        if reader.read_line(&mut request_line).is_err() {
            return None;
        }

        // GET /oauth2callback?code=...&state=... HTTP/1.1
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 || parts[0] != "GET" {
            return None;
        }

        let path = parts[1];
        if !path.starts_with(CALLBACK_PATH) {
            return None;
        }

        let query = path.split_once('?').map(|(_, q)| q).unwrap_or("");
        let params = CallbackParams::parse(query);
        let result = params.into_code_and_state();

        let (status, page) = if result.is_ok() {
            ("200 OK", SUCCESS_PAGE)
        } else {
            ("400 Bad Request", FAILURE_PAGE)
        };
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n{}",
            status, page
        );

        let _ = stream.write_all(response.as_bytes());
        let _ = stream.flush();

        Some(result)
    }
}

/// Query parameters of an OAuth redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    /// Authorization code.
    pub code: Option<String>,
    /// CSRF state echoed back by the vendor.
    pub state: Option<String>,
    /// Error reported by the vendor, e.g. `access_denied`.
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parses a raw query string.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for pair in query.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = urlencoding::decode(&value.replace('+', " "))
                .map(|v| v.into_owned())
                .unwrap_or_default();
            match key {
                "code" => params.code = Some(value),
                "state" => params.state = Some(value),
                "error" => params.error = Some(value),
                _ => {}
            }
        }
        params
    }

    /// Returns the code and state, or the reason the redirect is unusable.
    pub fn into_code_and_state(self) -> ProviderResult<(String, String)> {
        if let Some(error) = self.error {
            return Err(ProviderError::authentication(format!(
                "authorization denied: {}",
                error
            )));
        }
        match (self.code.filter(|c| !c.is_empty()), self.state) {
            (Some(code), Some(state)) => Ok((code, state)),
            (Some(_), None) => Err(ProviderError::authentication(
                "missing state in authorization callback",
            )),
            (None, _) => Err(ProviderError::authentication(
                "missing authorization code in callback",
            )),
        }
    }
}

/// PKCE flow state and utilities.
///
/// Implements RFC 7636 (Proof Key for Code Exchange).
#[derive(Debug, Clone)]
pub struct PkceFlow {
    /// The code verifier (high-entropy random string).
    pub verifier: String,
    /// The code challenge (SHA-256 hash of verifier, base64url encoded).
    pub challenge: String,
    /// Random state for CSRF protection.
    pub state: String,
}

impl PkceFlow {
    /// Creates a new PKCE flow with random verifier and state.
    pub fn new() -> Self {
        let verifier = Self::generate_verifier();
        let challenge = Self::compute_challenge(&verifier);
        let state = Self::generate_state();

        Self {
            verifier,
            challenge,
            state,
        }
    }

    fn generate_verifier() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..CODE_VERIFIER_LENGTH).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    fn compute_challenge(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    fn generate_state() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..16).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    /// Builds the consent URL under `base`.
    ///
    /// Requests offline access with a forced consent prompt so that Google
    /// always returns a refresh token.
    pub fn build_auth_url(
        &self,
        base: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            base,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

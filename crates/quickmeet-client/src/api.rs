//! HTTP client for the quickmeet server.

use std::time::Duration;

use quickmeet_core::AuthState;
use quickmeet_protocol::{
    AuthStatusResponse, ErrorBody, HealthResponse, InstantMeetResponse, ScheduleMeetingRequest,
    ScheduleMeetingResponse, paths,
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Client for the quickmeet HTTP API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ClientError::Config(format!("invalid server url '{base_url}': {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quickmeet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/schedule-meeting`.
    pub async fn schedule_meeting(
        &self,
        request: &ScheduleMeetingRequest,
    ) -> ClientResult<ScheduleMeetingResponse> {
        let response = self
            .http
            .post(self.url(paths::SCHEDULE_MEETING))
            .json(request)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        parse_json(response).await
    }

    /// `POST /api/instant-meet`.
    ///
    /// Both outcomes share one body; a failed one becomes
    /// [`ClientError::Api`].
    pub async fn instant_meet(&self) -> ClientResult<InstantMeetResponse> {
        let response = self
            .http
            .post(self.url(paths::INSTANT_MEET))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        let body: InstantMeetResponse = serde_json::from_str(&text).map_err(|_| ClientError::Api {
            status: status.as_u16(),
            message: text.clone(),
            details: None,
        })?;

        if status.is_success() && body.success && body.meet_url.is_some() {
            return Ok(body);
        }
        Err(ClientError::Api {
            status: status.as_u16(),
            message: body
                .message
                .unwrap_or_else(|| "instant meeting failed".to_string()),
            details: None,
        })
    }

    /// `GET /api/auth/status`.
    pub async fn auth_status(&self) -> ClientResult<AuthState> {
        let response = self
            .http
            .get(self.url(paths::AUTH_STATUS))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let body: AuthStatusResponse = parse_json(response).await?;
        Ok(body.state)
    }

    /// `GET /health`.
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        let response = self
            .http
            .get(self.url(paths::HEALTH))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        parse_json(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Connection(format!("request to {} timed out", self.base_url))
        } else {
            ClientError::Connection(format!(
                "cannot reach {} (is `quickmeet server` running?): {}",
                self.base_url, err
            ))
        }
    }
}

/// Decodes a success body, or turns an error body into [`ClientError::Api`].
async fn parse_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
    debug!(status = status.as_u16(), "server response");

    if status.is_success() {
        return serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("{e}: {text}")));
    }

    Err(api_error(status, &text))
}

fn api_error(status: StatusCode, text: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(text) {
        Ok(body) => ClientError::Api {
            status: status.as_u16(),
            message: body.error,
            details: body.details,
        },
        Err(_) => ClientError::Api {
            status: status.as_u16(),
            message: if text.trim().is_empty() {
                status.to_string()
            } else {
                text.to_string()
            },
            details: None,
        },
    }
}

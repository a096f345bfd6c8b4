//! `quickmeet status`.

use quickmeet_core::AuthState;
use serde::Serialize;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::render::{OutputFormat, Renderer};

/// What the server reports about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub server: String,
    pub version: String,
    pub auth: AuthState,
}

impl StatusReport {
    /// Next step for the operator, if one is needed.
    pub fn hint(&self) -> Option<&'static str> {
        match self.auth {
            AuthState::Authorized => None,
            AuthState::PendingConsent => Some("finish the consent page opened by the server"),
            AuthState::Absent => Some("run `quickmeet auth` to authorize"),
        }
    }
}

/// Queries `/health` then `/api/auth/status`.
pub async fn fetch(api: &ApiClient) -> ClientResult<StatusReport> {
    let health = api.health().await?;
    let auth = api.auth_status().await?;
    Ok(StatusReport {
        server: api.base_url().to_string(),
        version: health.version,
        auth,
    })
}

pub async fn run(json: bool, api: &ApiClient) -> ClientResult<()> {
    let report = fetch(api).await?;
    let renderer = Renderer::new(OutputFormat::from_json_flag(json));
    println!("{}", renderer.status(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn fetch_combines_health_and_auth() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_body(r#"{"status":"ok","version":"0.1.0"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/api/auth/status")
            .with_body(r#"{"state":"absent"}"#)
            .create_async()
            .await;

        let api = ApiClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let report = fetch(&api).await.unwrap();

        assert_eq!(report.server, server.url());
        assert_eq!(report.version, "0.1.0");
        assert_eq!(report.auth, AuthState::Absent);
        assert_eq!(report.hint(), Some("run `quickmeet auth` to authorize"));
    }

    #[tokio::test]
    async fn fetch_stops_when_server_is_down() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;
        let auth = server
            .mock("GET", "/api/auth/status")
            .expect(0)
            .create_async()
            .await;

        let api = ApiClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        assert!(fetch(&api).await.is_err());
        auth.assert_async().await;
    }
}

//! Google Calendar and Meet API client.
//!
//! Low-level HTTP calls: request building, error mapping and response
//! parsing. Tokens are passed per call; the provider owns authorization.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use quickmeet_core::SendUpdates;

use crate::error::{ProviderError, ProviderResult};

use super::config::GoogleConfig;
use super::payload::EventPayload;

/// Builds the shared HTTP client for vendor calls.
pub fn build_http_client(config: &GoogleConfig) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| {
            ProviderError::internal(format!("failed to create HTTP client: {}", e)).with_source(e)
        })
}

/// Google Calendar/Meet API client.
#[derive(Debug, Clone)]
pub struct GoogleApiClient {
    http_client: reqwest::Client,
    calendar_api: String,
    meet_api: String,
}

impl GoogleApiClient {
    /// Creates a client for the given API roots.
    pub fn new(
        http_client: reqwest::Client,
        calendar_api: impl Into<String>,
        meet_api: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            calendar_api: calendar_api.into().trim_end_matches('/').to_string(),
            meet_api: meet_api.into().trim_end_matches('/').to_string(),
        }
    }

    /// Inserts an event with a conference create request.
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        payload: &EventPayload,
        send_updates: SendUpdates,
    ) -> ProviderResult<ApiEvent> {
        let url = format!(
            "{}/calendars/{}/events",
            self.calendar_api,
            urlencoding::encode(calendar_id)
        );

        debug!(calendar_id, request_id = payload.request_id(), "inserting event");
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .query(&[
                ("conferenceDataVersion", "1"),
                ("sendUpdates", send_updates.as_str()),
            ])
            .json(payload)
            .send()
            .await
            .map_err(map_send_error)?;

        parse_response(response, "calendar event").await
    }

    /// Creates a standalone Meet space.
    pub async fn create_space(&self, access_token: &str) -> ProviderResult<ApiSpace> {
        let url = format!("{}/spaces", self.meet_api);

        debug!("creating meet space");
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(map_send_error)?;

        parse_response(response, "meet space").await
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    let err = if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    };
    err.with_source(e)
}

/// Maps a vendor response to a value or an error carrying the vendor detail.
async fn parse_response<T>(response: reqwest::Response, what: &str) -> ProviderResult<T>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();

    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    let body = response.text().await.map_err(|e| {
        ProviderError::network(format!("failed to read response: {}", e)).with_source(e)
    })?;

    if !status.is_success() {
        let (message, details) = vendor_error(&body);
        let err = match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => ProviderError::rate_limited(format!(
                "rate limit exceeded{}",
                retry_after
                    .map(|s| format!(", retry after {} seconds", s))
                    .unwrap_or_default()
            )),
            reqwest::StatusCode::UNAUTHORIZED => {
                ProviderError::authorization("access token expired or invalid")
            }
            reqwest::StatusCode::FORBIDDEN => ProviderError::authorization(format!(
                "access denied creating {}: {}",
                what, message
            )),
            reqwest::StatusCode::NOT_FOUND => {
                ProviderError::not_found(format!("{} target not found: {}", what, message))
            }
            s if s.is_client_error() => {
                ProviderError::bad_request(format!("API error ({}): {}", s, message))
            }
            s => ProviderError::server(format!("API error ({}): {}", s, message)),
        };
        return Err(err.with_details(details));
    }

    serde_json::from_str(&body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse {} response: {}", what, e))
    })
}

/// Extracts the message and detail of a Google error body.
///
/// Google wraps errors as `{"error": {"code", "message", "status", ...}}`;
/// the inner object is the detail. Non-JSON bodies are returned verbatim.
fn vendor_error(body: &str) -> (String, Value) {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut map)) => match map.remove("error") {
            Some(error) => {
                let message = error
                    .get("message")
                    .and_then(Value::as_str)
                    .or_else(|| error.as_str())
                    .unwrap_or("unknown error")
                    .to_string();
                (message, error)
            }
            None => ("unknown error".to_string(), Value::Object(map)),
        },
        Ok(other) => (other.to_string(), other),
        Err(_) => {
            let message = if body.trim().is_empty() {
                "empty response".to_string()
            } else {
                body.trim().to_string()
            };
            (message, Value::String(body.to_string()))
        }
    }
}

/// An event returned by `events.insert`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub id: Option<String>,
    pub html_link: Option<String>,
    pub hangout_link: Option<String>,
    pub conference_data: Option<ApiConferenceData>,
}

impl ApiEvent {
    /// The join URL: `hangoutLink`, else the first video entry point.
    pub fn join_url(&self) -> Option<&str> {
        self.hangout_link.as_deref().filter(|s| !s.is_empty()).or_else(|| {
            self.conference_data
                .as_ref()?
                .entry_points
                .iter()
                .find(|ep| ep.entry_point_type == "video")
                .and_then(|ep| ep.uri.as_deref())
        })
    }
}

/// Conference data from the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConferenceData {
    #[serde(default)]
    pub entry_points: Vec<ApiEntryPoint>,
}

/// Entry point from the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEntryPoint {
    pub entry_point_type: String,
    pub uri: Option<String>,
}

/// A space returned by `spaces.create`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpace {
    pub name: Option<String>,
    pub meeting_uri: Option<String>,
    pub meeting_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use mockito::Matcher;
    use quickmeet_core::ScheduleRequest;

    fn client(server: &mockito::Server) -> GoogleApiClient {
        GoogleApiClient::new(
            reqwest::Client::new(),
            format!("{}/calendar/v3", server.url()),
            format!("{}/meet/v2", server.url()),
        )
    }

    fn payload() -> EventPayload {
        let schedule = ScheduleRequest::new("Standup", "2025-06-15T14:00:00", "2025-06-15T15:00:00")
            .validate()
            .unwrap();
        EventPayload::new(&schedule, "req0000000000000000x".to_string())
    }

    #[test]
    fn join_url_prefers_hangout_link() {
        let event: ApiEvent = serde_json::from_str(
            r#"{
                "id": "evt1",
                "hangoutLink": "https://meet.google.com/abc-defg-hij",
                "conferenceData": {
                    "entryPoints": [
                        {"entryPointType": "phone", "uri": "tel:+1-555"},
                        {"entryPointType": "video", "uri": "https://meet.google.com/zzz-zzzz-zzz"}
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(event.join_url(), Some("https://meet.google.com/abc-defg-hij"));
    }

    #[test]
    fn join_url_falls_back_to_video_entry_point() {
        let event: ApiEvent = serde_json::from_str(
            r#"{
                "id": "evt1",
                "conferenceData": {
                    "entryPoints": [
                        {"entryPointType": "phone", "uri": "tel:+1-555"},
                        {"entryPointType": "video", "uri": "https://meet.google.com/zzz-zzzz-zzz"}
                    ]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(event.join_url(), Some("https://meet.google.com/zzz-zzzz-zzz"));

        let bare: ApiEvent = serde_json::from_str(r#"{"id": "evt2"}"#).unwrap();
        assert!(bare.join_url().is_none());
    }

    #[test]
    fn vendor_error_shapes() {
        let (message, details) = vendor_error(
            r#"{"error":{"code":403,"message":"Insufficient Permission","status":"PERMISSION_DENIED"}}"#,
        );
        assert_eq!(message, "Insufficient Permission");
        assert_eq!(details["status"], "PERMISSION_DENIED");

        let (message, details) = vendor_error(r#"{"error":"invalid_request"}"#);
        assert_eq!(message, "invalid_request");
        assert_eq!(details, Value::String("invalid_request".into()));

        let (message, details) = vendor_error("<html>Bad Gateway</html>");
        assert_eq!(message, "<html>Bad Gateway</html>");
        assert_eq!(details, Value::String("<html>Bad Gateway</html>".into()));
    }

    #[tokio::test]
    async fn insert_event_sends_query_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/calendar/v3/calendars/team%40example.com/events")
            .match_header("authorization", "Bearer ya29.t")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("conferenceDataVersion".into(), "1".into()),
                Matcher::UrlEncoded("sendUpdates".into(), "none".into()),
            ]))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "summary": "Standup",
                "conferenceData": {
                    "createRequest": {
                        "requestId": "req0000000000000000x",
                        "conferenceSolutionKey": {"type": "hangoutsMeet"}
                    }
                }
            })))
            .with_status(200)
            .with_body(
                r#"{"id":"evt1","htmlLink":"https://www.google.com/calendar/event?eid=ZXZ0MQ","hangoutLink":"https://meet.google.com/abc-defg-hij"}"#,
            )
            .create_async()
            .await;

        let event = client(&server)
            .insert_event("ya29.t", "team@example.com", &payload(), SendUpdates::None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(event.id.as_deref(), Some("evt1"));
        assert_eq!(event.join_url(), Some("https://meet.google.com/abc-defg-hij"));
    }

    #[tokio::test]
    async fn insert_event_error_carries_vendor_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"Invalid attendee email.","status":"INVALID_ARGUMENT"}}"#)
            .create_async()
            .await;

        let err = client(&server)
            .insert_event("ya29.t", "primary", &payload(), SendUpdates::All)
            .await
            .unwrap_err();

        assert_eq!(err.code(), ProviderErrorCode::BadRequest);
        assert!(err.message().contains("Invalid attendee email."));
        assert_eq!(err.details().unwrap()["status"], "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn status_codes_map_to_error_codes() {
        let cases = [
            (401, ProviderErrorCode::AuthorizationFailed),
            (403, ProviderErrorCode::AuthorizationFailed),
            (404, ProviderErrorCode::NotFound),
            (429, ProviderErrorCode::RateLimited),
            (500, ProviderErrorCode::ServerError),
            (503, ProviderErrorCode::ServerError),
        ];

        for (status, code) in cases {
            let mut server = mockito::Server::new_async().await;
            server
                .mock("POST", "/meet/v2/spaces")
                .with_status(status)
                .with_header("Retry-After", "7")
                .with_body(r#"{"error":{"code":0,"message":"nope"}}"#)
                .create_async()
                .await;

            let err = client(&server).create_space("ya29.t").await.unwrap_err();
            assert_eq!(err.code(), code, "status {status}");
            assert!(err.details().is_some());
            if status == 429 {
                assert!(err.message().contains("retry after 7 seconds"));
            }
        }
    }

    #[tokio::test]
    async fn create_space_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/meet/v2/spaces")
            .match_header("authorization", "Bearer ya29.t")
            .match_body(Matcher::Json(serde_json::json!({})))
            .with_status(200)
            .with_body(
                r#"{"name":"spaces/jQCFfuBOdN5z","meetingUri":"https://meet.google.com/abc-mnop-xyz","meetingCode":"abc-mnop-xyz","config":{"accessType":"TRUSTED"}}"#,
            )
            .create_async()
            .await;

        let space = client(&server).create_space("ya29.t").await.unwrap();
        mock.assert_async().await;
        assert_eq!(space.meeting_uri.as_deref(), Some("https://meet.google.com/abc-mnop-xyz"));
        assert_eq!(space.meeting_code.as_deref(), Some("abc-mnop-xyz"));
        assert_eq!(space.name.as_deref(), Some("spaces/jQCFfuBOdN5z"));
    }

    #[tokio::test]
    async fn malformed_success_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/meet/v2/spaces")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client(&server).create_space("ya29.t").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn connection_failure_is_network_error() {
        let client = GoogleApiClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/calendar/v3",
            "http://127.0.0.1:9/meet/v2",
        );
        let err = client.create_space("ya29.t").await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::NetworkError);
    }
}

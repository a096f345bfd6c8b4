//! Request and response bodies of the quickmeet HTTP API.

use quickmeet_core::{
    AuthState, DEFAULT_TIMEZONE, InstantMeeting, MeetingResult, ScheduleRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/schedule-meeting`.
///
/// Every field is optional on the wire so that a request with missing
/// fields reaches validation and gets the documented 400 response instead
/// of a deserialization rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingRequest {
    /// Event summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Event body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 start timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// ISO-8601 end timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// IANA timezone, `UTC` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    /// Attendee emails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
    /// Whether to email invitations, `true` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_invites: Option<bool>,
}

impl ScheduleMeetingRequest {
    /// Converts the wire body into a domain request, applying defaults.
    ///
    /// Missing required fields become empty strings and are reported by
    /// [`ScheduleRequest::check_required`].
    pub fn into_schedule_request(self) -> ScheduleRequest {
        let timezone = self
            .timezone
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());

        ScheduleRequest {
            title: self.title.unwrap_or_default(),
            description: self.description,
            start_time: self.start_time.unwrap_or_default(),
            end_time: self.end_time.unwrap_or_default(),
            timezone,
            attendees: self.attendees.unwrap_or_default(),
            send_invites: self.send_invites.unwrap_or(true),
        }
    }
}

impl From<ScheduleRequest> for ScheduleMeetingRequest {
    fn from(req: ScheduleRequest) -> Self {
        Self {
            title: Some(req.title),
            description: req.description,
            start_time: Some(req.start_time),
            end_time: Some(req.end_time),
            timezone: Some(req.timezone),
            attendees: Some(req.attendees),
            send_invites: Some(req.send_invites),
        }
    }
}

/// Successful response of `POST /api/schedule-meeting`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMeetingResponse {
    /// Join URL of the conferencing space.
    pub meet_url: String,
    /// Link to the event in the calendar web UI.
    pub calendar_event: String,
    /// Calendar event identifier.
    pub event_id: String,
    /// Echoed start timestamp.
    pub start_time: String,
    /// Echoed end timestamp.
    pub end_time: String,
}

impl From<MeetingResult> for ScheduleMeetingResponse {
    fn from(result: MeetingResult) -> Self {
        Self {
            meet_url: result.meet_url,
            calendar_event: result.calendar_event_url,
            event_id: result.event_id,
            start_time: result.start_time,
            end_time: result.end_time,
        }
    }
}

/// Response of `POST /api/instant-meet`, for both outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantMeetResponse {
    /// Whether a space was created.
    pub success: bool,
    /// Join URL, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meet_url: Option<String>,
    /// Failure reason, present on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl InstantMeetResponse {
    /// A successful response carrying only the join URL.
    pub fn succeeded(meeting: InstantMeeting) -> Self {
        Self {
            success: true,
            meet_url: Some(meeting.meet_url),
            message: None,
        }
    }

    /// A failed response.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            meet_url: None,
            message: Some(message.into()),
        }
    }
}

/// Error body used by every endpoint except instant-meet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Vendor or parser detail, when there is any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorBody {
    /// Creates an error body without details.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Builder method to attach details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Response of `GET /api/auth/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthStatusResponse {
    /// Current authorization state.
    pub state: AuthState,
}

/// Response of `GET /api/auth/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStartResponse {
    /// URL of the vendor consent page.
    pub auth_url: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the server answers.
    pub status: String,
    /// Server version.
    pub version: String,
}

impl HealthResponse {
    /// The health response of this build.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

//! Results of meeting operations and the credential lifecycle state.

use serde::{Deserialize, Serialize};

/// A meeting attached to a newly created calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingResult {
    /// Join URL of the conferencing space.
    pub meet_url: String,
    /// Link to the event in the calendar web UI.
    pub calendar_event_url: String,
    /// Opaque calendar event identifier.
    pub event_id: String,
    /// Start timestamp, echoed from the request.
    pub start_time: String,
    /// End timestamp, echoed from the request.
    pub end_time: String,
}

/// A standalone conferencing space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstantMeeting {
    /// Join URL of the space.
    pub meet_url: String,
    /// Short meeting code (e.g. `abc-mnop-xyz`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_code: Option<String>,
    /// Resource name of the space (e.g. `spaces/jQCFfuBOdN5z`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,
}

impl InstantMeeting {
    /// Creates an instant meeting with only a join URL.
    pub fn new(meet_url: impl Into<String>) -> Self {
        Self {
            meet_url: meet_url.into(),
            meeting_code: None,
            space_name: None,
        }
    }
}

/// Where the vendor authorization currently stands.
///
/// `Absent → PendingConsent → Authorized`; a rejected refresh token drops
/// back to `Absent`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    /// No stored credential and no consent in progress.
    #[default]
    #[serde(rename = "absent")]
    Absent,
    /// A consent URL was issued and the callback has not arrived yet.
    #[serde(rename = "pending")]
    PendingConsent,
    /// A refresh token is stored.
    #[serde(rename = "authorized")]
    Authorized,
}

impl AuthState {
    /// Returns the wire name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::PendingConsent => "pending",
            Self::Authorized => "authorized",
        }
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Calendar event payloads.

use quickmeet_core::{ScheduleTime, ValidatedSchedule};
use rand::Rng as _;
use rand::distr::Alphanumeric;
use serde::Serialize;

/// Length of a conference request id.
pub const REQUEST_ID_LENGTH: usize = 20;

/// Conference solution requested for new events.
const HANGOUTS_MEET: &str = "hangoutsMeet";

/// Body of `events.insert`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub attendees: Vec<EventAttendee>,
    pub conference_data: ConferenceData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventAttendee {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceData {
    pub create_request: CreateConferenceRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConferenceRequest {
    pub request_id: String,
    pub conference_solution_key: ConferenceSolutionKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConferenceSolutionKey {
    #[serde(rename = "type")]
    pub kind: String,
}

impl EventPayload {
    /// Builds the payload for a validated schedule, asking for a new Meet
    /// space under `request_id`.
    pub fn new(schedule: &ValidatedSchedule, request_id: String) -> Self {
        let timezone = schedule.timezone_name();
        Self {
            summary: schedule.title.clone(),
            description: schedule.description.clone(),
            start: EventDateTime::new(&schedule.start, timezone),
            end: EventDateTime::new(&schedule.end, timezone),
            attendees: schedule
                .attendees
                .iter()
                .map(|email| EventAttendee {
                    email: email.clone(),
                })
                .collect(),
            conference_data: ConferenceData {
                create_request: CreateConferenceRequest {
                    request_id,
                    conference_solution_key: ConferenceSolutionKey {
                        kind: HANGOUTS_MEET.to_string(),
                    },
                },
            },
        }
    }

    /// The conference request id carried by this payload.
    pub fn request_id(&self) -> &str {
        &self.conference_data.create_request.request_id
    }
}

impl EventDateTime {
    fn new(time: &ScheduleTime, timezone: &str) -> Self {
        Self {
            date_time: time.to_api_string(),
            time_zone: timezone.to_string(),
        }
    }
}

/// Generates a random conference request id.
///
/// Google deduplicates `createRequest`s by id, so every call must use a
/// fresh one.
pub fn generate_request_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(REQUEST_ID_LENGTH)
        .map(char::from)
        .collect()
}

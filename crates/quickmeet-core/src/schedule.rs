//! Scheduling requests and their validation.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::{ScheduleTime, parse_timezone};

/// Timezone used when a request does not name one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
});

/// Whether the calendar should email attendees about a new event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendUpdates {
    /// Notify every attendee.
    All,
    /// Create the event silently.
    None,
}

impl SendUpdates {
    /// Maps the request's `sendInvites` flag.
    pub fn from_send_invites(send_invites: bool) -> Self {
        if send_invites { Self::All } else { Self::None }
    }

    /// The value of the calendar API's `sendUpdates` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::None => "none",
        }
    }
}

/// A request to schedule a meeting with a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    /// Event summary.
    pub title: String,
    /// Optional event body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// ISO-8601 start timestamp.
    pub start_time: String,
    /// ISO-8601 end timestamp.
    pub end_time: String,
    /// IANA timezone name.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Attendee emails; order and duplicates are not significant.
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Whether attendees receive invitations.
    #[serde(default = "default_send_invites")]
    pub send_invites: bool,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_send_invites() -> bool {
    true
}

impl ScheduleRequest {
    /// Creates a request with the default timezone, no attendees and
    /// invitations enabled.
    pub fn new(
        title: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: None,
            start_time: start_time.into(),
            end_time: end_time.into(),
            timezone: default_timezone(),
            attendees: Vec::new(),
            send_invites: true,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Builder method to set the attendees.
    pub fn with_attendees<I, S>(mut self, attendees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = attendees.into_iter().map(Into::into).collect();
        self
    }

    /// Builder method to set whether invitations are sent.
    pub fn with_send_invites(mut self, send_invites: bool) -> Self {
        self.send_invites = send_invites;
        self
    }

    /// Checks that `title`, `startTime` and `endTime` are present.
    pub fn check_required(&self) -> Result<(), ValidationError> {
        let fields: Vec<&'static str> = [
            ("title", &self.title),
            ("startTime", &self.start_time),
            ("endTime", &self.end_time),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingRequiredFields { fields })
        }
    }

    /// Fully validates the request.
    ///
    /// Required fields are checked first, then the timezone, both
    /// timestamps, their ordering and finally the attendee list.
    pub fn validate(&self) -> Result<ValidatedSchedule, ValidationError> {
        self.check_required()?;

        let timezone = if self.timezone.trim().is_empty() {
            Tz::UTC
        } else {
            parse_timezone(&self.timezone)?
        };

        let start = ScheduleTime::parse("startTime", &self.start_time)?;
        let end = ScheduleTime::parse("endTime", &self.end_time)?;
        let start_utc = start.resolve("startTime", timezone)?;
        let end_utc = end.resolve("endTime", timezone)?;

        if end_utc <= start_utc {
            return Err(ValidationError::EndNotAfterStart);
        }

        let attendees = normalize_attendees(&self.attendees)?;

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);

        Ok(ValidatedSchedule {
            title: self.title.trim().to_string(),
            description,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            start,
            end,
            start_utc,
            end_utc,
            timezone,
            attendees,
            send_updates: SendUpdates::from_send_invites(self.send_invites),
        })
    }
}

/// A scheduling request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSchedule {
    /// Trimmed event summary.
    pub title: String,
    /// Non-blank description, if any.
    pub description: Option<String>,
    /// The start timestamp exactly as supplied.
    pub start_time: String,
    /// The end timestamp exactly as supplied.
    pub end_time: String,
    /// Parsed start.
    pub start: ScheduleTime,
    /// Parsed end.
    pub end: ScheduleTime,
    /// Start instant.
    pub start_utc: DateTime<Utc>,
    /// End instant.
    pub end_utc: DateTime<Utc>,
    /// Resolved timezone.
    pub timezone: Tz,
    /// De-duplicated attendee emails, first spelling wins.
    pub attendees: Vec<String>,
    /// Notification mode for the calendar API.
    pub send_updates: SendUpdates,
}

impl ValidatedSchedule {
    /// Length of the meeting.
    pub fn duration(&self) -> Duration {
        self.end_utc - self.start_utc
    }

    /// IANA name of the resolved timezone.
    pub fn timezone_name(&self) -> &'static str {
        self.timezone.name()
    }
}

/// Trims, drops blanks, validates and de-duplicates attendee emails.
///
/// Duplicates are detected case-insensitively.
fn normalize_attendees(attendees: &[String]) -> Result<Vec<String>, ValidationError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(attendees.len());

    for raw in attendees {
        let email = raw.trim();
        if email.is_empty() {
            continue;
        }
        if !EMAIL_RE.is_match(email) {
            return Err(ValidationError::InvalidAttendee(email.to_string()));
        }
        if seen.insert(email.to_lowercase()) {
            out.push(email.to_string());
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standup() -> ScheduleRequest {
        ScheduleRequest::new("Standup", "2025-06-15T14:00:00", "2025-06-15T15:00:00")
            .with_timezone("America/Los_Angeles")
            .with_attendees(["a@x.com"])
    }

    #[test]
    fn send_updates_mapping() {
        assert_eq!(SendUpdates::from_send_invites(true), SendUpdates::All);
        assert_eq!(SendUpdates::from_send_invites(false), SendUpdates::None);
        assert_eq!(SendUpdates::All.as_str(), "all");
        assert_eq!(SendUpdates::None.as_str(), "none");
    }

    #[test]
    fn defaults_when_deserializing() {
        let req: ScheduleRequest = serde_json::from_str(
            r#"{"title":"T","startTime":"2025-06-15T14:00:00","endTime":"2025-06-15T15:00:00"}"#,
        )
        .unwrap();
        assert_eq!(req.timezone, "UTC");
        assert!(req.attendees.is_empty());
        assert!(req.send_invites);
        assert!(req.description.is_none());
    }

    #[test]
    fn valid_request() {
        let validated = standup().validate().unwrap();
        assert_eq!(validated.title, "Standup");
        assert_eq!(validated.start_time, "2025-06-15T14:00:00");
        assert_eq!(validated.end_time, "2025-06-15T15:00:00");
        assert_eq!(validated.timezone_name(), "America/Los_Angeles");
        assert_eq!(validated.attendees, vec!["a@x.com".to_string()]);
        assert_eq!(validated.send_updates, SendUpdates::All);
        assert_eq!(validated.duration(), Duration::hours(1));
    }

    #[test]
    fn missing_fields_are_listed() {
        let req = ScheduleRequest::new("", " ", "");
        let err = req.validate().unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingRequiredFields {
                fields: vec!["title", "startTime", "endTime"],
            }
        );

        let req = ScheduleRequest::new("T", "2025-06-15T14:00:00", "");
        assert_eq!(
            req.check_required().unwrap_err(),
            ValidationError::MissingRequiredFields {
                fields: vec!["endTime"],
            }
        );
    }

    #[test]
    fn end_must_follow_start() {
        let equal = ScheduleRequest::new("T", "2025-06-15T14:00:00", "2025-06-15T14:00:00");
        assert_eq!(equal.validate().unwrap_err(), ValidationError::EndNotAfterStart);

        let reversed = ScheduleRequest::new("T", "2025-06-15T15:00:00", "2025-06-15T14:00:00");
        assert_eq!(
            reversed.validate().unwrap_err(),
            ValidationError::EndNotAfterStart
        );
    }

    #[test]
    fn ordering_uses_offsets() {
        // 14:00+02:00 is 12:00Z, which precedes 13:00Z
        let req = ScheduleRequest::new("T", "2025-06-15T14:00:00+02:00", "2025-06-15T13:00:00Z");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_timezone_falls_back_to_utc() {
        let req = ScheduleRequest::new("T", "2025-06-15T14:00:00", "2025-06-15T15:00:00")
            .with_timezone("");
        assert_eq!(req.validate().unwrap().timezone, Tz::UTC);
    }

    #[test]
    fn unknown_timezone() {
        let req = standup().with_timezone("Atlantis/Central");
        assert_eq!(
            req.validate().unwrap_err(),
            ValidationError::UnknownTimezone("Atlantis/Central".to_string())
        );
    }

    #[test]
    fn attendees_are_deduplicated() {
        let req = standup().with_attendees([
            "a@x.com",
            " b@y.org ",
            "A@X.com",
            "",
            "b@y.org",
        ]);
        let validated = req.validate().unwrap();
        assert_eq!(validated.attendees, vec!["a@x.com", "b@y.org"]);
    }

    #[test]
    fn bad_attendee_is_rejected() {
        let req = standup().with_attendees(["not-an-email"]);
        assert_eq!(
            req.validate().unwrap_err(),
            ValidationError::InvalidAttendee("not-an-email".to_string())
        );
    }

    #[test]
    fn invites_off() {
        let validated = standup().with_send_invites(false).validate().unwrap();
        assert_eq!(validated.send_updates, SendUpdates::None);
    }

    #[test]
    fn blank_description_is_dropped() {
        let validated = standup().with_description("   ").validate().unwrap();
        assert!(validated.description.is_none());

        let validated = standup().with_description(" agenda ").validate().unwrap();
        assert_eq!(validated.description.as_deref(), Some("agenda"));
    }
}

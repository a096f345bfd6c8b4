//! Validation errors for scheduling requests.

use thiserror::Error;

/// A user-correctable problem with a scheduling request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more of `title`, `startTime`, `endTime` is absent or blank.
    #[error("Missing required fields")]
    MissingRequiredFields {
        /// Wire names of the missing fields.
        fields: Vec<&'static str>,
    },

    /// A timestamp could not be parsed as ISO-8601.
    #[error("invalid {field} '{value}': expected an ISO-8601 timestamp")]
    InvalidTimestamp {
        /// Wire name of the offending field.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A local timestamp falls into a DST gap of the requested zone.
    #[error("{field} '{value}' does not exist in timezone {timezone}")]
    NonexistentLocalTime {
        /// Wire name of the offending field.
        field: &'static str,
        /// The rejected input.
        value: String,
        /// The zone the timestamp was resolved in.
        timezone: String,
    },

    /// The timezone is not a known IANA zone name.
    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    /// `endTime` is not strictly after `startTime`.
    #[error("endTime must be after startTime")]
    EndNotAfterStart,

    /// An attendee entry does not look like an email address.
    #[error("invalid attendee email '{0}'")]
    InvalidAttendee(String),
}

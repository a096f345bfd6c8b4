//! Core types: schedule requests, meeting results, validation, tracing

pub mod error;
pub mod meeting;
pub mod schedule;
pub mod time;
pub mod tracing;

pub use error::ValidationError;
pub use meeting::{AuthState, InstantMeeting, MeetingResult};
pub use schedule::{DEFAULT_TIMEZONE, ScheduleRequest, SendUpdates, ValidatedSchedule};
pub use time::{ScheduleTime, parse_timezone};
pub use crate::tracing::{LogFormat, TracingConfig, TracingError, init_tracing};

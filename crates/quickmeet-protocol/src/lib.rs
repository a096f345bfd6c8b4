//! HTTP request/response types for quickmeet.
//!
//! The server (`quickmeet-server`) and the CLI (`quickmeet-client`) agree on
//! the bodies defined here. All JSON field names are camelCase.
//!
//! # Endpoints
//!
//! | method | path                     | body                        | response                                  |
//! |--------|--------------------------|-----------------------------|-------------------------------------------|
//! | POST   | `/api/schedule-meeting`  | [`ScheduleMeetingRequest`]  | [`ScheduleMeetingResponse`] / [`ErrorBody`] |
//! | POST   | `/api/instant-meet`      | none                        | [`InstantMeetResponse`]                   |
//! | GET    | `/api/auth/status`       | none                        | [`AuthStatusResponse`]                    |
//! | GET    | `/api/auth/start`        | none                        | [`AuthStartResponse`] / [`ErrorBody`]     |
//! | GET    | `/oauth2callback`        | query `code`, `state`       | HTML                                      |
//! | GET    | `/health`                | none                        | [`HealthResponse`]                        |

mod types;

pub use types::{
    AuthStartResponse, AuthStatusResponse, ErrorBody, HealthResponse, InstantMeetResponse,
    ScheduleMeetingRequest, ScheduleMeetingResponse,
};

/// Route paths.
pub mod paths {
    /// Schedule a meeting with a calendar event.
    pub const SCHEDULE_MEETING: &str = "/api/schedule-meeting";
    /// Create a standalone conferencing space.
    pub const INSTANT_MEET: &str = "/api/instant-meet";
    /// Current authorization state.
    pub const AUTH_STATUS: &str = "/api/auth/status";
    /// Start the consent flow.
    pub const AUTH_START: &str = "/api/auth/start";
    /// OAuth redirect target.
    pub const OAUTH_CALLBACK: &str = "/oauth2callback";
    /// Liveness check.
    pub const HEALTH: &str = "/health";
}

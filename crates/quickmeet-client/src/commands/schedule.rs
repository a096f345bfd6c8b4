//! `quickmeet schedule`.

use quickmeet_core::ScheduleRequest;
use quickmeet_protocol::ScheduleMeetingRequest;
use tracing::{debug, info};

use crate::actions::run_actions;
use crate::api::ApiClient;
use crate::cli::ScheduleArgs;
use crate::error::ClientResult;
use crate::render::{OutputFormat, Renderer};

/// Builds the request from the command line and checks it locally.
///
/// Required fields and ordering are checked here so an obviously broken
/// request never reaches the server.
pub fn build_request(args: &ScheduleArgs) -> ClientResult<ScheduleRequest> {
    let mut request = ScheduleRequest::new(&args.title, &args.start, &args.end)
        .with_attendees(args.attendees.iter().cloned())
        .with_send_invites(!args.no_invites);
    if let Some(timezone) = &args.timezone {
        request = request.with_timezone(timezone);
    }
    if let Some(description) = &args.description {
        request = request.with_description(description);
    }

    let validated = request.validate()?;
    debug!(
        timezone = validated.timezone_name(),
        minutes = validated.duration().num_minutes(),
        attendees = validated.attendees.len(),
        "request validated"
    );
    Ok(request)
}

pub async fn run(args: &ScheduleArgs, api: &ApiClient) -> ClientResult<()> {
    let request = build_request(args)?;
    let response = api
        .schedule_meeting(&ScheduleMeetingRequest::from(request))
        .await?;
    info!(event_id = %response.event_id, "meeting scheduled");

    let renderer = Renderer::new(OutputFormat::from_json_flag(args.output.json));
    println!("{}", renderer.scheduled(&response)?);
    run_actions(&response.meet_url, &args.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputArgs;
    use crate::error::ClientError;
    use quickmeet_core::ValidationError;

    fn args(title: &str, start: &str, end: &str) -> ScheduleArgs {
        ScheduleArgs {
            title: title.into(),
            start: start.into(),
            end: end.into(),
            timezone: None,
            attendees: Vec::new(),
            description: None,
            no_invites: false,
            output: OutputArgs::default(),
        }
    }

    #[test]
    fn builds_request_with_defaults() {
        let request =
            build_request(&args("Standup", "2025-06-15T14:00:00", "2025-06-15T15:00:00")).unwrap();
        assert_eq!(request.timezone, "UTC");
        assert!(request.send_invites);
        assert!(request.description.is_none());
    }

    #[test]
    fn carries_every_option() {
        let mut a = args("Standup", "2025-06-15T14:00:00", "2025-06-15T15:00:00");
        a.timezone = Some("America/Los_Angeles".into());
        a.attendees = vec!["a@x.com".into()];
        a.description = Some("Daily sync".into());
        a.no_invites = true;

        let body = ScheduleMeetingRequest::from(build_request(&a).unwrap());
        assert_eq!(body.timezone.as_deref(), Some("America/Los_Angeles"));
        assert_eq!(body.attendees, Some(vec!["a@x.com".to_string()]));
        assert_eq!(body.description.as_deref(), Some("Daily sync"));
        assert_eq!(body.send_invites, Some(false));
    }

    #[test]
    fn rejects_blank_title() {
        let err = build_request(&args("  ", "2025-06-15T14:00:00", "2025-06-15T15:00:00"))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::MissingRequiredFields { .. })
        ));
    }

    #[test]
    fn rejects_end_before_start() {
        let err = build_request(&args("T", "2025-06-15T15:00:00", "2025-06-15T14:00:00"))
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Validation(ValidationError::EndNotAfterStart)
        ));
    }
}

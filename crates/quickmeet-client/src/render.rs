//! Output rendering for created meetings and server status.

use std::io::IsTerminal;

use quickmeet_protocol::{InstantMeetResponse, ScheduleMeetingResponse};
use serde::Serialize;

use crate::commands::status::StatusReport;
use crate::error::{ClientError, ClientResult};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// The server's JSON body.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Tty }
    }
}

/// Renders results for the terminal or as JSON.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    format: OutputFormat,
    hyperlinks: bool,
}

impl Renderer {
    /// Creates a renderer; OSC8 hyperlinks are used only on a terminal.
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            hyperlinks: std::io::stdout().is_terminal(),
        }
    }

    /// Builder: force hyperlinks on or off.
    pub fn with_hyperlinks(mut self, hyperlinks: bool) -> Self {
        self.hyperlinks = hyperlinks;
        self
    }

    pub fn scheduled(&self, meeting: &ScheduleMeetingResponse) -> ClientResult<String> {
        if self.format == OutputFormat::Json {
            return to_json(meeting);
        }
        Ok(format!(
            "Meeting scheduled\n  Meet:     {}\n  Calendar: {}\n  Event ID: {}\n  Start:    {}\n  End:      {}",
            self.link(&meeting.meet_url),
            self.link(&meeting.calendar_event),
            meeting.event_id,
            meeting.start_time,
            meeting.end_time,
        ))
    }

    pub fn instant(&self, meeting: &InstantMeetResponse) -> ClientResult<String> {
        if self.format == OutputFormat::Json {
            return to_json(meeting);
        }
        let url = meeting.meet_url.as_deref().unwrap_or_default();
        Ok(format!("Instant meeting ready\n  Meet:     {}", self.link(url)))
    }

    pub fn status(&self, report: &StatusReport) -> ClientResult<String> {
        if self.format == OutputFormat::Json {
            return to_json(report);
        }
        let mut out = format!(
            "Server:  {} (v{})\nAuth:    {}",
            report.server, report.version, report.auth
        );
        if let Some(hint) = report.hint() {
            out.push_str(&format!("\n  {hint}"));
        }
        Ok(out)
    }

    fn link(&self, url: &str) -> String {
        if self.hyperlinks {
            hyperlink(url, url)
        } else {
            url.to_string()
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> ClientResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::InvalidResponse(format!("cannot encode output: {e}")))
}

/// Creates an OSC8 hyperlink for terminal output.
pub fn hyperlink(url: &str, label: &str) -> String {
    format!("\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\", url, label)
}

//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// quickmeet - Google Meet links from the terminal
#[derive(Debug, Parser)]
#[command(name = "quickmeet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "QUICKMEET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Base URL of the quickmeet server (overrides config.toml)
    #[arg(long, global = true, env = "QUICKMEET_SERVER_URL")]
    pub server_url: Option<String>,

    /// Request timeout in seconds (overrides config.toml)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Schedule a meeting with a calendar event and a Meet link
    Schedule(ScheduleArgs),

    /// Create a Meet link right now, without a calendar event
    Instant(OutputArgs),

    /// Authorize quickmeet against your Google account
    Auth {
        /// Re-authorize even if a credential is already stored
        #[arg(long, short, conflicts_with = "revoke")]
        force: bool,

        /// Delete the stored credential instead of authorizing
        #[arg(long)]
        revoke: bool,
    },

    /// Show whether the server is up and authorized
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Run the HTTP server in the foreground
    Server {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(long, short)]
        port: Option<u16>,

        /// Log as JSON lines
        #[arg(long)]
        log_json: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments of `quickmeet schedule`.
#[derive(Debug, Clone, Args)]
pub struct ScheduleArgs {
    /// Event title
    #[arg(long, short)]
    pub title: String,

    /// Start time, ISO-8601 (e.g. 2025-06-15T14:00:00)
    #[arg(long, short)]
    pub start: String,

    /// End time, ISO-8601
    #[arg(long, short)]
    pub end: String,

    /// IANA timezone of naive times (default UTC)
    #[arg(long, short = 'z')]
    pub timezone: Option<String>,

    /// Attendee email (can be repeated)
    #[arg(long = "attendee", short, action = clap::ArgAction::Append)]
    pub attendees: Vec<String>,

    /// Event description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Do not email invitations to attendees
    #[arg(long)]
    pub no_invites: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Output and action flags shared by meeting-creating commands.
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Copy the Meet URL to the clipboard
    #[arg(long)]
    pub copy: bool,

    /// Open the Meet URL in the default browser
    #[arg(long)]
    pub open: bool,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

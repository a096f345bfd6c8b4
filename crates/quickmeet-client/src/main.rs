//! quickmeet CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use quickmeet_core::{TracingConfig, init_tracing};
use tracing::debug;

use quickmeet_client::ApiClient;
use quickmeet_client::cli::{Cli, Command, ConfigAction};
use quickmeet_client::commands;
use quickmeet_client::config::ClientConfig;
use quickmeet_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let tracing_config = match (&cli.command, cli.debug) {
        (_, true) => TracingConfig::cli_debug(),
        (Command::Server { log_json, .. }, false) => TracingConfig::server().with_json(*log_json),
        _ => TracingConfig::cli(),
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }
    match dotenv {
        Ok(path) => debug!("loaded environment from {}", path.display()),
        Err(e) => debug!("no .env file loaded: {}", e),
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            if let Some(details) = e.details() {
                eprintln!("details: {}", details);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let mut config = ClientConfig::resolve(cli.config.as_deref())?;
    if let Some(url) = cli.server_url {
        config.server.url = url;
    }
    if let Some(timeout) = cli.timeout {
        config.server.timeout = timeout;
    }

    match cli.command {
        Command::Schedule(args) => commands::schedule::run(&args, &api_client(&config)?).await,
        Command::Instant(output) => commands::instant::run(&output, &api_client(&config)?).await,
        Command::Auth { revoke: true, .. } => commands::auth::revoke(&config).await,
        Command::Auth { force, .. } => commands::auth::google(force, &config).await,
        Command::Status { json } => commands::status::run(json, &api_client(&config)?).await,
        Command::Server { host, port, .. } => commands::server::run(&config, host, port).await,
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}

fn api_client(config: &ClientConfig) -> ClientResult<ApiClient> {
    let url = config.server_url()?;
    if config.server.timeout == 0 {
        return Err(ClientError::Config("server timeout must be positive".into()));
    }
    ApiClient::new(url.as_str(), config.timeout())
}

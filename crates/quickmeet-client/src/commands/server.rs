//! Server command: runs the HTTP server in the foreground.

use quickmeet_server::ServerConfig;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Builds the server configuration.
///
/// Precedence, highest first: `--host`/`--port`, environment variables,
/// `config.toml`, defaults. Without `PORT`, the port of `[server] url`
/// is used when it names a local address.
pub fn server_config<F>(
    config: &ClientConfig,
    host: Option<String>,
    port: Option<u16>,
    lookup: F,
) -> ClientResult<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut server = ServerConfig::from_lookup(&lookup)?;
    let unset = |key: &str| lookup(key).is_none_or(|value| value.trim().is_empty());

    if unset("PORT")
        && let Ok(url) = Url::parse(&config.server.url)
        && matches!(url.host_str(), Some("localhost" | "127.0.0.1"))
        && let Some(port) = url.port_or_known_default()
    {
        server = server.with_port(port);
    }
    if unset("QUICKMEET_CREDENTIALS_PATH")
        && let Some(path) = &config.google.credentials_path
    {
        server = server.with_credentials_path(path);
    }
    if unset("QUICKMEET_TOKEN_PATH")
        && let Some(path) = &config.google.token_path
    {
        server = server.with_token_path(path);
    }
    if unset("QUICKMEET_CALENDAR_ID")
        && let Some(id) = &config.google.calendar_id
    {
        server = server.with_calendar_id(id);
    }
    if unset("QUICKMEET_TIMEOUT_SECS") {
        server = server.with_timeout(config.timeout());
    }

    if let Some(host) = host {
        server = server.with_host(host);
    }
    if let Some(port) = port {
        server = server.with_port(port);
    }
    Ok(server)
}

/// Starts the server and blocks until SIGINT or SIGTERM.
pub async fn run(config: &ClientConfig, host: Option<String>, port: Option<u16>) -> ClientResult<()> {
    let server = server_config(config, host, port, |key| std::env::var(key).ok())?;
    quickmeet_server::serve(server).await?;
    Ok(())
}

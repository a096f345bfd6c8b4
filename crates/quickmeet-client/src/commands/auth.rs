//! Authorization commands.

use quickmeet_core::AuthState;
use quickmeet_providers::google::GoogleMeetProvider;
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Runs the interactive Google consent flow.
///
/// A browser is opened on the consent page and a loopback listener waits
/// for the redirect. The refresh token lands in the token file the server
/// reads, so a running server picks it up on its next request.
pub async fn google(force: bool, config: &ClientConfig) -> ClientResult<()> {
    let google_config = config.google_config();
    let token_path = google_config.token_path.clone();
    let provider = GoogleMeetProvider::new(google_config)?;
    let authorizer = provider.authorizer();

    if !force && authorizer.state().await == AuthState::Authorized {
        println!("Already authorized ({}).", token_path.display());
        println!("Use --force to re-authorize.");
        return Ok(());
    }

    println!("Starting Google authorization...");
    println!();
    println!("A browser window will open for you to grant access.");
    println!("If the browser doesn't open, check the terminal for a URL to copy.");
    println!();

    authorizer.authorize_interactive().await?;

    info!(path = %token_path.display(), "Google authorization successful");
    println!();
    println!("Authorization successful!");
    println!("Your refresh token has been saved to {}.", token_path.display());

    Ok(())
}

/// Deletes the stored credential so the server falls back to consent.
pub async fn revoke(config: &ClientConfig) -> ClientResult<()> {
    let google_config = config.google_config();
    let token_path = google_config.token_path.clone();
    let provider = GoogleMeetProvider::new(google_config)?;

    provider.authorizer().revoke_local().await?;

    warn!(path = %token_path.display(), "stored credential removed");
    println!("Removed {}.", token_path.display());
    println!("Google may still list quickmeet under your account's third-party access.");
    Ok(())
}

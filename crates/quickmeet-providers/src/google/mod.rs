//! Google Calendar/Meet provider implementation.
//!
//! This module provides a [`GoogleMeetProvider`] that creates calendar events
//! with Meet conferences through the Calendar API v3 and standalone spaces
//! through the Meet API v2.
//!
//! # Authentication Flow
//!
//! 1. The operator downloads an OAuth client-secret file (`credentials.json`)
//! 2. A request arrives without a stored credential; the provider opens a
//!    consent flow and answers with the consent URL
//! 3. The user grants permissions in the browser
//! 4. Google redirects to `/oauth2callback` with the authorization code
//! 5. The code is exchanged for tokens and the refresh token is persisted
//!    to `token.json`
//! 6. Later requests refresh short-lived access tokens silently
//!
//! The CLI can run steps 3-5 through a loopback listener instead
//! (`quickmeet auth`).
//!
//! # Example
//!
//! ```ignore
//! use quickmeet_providers::google::{GoogleConfig, GoogleMeetProvider};
//! use quickmeet_providers::MeetingProvider;
//!
//! let config = GoogleConfig::new()
//!     .with_credentials_path("credentials.json")
//!     .with_token_path("token.json");
//!
//! let provider = GoogleMeetProvider::new(config)?;
//! let meeting = provider.instant_meet().await?;
//! println!("{}", meeting.meet_url);
//! ```

mod auth;
mod client;
mod config;
mod oauth;
mod payload;
mod provider;
mod tokens;

pub use auth::Authorizer;
pub use client::{ApiEvent, ApiSpace, GoogleApiClient, build_http_client};
pub use config::{GoogleConfig, GoogleEndpoints, OAuthCredentials};
pub use oauth::{
    CALLBACK_PATH, CallbackParams, FAILURE_PAGE, OAuthClient, PkceFlow, SUCCESS_PAGE, TokenGrant,
};
pub use payload::{EventPayload, REQUEST_ID_LENGTH, generate_request_id};
pub use provider::{GoogleMeetProvider, PROVIDER_NAME};
pub use tokens::{
    AUTHORIZED_USER, AccessToken, CredentialStore, FileCredentialStore, MemoryCredentialStore,
    StoredCredential,
};

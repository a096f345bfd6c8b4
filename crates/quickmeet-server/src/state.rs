//! Shared handler state.

use std::sync::Arc;

use quickmeet_providers::MeetingProvider;

/// State shared by every handler.
pub struct AppState {
    /// The meeting backend.
    pub provider: Arc<dyn MeetingProvider>,
    /// Redirect URI handed to the vendor when consent starts.
    pub redirect_uri: String,
}

impl AppState {
    pub fn new(provider: Arc<dyn MeetingProvider>, redirect_uri: impl Into<String>) -> Self {
        Self {
            provider,
            redirect_uri: redirect_uri.into(),
        }
    }
}

pub type SharedState = Arc<AppState>;

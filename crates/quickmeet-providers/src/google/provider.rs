//! Google Calendar/Meet provider implementation.
//!
//! This module implements the [`MeetingProvider`] trait on top of the
//! Calendar API (scheduled meetings) and the Meet API (instant meetings).

use std::sync::Arc;

use quickmeet_core::{AuthState, InstantMeeting, MeetingResult, ScheduleRequest};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::provider::{BoxFuture, MeetingProvider};

use super::auth::Authorizer;
use super::client::{GoogleApiClient, build_http_client};
use super::config::GoogleConfig;
use super::oauth::OAuthClient;
use super::payload::{EventPayload, generate_request_id};
use super::tokens::{CredentialStore, FileCredentialStore};

/// Name reported by the Google provider.
pub const PROVIDER_NAME: &str = "google";

/// Google Meet provider.
pub struct GoogleMeetProvider {
    config: GoogleConfig,
    authorizer: Authorizer,
    api: GoogleApiClient,
}

impl std::fmt::Debug for GoogleMeetProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMeetProvider")
            .field("calendar_id", &self.config.calendar_id)
            .field("authorizer", &self.authorizer)
            .finish_non_exhaustive()
    }
}

impl GoogleMeetProvider {
    /// Creates a provider persisting tokens in the configured token file.
    ///
    /// Neither the client-secret file nor the token file is read here; both
    /// are read on demand so they can be created while the server runs.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        let store = Arc::new(FileCredentialStore::new(&config.token_path));
        Self::with_store(config, store)
    }

    /// Creates a provider with a custom credential store.
    pub fn with_store(
        config: GoogleConfig,
        store: Arc<dyn CredentialStore>,
    ) -> ProviderResult<Self> {
        config.validate()?;

        let http_client = build_http_client(&config)?;
        let oauth = OAuthClient::new(
            http_client.clone(),
            &config.endpoints.auth_url,
            &config.endpoints.token_url,
        );
        let authorizer = Authorizer::new(&config, oauth, store);
        let api = GoogleApiClient::new(
            http_client,
            &config.endpoints.calendar_api,
            &config.endpoints.meet_api,
        );

        Ok(Self {
            config,
            authorizer,
            api,
        })
    }

    /// Returns the authorizer, for the interactive CLI flow.
    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    async fn schedule(&self, request: ScheduleRequest) -> ProviderResult<MeetingResult> {
        let schedule = request.validate()?;
        let token = self.authorizer.authorize().await?;

        let payload = EventPayload::new(&schedule, generate_request_id());
        let event = match self
            .api
            .insert_event(
                &token.token,
                &self.config.calendar_id,
                &payload,
                schedule.send_updates,
            )
            .await
        {
            Ok(event) => event,
            Err(e) => return Err(self.api_failure(e).await),
        };

        let meet_url = event.join_url().map(String::from).ok_or_else(|| {
            ProviderError::invalid_response("created event has no conference join link")
                .with_provider(PROVIDER_NAME)
        })?;
        let event_id = event.id.clone().ok_or_else(|| {
            ProviderError::invalid_response("created event has no id").with_provider(PROVIDER_NAME)
        })?;
        let calendar_event_url = event.html_link.clone().ok_or_else(|| {
            ProviderError::invalid_response("created event has no htmlLink")
                .with_provider(PROVIDER_NAME)
        })?;

        info!(
            event_id = %event_id,
            attendees = schedule.attendees.len(),
            send_updates = schedule.send_updates.as_str(),
            "scheduled meeting"
        );

        Ok(MeetingResult {
            meet_url,
            calendar_event_url,
            event_id,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
        })
    }

    async fn instant(&self) -> ProviderResult<InstantMeeting> {
        let token = self.authorizer.authorize().await?;

        let space = match self.api.create_space(&token.token).await {
            Ok(space) => space,
            Err(e) => return Err(self.api_failure(e).await),
        };

        let meet_url = space
            .meeting_uri
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                ProviderError::invalid_response("created space has no meeting URI")
                    .with_provider(PROVIDER_NAME)
            })?;

        info!(space = space.name.as_deref().unwrap_or(""), "created instant meeting");

        Ok(InstantMeeting {
            meet_url,
            meeting_code: space.meeting_code,
            space_name: space.name,
        })
    }

    /// Logs a failed vendor call. A refused access token is dropped so the
    /// next call refreshes it.
    async fn api_failure(&self, error: ProviderError) -> ProviderError {
        warn!(code = %error.code(), error = %error.message(), "vendor call failed");
        if error.code() == ProviderErrorCode::AuthorizationFailed {
            debug!("dropping access token after authorization failure");
            self.authorizer.invalidate_access_token().await;
        }
        error.with_provider(PROVIDER_NAME)
    }
}

impl MeetingProvider for GoogleMeetProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn schedule_meeting(
        &self,
        request: ScheduleRequest,
    ) -> BoxFuture<'_, ProviderResult<MeetingResult>> {
        Box::pin(self.schedule(request))
    }

    fn instant_meet(&self) -> BoxFuture<'_, ProviderResult<InstantMeeting>> {
        Box::pin(self.instant())
    }

    fn auth_state(&self) -> BoxFuture<'_, AuthState> {
        Box::pin(self.authorizer.state())
    }

    fn begin_consent(&self, redirect_uri: String) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move { self.authorizer.begin_consent(&redirect_uri).await })
    }

    fn complete_consent(
        &self,
        code: String,
        state: String,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move { self.authorizer.complete_consent(&code, &state).await })
    }
}

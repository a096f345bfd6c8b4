//! Test utilities for router tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, to_bytes};
use quickmeet_core::{AuthState, InstantMeeting, MeetingResult, ScheduleRequest};
use quickmeet_providers::{BoxFuture, MeetingProvider, ProviderError, ProviderResult};
use quickmeet_server::{AppState, app};
use serde_json::Value;

pub const REDIRECT_URI: &str = "http://localhost:5000/oauth2callback";
pub const CONSENT_STATE: &str = "state-123";

/// In-memory provider that records calls.
#[derive(Default)]
pub struct FakeProvider {
    pub schedule_calls: AtomicUsize,
    pub instant_calls: AtomicUsize,
    pub last_request: Mutex<Option<ScheduleRequest>>,
    pub failure: Option<ProviderError>,
    pub auth: Mutex<AuthState>,
    pub redirect_uri: Mutex<Option<String>>,
}

impl FakeProvider {
    pub fn failing(err: ProviderError) -> Self {
        Self {
            failure: Some(err),
            ..Default::default()
        }
    }

    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }

    pub fn instant_calls(&self) -> usize {
        self.instant_calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> ProviderResult<()> {
        match &self.failure {
            Some(err) => Err(err.detached()),
            None => Ok(()),
        }
    }
}

impl MeetingProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn schedule_meeting(
        &self,
        request: ScheduleRequest,
    ) -> BoxFuture<'_, ProviderResult<MeetingResult>> {
        Box::pin(async move {
            self.schedule_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            let schedule = request.validate()?;
            self.fail()?;
            Ok(MeetingResult {
                meet_url: "https://meet.google.com/abc-defg-hij".to_string(),
                calendar_event_url: "https://www.google.com/calendar/event?eid=ZXZ0MQ".to_string(),
                event_id: "evt1".to_string(),
                start_time: schedule.start_time,
                end_time: schedule.end_time,
            })
        })
    }

    fn instant_meet(&self) -> BoxFuture<'_, ProviderResult<InstantMeeting>> {
        Box::pin(async move {
            self.instant_calls.fetch_add(1, Ordering::SeqCst);
            self.fail()?;
            Ok(InstantMeeting {
                meet_url: "https://meet.google.com/xyz-abcd-efg".to_string(),
                meeting_code: Some("xyz-abcd-efg".to_string()),
                space_name: Some("spaces/s1".to_string()),
            })
        })
    }

    fn auth_state(&self) -> BoxFuture<'_, AuthState> {
        Box::pin(async move { *self.auth.lock().unwrap() })
    }

    fn begin_consent(&self, redirect_uri: String) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(async move {
            self.fail()?;
            let url = format!(
                "https://accounts.example.com/auth?redirect_uri={}&state={}",
                redirect_uri, CONSENT_STATE
            );
            *self.redirect_uri.lock().unwrap() = Some(redirect_uri);
            *self.auth.lock().unwrap() = AuthState::PendingConsent;
            Ok(url)
        })
    }

    fn complete_consent(&self, code: String, state: String) -> BoxFuture<'_, ProviderResult<()>> {
        Box::pin(async move {
            let mut auth = self.auth.lock().unwrap();
            if *auth != AuthState::PendingConsent {
                return Err(ProviderError::authentication("no consent flow is in progress"));
            }
            if state != CONSENT_STATE || code.is_empty() {
                return Err(ProviderError::authentication("OAuth state mismatch"));
            }
            *auth = AuthState::Authorized;
            Ok(())
        })
    }
}

/// Builds the router around `provider`.
pub fn test_app(provider: Arc<FakeProvider>) -> Router {
    app(Arc::new(AppState::new(provider, REDIRECT_URI)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}

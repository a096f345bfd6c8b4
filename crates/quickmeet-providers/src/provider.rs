//! MeetingProvider trait definition.
//!
//! This module defines the [`MeetingProvider`] trait, the seam between the
//! HTTP layer and a conferencing vendor. Providers are responsible for:
//! - Creating calendar events with an attached conferencing space
//! - Creating standalone conferencing spaces
//! - Driving the vendor consent flow

use std::future::Future;
use std::pin::Pin;

use quickmeet_core::{AuthState, InstantMeeting, MeetingResult, ScheduleRequest};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so that the server can hold an
/// `Arc<dyn MeetingProvider>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core abstraction for meeting providers.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync`; one instance serves every request
/// - `schedule_meeting` validates its input before any vendor call
/// - No method may wait for user interaction; consent is completed through
///   [`MeetingProvider::complete_consent`]
pub trait MeetingProvider: Send + Sync {
    /// Returns the name of this provider (e.g., "google").
    fn name(&self) -> &str;

    /// Creates a calendar event with a conferencing space attached.
    ///
    /// # Errors
    ///
    /// Validation errors for bad input, authentication errors when no usable
    /// credential exists, upstream errors when the vendor fails.
    fn schedule_meeting(
        &self,
        request: ScheduleRequest,
    ) -> BoxFuture<'_, ProviderResult<MeetingResult>>;

    /// Creates a standalone conferencing space.
    fn instant_meet(&self) -> BoxFuture<'_, ProviderResult<InstantMeeting>>;

    /// Returns where the consent lifecycle stands.
    fn auth_state(&self) -> BoxFuture<'_, AuthState>;

    /// Starts (or restarts) a consent flow and returns the URL the user must
    /// visit.
    fn begin_consent(&self, redirect_uri: String) -> BoxFuture<'_, ProviderResult<String>>;

    /// Completes a consent flow with the code and state from the vendor's
    /// redirect.
    fn complete_consent(
        &self,
        code: String,
        state: String,
    ) -> BoxFuture<'_, ProviderResult<()>>;
}

/// A provider that always returns an error.
///
/// Used as a placeholder when the real provider fails to initialize, so
/// the server still starts and reports the problem on every call.
#[derive(Debug)]
pub struct ErrorProvider {
    name: String,
    error: ProviderError,
}

impl ErrorProvider {
    /// Creates a new error provider.
    pub fn new(name: impl Into<String>, error: ProviderError) -> Self {
        Self {
            name: name.into(),
            error,
        }
    }

    fn error(&self) -> ProviderError {
        self.error.detached().with_provider(&self.name)
    }
}

impl MeetingProvider for ErrorProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule_meeting(
        &self,
        _request: ScheduleRequest,
    ) -> BoxFuture<'_, ProviderResult<MeetingResult>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn instant_meet(&self) -> BoxFuture<'_, ProviderResult<InstantMeeting>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn auth_state(&self) -> BoxFuture<'_, AuthState> {
        Box::pin(async { AuthState::Absent })
    }

    fn begin_consent(&self, _redirect_uri: String) -> BoxFuture<'_, ProviderResult<String>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }

    fn complete_consent(
        &self,
        _code: String,
        _state: String,
    ) -> BoxFuture<'_, ProviderResult<()>> {
        let error = self.error();
        Box::pin(async move { Err(error) })
    }
}

//! MeetingProvider trait and implementations.
//!
//! This crate provides the abstraction layer for conferencing vendors:
//!
//! - [`MeetingProvider`] - The core trait that all meeting backends implement
//! - [`google`] - Google Calendar/Meet implementation with its credential
//!   store and consent flow
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//!   HTTP handlers / CLI
//!          │
//!          ▼  Arc<dyn MeetingProvider>
//! ┌──────────────────────┐
//! │  GoogleMeetProvider  │
//! └───┬─────────────┬────┘
//!     │             │
//!     ▼             ▼
//! ┌──────────┐  ┌────────────────┐
//! │Authorizer│  │GoogleApiClient │──▶ Calendar API / Meet API
//! └───┬──────┘  └────────────────┘
//!     │
//!     ├──▶ CredentialStore (token.json)
//!     └──▶ OAuthClient ──▶ token endpoint
//! ```

pub mod error;
pub mod google;
pub mod provider;

// Re-export main types at crate root
pub use error::{ErrorCategory, ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{BoxFuture, ErrorProvider, MeetingProvider};

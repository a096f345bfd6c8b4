//! Credential lifecycle for the Google provider.
//!
//! The [`Authorizer`] owns three pieces of state:
//!
//! - the persisted [`StoredCredential`], read through a [`CredentialStore`]
//! - the in-memory access token, keyed by the refresh token it came from
//! - the consent flow, which moves `absent → pending → authorized`
//!
//! Request handlers only ever call [`Authorizer::authorize`], which never
//! waits for the user. When no credential exists it opens a consent flow and
//! fails with the URL to visit; the flow is completed later by the
//! `/oauth2callback` route through [`Authorizer::complete_consent`].

use std::sync::Arc;

use quickmeet_core::AuthState;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};

use super::config::{GoogleConfig, OAuthCredentials};
use super::oauth::{OAuthClient, PkceFlow, TokenGrant};
use super::tokens::{AccessToken, CredentialStore, StoredCredential};

#[derive(Debug)]
enum ConsentState {
    /// No flow in progress.
    Idle,
    /// A consent URL was handed out.
    Pending {
        flow: PkceFlow,
        redirect_uri: String,
        auth_url: String,
    },
    /// The token endpoint rejected this refresh token.
    Rejected { refresh_token: String },
}

#[derive(Debug, Clone)]
struct CachedToken {
    refresh_token: String,
    token: AccessToken,
}

/// Obtains access tokens and drives the consent flow.
pub struct Authorizer {
    oauth: OAuthClient,
    store: Arc<dyn CredentialStore>,
    credentials_path: std::path::PathBuf,
    scopes: Vec<String>,
    loopback_port_range: (u16, u16),
    redirect_uri: Option<String>,
    consent: RwLock<ConsentState>,
    cached: RwLock<Option<CachedToken>>,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("credentials_path", &self.credentials_path)
            .field("scopes", &self.scopes)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

impl Authorizer {
    /// Creates an authorizer reading client credentials from the file named
    /// by `config` and persisting tokens in `store`.
    pub fn new(config: &GoogleConfig, oauth: OAuthClient, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            oauth,
            store,
            credentials_path: config.credentials_path.clone(),
            scopes: config.scopes.clone(),
            loopback_port_range: config.loopback_port_range,
            redirect_uri: config.redirect_uri.clone(),
            consent: RwLock::new(ConsentState::Idle),
            cached: RwLock::new(None),
        }
    }

    /// Returns a usable access token.
    ///
    /// Uses the cached token while it is fresh and refreshes it otherwise.
    /// Without a stored credential this starts a consent flow (when a
    /// redirect URI is configured) and fails with an authentication error
    /// naming the consent URL.
    pub async fn authorize(&self) -> ProviderResult<AccessToken> {
        let Some(stored) = self.usable_credential().await else {
            return Err(self.consent_required().await);
        };

        if let Some(cached) = self.cached.read().await.as_ref()
            && cached.refresh_token == stored.refresh_token
            && !cached.token.is_expired()
        {
            return Ok(cached.token.clone());
        }

        let credentials = OAuthCredentials::new(&stored.client_id, &stored.client_secret);
        match self.oauth.refresh(&credentials, &stored.refresh_token).await {
            Ok(grant) => {
                let token = grant.access_token.clone();
                *self.cached.write().await = Some(CachedToken {
                    refresh_token: stored.refresh_token,
                    token: grant.access_token,
                });
                Ok(token)
            }
            Err(e) if e.code() == ProviderErrorCode::AuthenticationFailed => {
                warn!(error = %e, "stored refresh token was rejected");
                *self.cached.write().await = None;
                *self.consent.write().await = ConsentState::Rejected {
                    refresh_token: stored.refresh_token,
                };
                Err(ProviderError::authentication(
                    "stored credential was rejected; authorization is required again",
                )
                .with_source(e))
            }
            Err(e) => Err(e),
        }
    }

    /// Starts a consent flow and returns the URL the user must visit.
    ///
    /// Any earlier pending flow is replaced.
    pub async fn begin_consent(&self, redirect_uri: &str) -> ProviderResult<String> {
        let credentials = self.client_credentials()?;
        let flow = PkceFlow::new();
        let auth_url = self
            .oauth
            .auth_url(&flow, &credentials.client_id, redirect_uri, &self.scopes);

        info!(redirect_uri, "consent flow started");
        *self.consent.write().await = ConsentState::Pending {
            flow,
            redirect_uri: redirect_uri.to_string(),
            auth_url: auth_url.clone(),
        };
        Ok(auth_url)
    }

    /// Completes the pending consent flow with the vendor's redirect.
    ///
    /// A mismatched `state` is rejected and leaves the flow pending.
    pub async fn complete_consent(&self, code: &str, state: &str) -> ProviderResult<()> {
        let (verifier, redirect_uri) = match &*self.consent.read().await {
            ConsentState::Pending {
                flow, redirect_uri, ..
            } => {
                if flow.state != state {
                    warn!("consent callback with mismatched state");
                    return Err(ProviderError::authentication(
                        "OAuth state mismatch - possible CSRF attack",
                    ));
                }
                (flow.verifier.clone(), redirect_uri.clone())
            }
            _ => {
                return Err(ProviderError::authentication(
                    "no consent flow is in progress",
                ));
            }
        };

        let credentials = self.client_credentials()?;
        let grant = self
            .oauth
            .exchange_code(&credentials, code, &verifier, &redirect_uri)
            .await?;
        self.persist(&credentials, grant).await?;

        *self.consent.write().await = ConsentState::Idle;
        info!("consent completed");
        Ok(())
    }

    /// Runs the interactive loopback flow: opens a browser and blocks until
    /// the user answers. Meant for the command line only.
    pub async fn authorize_interactive(&self) -> ProviderResult<()> {
        let credentials = self.client_credentials()?;
        let grant = self
            .oauth
            .authorize_loopback(&credentials, &self.scopes, self.loopback_port_range)
            .await?;
        self.persist(&credentials, grant).await?;
        *self.consent.write().await = ConsentState::Idle;
        Ok(())
    }

    /// Returns where the consent lifecycle stands.
    pub async fn state(&self) -> AuthState {
        if matches!(&*self.consent.read().await, ConsentState::Pending { .. }) {
            return AuthState::PendingConsent;
        }
        if self.usable_credential().await.is_some() {
            AuthState::Authorized
        } else {
            AuthState::Absent
        }
    }

    /// Drops the cached access token, forcing a refresh on the next call.
    pub async fn invalidate_access_token(&self) {
        if self.cached.write().await.take().is_some() {
            debug!("cached access token dropped");
        }
    }

    /// Removes the stored credential and any cached token.
    pub async fn revoke_local(&self) -> ProviderResult<()> {
        *self.cached.write().await = None;
        *self.consent.write().await = ConsentState::Idle;
        self.store.clear()
    }

    /// Returns the stored credential unless its refresh token was rejected.
    async fn usable_credential(&self) -> Option<StoredCredential> {
        let stored = self.store.load()?;
        match &*self.consent.read().await {
            ConsentState::Rejected { refresh_token } if *refresh_token == stored.refresh_token => {
                None
            }
            _ => Some(stored),
        }
    }

    /// Builds the error for a request that arrived without a credential,
    /// opening a consent flow when possible.
    async fn consent_required(&self) -> ProviderError {
        if let ConsentState::Pending { auth_url, .. } = &*self.consent.read().await {
            return ProviderError::authentication(format!(
                "authorization required: visit {}",
                auth_url
            ));
        }

        let Some(redirect_uri) = self.redirect_uri.clone() else {
            return ProviderError::authentication(
                "no stored credential; run `quickmeet auth` to authorize",
            );
        };

        match self.begin_consent(&redirect_uri).await {
            Ok(url) => ProviderError::authentication(format!(
                "authorization required: visit {}",
                url
            )),
            Err(e) => e,
        }
    }

    async fn persist(&self, credentials: &OAuthCredentials, grant: TokenGrant) -> ProviderResult<()> {
        let refresh_token = grant.refresh_token.ok_or_else(|| {
            ProviderError::authentication(
                "token endpoint returned no refresh token; revoke the app's access and authorize again",
            )
        })?;

        let stored = StoredCredential::authorized_user(
            &credentials.client_id,
            &credentials.client_secret,
            &refresh_token,
        );
        self.store.save(&stored)?;

        *self.cached.write().await = Some(CachedToken {
            refresh_token,
            token: grant.access_token,
        });
        Ok(())
    }

    fn client_credentials(&self) -> ProviderResult<OAuthCredentials> {
        OAuthCredentials::from_file(&self.credentials_path)
    }
}

//! Credential persistence and access-token bookkeeping.
//!
//! The long-lived part of an authorization (client id, client secret and
//! refresh token) is a [`StoredCredential`], persisted through a
//! [`CredentialStore`]. The short-lived access token lives only in memory
//! as an [`AccessToken`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

/// Value of the `type` field of a persisted credential.
pub const AUTHORIZED_USER: &str = "authorized_user";

/// Access tokens are considered expired this long before their real expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A persisted authorization.
///
/// Serialized as `{type, client_id, client_secret, refresh_token}`, the
/// layout Google's client libraries use for authorized-user files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    /// Always `authorized_user`.
    #[serde(rename = "type")]
    pub kind: String,
    /// OAuth client id the refresh token was issued to.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

impl StoredCredential {
    /// Creates an authorized-user credential.
    pub fn authorized_user(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            kind: AUTHORIZED_USER.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    fn is_usable(&self) -> bool {
        self.kind == AUTHORIZED_USER && !self.refresh_token.is_empty()
    }
}

/// A short-lived bearer token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The bearer token for API requests.
    pub token: String,
    /// When the token stops being usable, margin included.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Creates an access token from a token-endpoint response.
    pub fn new(token: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        let expires_at = expires_in_secs
            .map(|secs| Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS));
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Returns true if the token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            None => false,
        }
    }
}

/// Where the stored credential lives.
pub trait CredentialStore: Send + Sync {
    /// Reads the stored credential.
    ///
    /// A missing, unreadable or corrupt credential yields `None`; failures
    /// are logged, never returned.
    fn load(&self) -> Option<StoredCredential>;

    /// Writes or overwrites the stored credential.
    fn save(&self, credential: &StoredCredential) -> ProviderResult<()>;

    /// Removes the stored credential.
    fn clear(&self) -> ProviderResult<()>;
}

/// JSON file credential store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<StoredCredential> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no token file");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read token file");
                return None;
            }
        };

        match serde_json::from_str::<StoredCredential>(&content) {
            Ok(credential) if credential.is_usable() => {
                debug!(path = %self.path.display(), "loaded stored credential");
                Some(credential)
            }
            Ok(credential) => {
                warn!(
                    path = %self.path.display(),
                    kind = %credential.kind,
                    "ignoring token file without a usable refresh token"
                );
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to parse token file");
                None
            }
        }
    }

    fn save(&self, credential: &StoredCredential) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::configuration(format!("failed to create token directory: {}", e))
                    .with_source(e)
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(credential).map_err(|e| {
            ProviderError::internal(format!("failed to serialize credential: {}", e))
        })?;

        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::configuration(format!("failed to write token file: {}", e))
                .with_source(e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(&temp_path, perms) {
                warn!(error = %e, "failed to restrict token file permissions");
            }
        }

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::configuration(format!("failed to rename token file: {}", e))
                .with_source(e)
        })?;

        info!(path = %self.path.display(), "saved credential");
        Ok(())
    }

    fn clear(&self) -> ProviderResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "cleared stored credential");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProviderError::configuration(format!(
                "failed to remove token file: {}",
                e
            ))
            .with_source(e)),
        }
    }
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<StoredCredential>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `credential`.
    pub fn with_credential(credential: StoredCredential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<StoredCredential> {
        self.credential
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, credential: &StoredCredential) -> ProviderResult<()> {
        *self.credential.lock().unwrap_or_else(PoisonError::into_inner) = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> ProviderResult<()> {
        *self.credential.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> StoredCredential {
        StoredCredential::authorized_user(
            "id.apps.googleusercontent.com",
            "secret",
            "1//refresh",
        )
    }

    mod access_token {
        use super::*;

        #[test]
        fn fresh_token_is_valid() {
            let token = AccessToken::new("ya29.x", Some(3600));
            assert!(!token.is_expired());
        }

        #[test]
        fn margin_applies() {
            let token = AccessToken::new("ya29.x", Some(30));
            assert!(token.is_expired());
        }

        #[test]
        fn no_expiry_never_expires() {
            assert!(!AccessToken::new("ya29.x", None).is_expired());
        }
    }

    mod file_store {
        use super::*;

        #[test]
        fn save_and_load() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("token.json");
            let store = FileCredentialStore::new(&path);

            store.save(&credential()).unwrap();
            assert!(path.exists());
            assert!(!path.with_extension("json.tmp").exists());

            let json: serde_json::Value =
                serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
            assert_eq!(json["type"], "authorized_user");
            assert_eq!(json["refresh_token"], "1//refresh");

            let reopened = FileCredentialStore::new(&path);
            assert_eq!(reopened.load(), Some(credential()));
        }

        #[cfg(unix)]
        #[test]
        fn saved_file_is_private() {
            use std::os::unix::fs::PermissionsExt;

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("token.json");
            FileCredentialStore::new(&path).save(&credential()).unwrap();
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        #[test]
        fn creates_parent_directories() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("token.json");
            FileCredentialStore::new(&path).save(&credential()).unwrap();
            assert!(path.exists());
        }

        #[test]
        fn missing_file_is_none() {
            let dir = tempfile::tempdir().unwrap();
            let store = FileCredentialStore::new(dir.path().join("token.json"));
            assert!(store.load().is_none());
            assert!(store.clear().is_ok());
        }

        #[test]
        fn corrupt_file_is_none() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("token.json");
            fs::write(&path, "{not json").unwrap();
            assert!(FileCredentialStore::new(&path).load().is_none());
        }

        #[test]
        fn wrong_type_is_none() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("token.json");
            fs::write(
                &path,
                r#"{"type":"service_account","client_id":"a","client_secret":"b","refresh_token":"c"}"#,
            )
            .unwrap();
            assert!(FileCredentialStore::new(&path).load().is_none());
        }

        #[test]
        fn clear_removes_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("token.json");
            let store = FileCredentialStore::new(&path);
            store.save(&credential()).unwrap();
            store.clear().unwrap();
            assert!(!path.exists());
            assert!(store.load().is_none());
        }
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().is_none());
        store.save(&credential()).unwrap();
        assert_eq!(store.load(), Some(credential()));
        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}

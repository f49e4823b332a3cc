use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::identity::{AuthOutcome, Provider};

/// Storage abstraction for signed-in sessions.
///
/// The sign-in flows never touch a store; callers persist what
/// [`crate::auth::AuthService::authenticate`] returns.
pub trait SessionStore: Send + Sync {
    fn load(&self, provider: Provider) -> Result<Option<StoredSession>, AuthError>;
    fn save(&self, outcome: &AuthOutcome) -> Result<StoredSession, AuthError>;
    fn clear(&self, provider: Provider) -> Result<(), AuthError>;
}

/// A persisted sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub saved_at: DateTime<Utc>,
    pub outcome: AuthOutcome,
}

/// Configuration for file-backed session storage.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    pub base_dir: PathBuf,
}

impl SessionStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        crate::config::studio_auth_dir()
    }
}

/// File-backed session store: one TOML file per provider.
///
/// # Example
/// ```no_run
/// use studio_auth::auth::{FileSessionStore, Provider, SessionStore};
///
/// let store = FileSessionStore::new_default();
/// if let Some(session) = store.load(Provider::Github)? {
///     println!("signed in as {}", session.outcome.identity.display_name);
/// }
/// # Ok::<(), studio_auth::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    base_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(config: SessionStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: SessionStoreConfig::default_dir(),
        }
    }

    fn session_path(&self, provider: Provider) -> PathBuf {
        self.base_dir.join(format!("session.{provider}.toml"))
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, provider: Provider) -> Result<Option<StoredSession>, AuthError> {
        let path = self.session_path(provider);
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: SessionFile = toml::from_str(&raw)?;
        if file.session.outcome.identity.provider != provider {
            return Err(AuthError::InvalidResponse(format!(
                "session file {} belongs to {}",
                path.display(),
                file.session.outcome.identity.provider
            )));
        }
        Ok(Some(file.session))
    }

    fn save(&self, outcome: &AuthOutcome) -> Result<StoredSession, AuthError> {
        let path = self.session_path(outcome.identity.provider);
        Self::ensure_parent(&path)?;
        let session = StoredSession {
            saved_at: Utc::now(),
            outcome: outcome.clone(),
        };
        let file = SessionFile {
            version: 1,
            session: session.clone(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        tracing::debug!(provider = %outcome.identity.provider, path = %path.display(), "session saved");
        Ok(session)
    }

    fn clear(&self, provider: Provider) -> Result<(), AuthError> {
        let path = self.session_path(provider);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionFile {
    version: u32,
    session: StoredSession,
}

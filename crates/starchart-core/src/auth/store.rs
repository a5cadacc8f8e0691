use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyring::Entry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Credential, CredentialHandle};
use crate::config::TokenBackendKind;

/// Fixed storage key for the bearer token
pub const TOKEN_KEY: &str = "astro_token";

/// Keyring service name
const SERVICE_NAME: &str = "starchart";

/// Durable storage for a single token string.
pub trait TokenBackend: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, token: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Build the backend selected in the configuration.
pub fn open_backend(kind: TokenBackendKind, cache_dir: &Path) -> Arc<dyn TokenBackend> {
    match kind {
        TokenBackendKind::File => Arc::new(FileTokenBackend::new(cache_dir)),
        TokenBackendKind::Keyring => Arc::new(KeyringTokenBackend::new()),
        TokenBackendKind::Memory => Arc::new(MemoryTokenBackend::new()),
    }
}

// ============================================================================
// File backend
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    stored_at: DateTime<Utc>,
}

/// Token kept as JSON in the cache directory.
pub struct FileTokenBackend {
    path: PathBuf,
}

impl FileTokenBackend {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", TOKEN_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenBackend for FileTokenBackend {
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&self.path).context("Failed to read token file")?;
        let stored: StoredToken =
            serde_json::from_str(&contents).context("Failed to parse token file")?;
        Ok(Some(stored.token))
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredToken {
            token: token.to_string(),
            stored_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).context("Failed to open token file")?;

        // mode() only applies on creation, so tighten an existing file too
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .context("Failed to restrict token file permissions")?;
        }

        file.write_all(contents.as_bytes()).context("Failed to write token file")?;
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove token file")?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

// ============================================================================
// Keyring backend
// ============================================================================

/// Token kept in the OS keychain.
pub struct KeyringTokenBackend {
    service: String,
}

impl KeyringTokenBackend {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.to_string(),
        }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, TOKEN_KEY).context("Failed to create keyring entry")
    }
}

impl Default for KeyringTokenBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBackend for KeyringTokenBackend {
    fn load(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn remove(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }

    fn name(&self) -> &'static str {
        "keyring"
    }
}

// ============================================================================
// Memory backend
// ============================================================================

/// Process-local storage. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryTokenBackend {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryTokenBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(token.into()))),
        }
    }

    /// Current stored value
    pub fn token(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl TokenBackend for MemoryTokenBackend {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.token())
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot.lock() = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// Token store
// ============================================================================

/// Persists the credential and attaches it to the API client.
///
/// `set` and `clear` never fail from the caller's point of view: storage
/// errors are logged and the in-process credential is still updated.
#[derive(Clone)]
pub struct TokenStore {
    backend: Arc<dyn TokenBackend>,
    credential: CredentialHandle,
}

impl TokenStore {
    pub fn new(backend: Arc<dyn TokenBackend>, credential: CredentialHandle) -> Self {
        Self {
            backend,
            credential,
        }
    }

    /// Read the persisted token. Only used at startup.
    pub fn load(&self) -> Option<Credential> {
        match self.backend.load() {
            Ok(Some(token)) if !token.is_empty() => {
                debug!(backend = self.backend.name(), "Stored token found");
                Some(Credential::new(token))
            }
            Ok(_) => {
                debug!(backend = self.backend.name(), "No stored token");
                None
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Failed to load stored token");
                None
            }
        }
    }

    /// Attach an already persisted credential to outgoing requests.
    pub fn attach(&self, credential: Credential) {
        self.credential.replace(Some(credential));
    }

    /// Persist the token and attach it to outgoing requests.
    pub fn set(&self, token: &str) {
        if let Err(e) = self.backend.save(token) {
            warn!(backend = self.backend.name(), error = %e, "Failed to persist token");
        }
        self.credential.replace(Some(Credential::new(token)));
    }

    /// Remove the persisted token and detach it from outgoing requests.
    pub fn clear(&self) {
        if let Err(e) = self.backend.remove() {
            warn!(backend = self.backend.name(), error = %e, "Failed to remove stored token");
        }
        self.credential.replace(None);
    }

    pub fn credential(&self) -> &CredentialHandle {
        &self.credential
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// An opaque bearer token issued by the backend.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Shared slot holding the credential currently attached to outgoing requests.
///
/// Clones share the same slot. Only `TokenStore` writes to it; the API
/// client reads it when building each request.
#[derive(Clone, Default)]
pub struct CredentialHandle {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Credential> {
        self.inner.read().clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }

    pub(crate) fn replace(&self, credential: Option<Credential>) {
        *self.inner.write() = credential;
    }
}

impl fmt::Debug for CredentialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHandle")
            .field("is_set", &self.is_set())
            .finish()
    }
}

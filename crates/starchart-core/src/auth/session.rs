//! Session lifecycle: startup restore, login, registration and logout.
//!
//! A single `SessionController` is built at startup and cloned into every
//! consumer. State changes are published on a `tokio::sync::watch` channel,
//! so any number of subscribers observe the same session.

use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::store::{open_backend, TokenBackend, TokenStore};
use super::CredentialHandle;
use crate::api::{ApiClient, ApiError, ErrorKind};
use crate::config::Config;
use crate::models::{Identity, RegisterProfile, RegisterRequest};

const GENERIC_LOGIN_FAILURE: &str = "Login failed. Please try again.";
const GENERIC_REGISTRATION_FAILURE: &str = "Registration failed. Please try again.";

#[derive(Error, Debug)]
pub enum AuthError {
    /// Login or the identity fetch that follows it failed.
    #[error("{message}")]
    Login {
        message: String,
        #[source]
        source: ApiError,
    },

    /// The backend refused the registration.
    #[error("{message}")]
    Registration {
        message: String,
        #[source]
        source: ApiError,
    },

    /// Rejected locally before anything was sent.
    #[error("{0}")]
    Invalid(String),
}

impl AuthError {
    fn login(source: ApiError) -> Self {
        let message = source
            .backend_message()
            .unwrap_or(GENERIC_LOGIN_FAILURE)
            .to_string();
        AuthError::Login { message, source }
    }

    fn registration(source: ApiError) -> Self {
        let message = source
            .backend_message()
            .unwrap_or(GENERIC_REGISTRATION_FAILURE)
            .to_string();
        AuthError::Registration { message, source }
    }

    /// Text suitable for showing to the user
    pub fn message(&self) -> &str {
        match self {
            AuthError::Login { message, .. } | AuthError::Registration { message, .. } => message,
            AuthError::Invalid(message) => message,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            AuthError::Login { source, .. } | AuthError::Registration { source, .. } => {
                Some(source)
            }
            AuthError::Invalid(_) => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Invalid(_) => ErrorKind::ValidationFailure,
            _ => self.api_error().map(ApiError::kind).unwrap_or(ErrorKind::Other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    /// A credential is being checked; identity is not authoritative.
    Verifying,
    Authenticated,
}

/// Snapshot of the session published to consumers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub loading: bool,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Verifying
        } else if self.identity.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase() == SessionPhase::Authenticated
    }
}

struct Inner {
    api: ApiClient,
    store: TokenStore,
    state: watch::Sender<SessionState>,
}

/// Owns the credential/identity pair and exposes the auth operations.
///
/// Clones share one session.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    /// Build the controller and read the stored token.
    ///
    /// No request is sent: with a stored token the session starts in
    /// `Verifying` with the token attached, otherwise in `Unauthenticated`.
    /// Call [`restore`](Self::restore) to verify it.
    pub fn new(api: ApiClient, backend: Arc<dyn TokenBackend>) -> Self {
        let store = TokenStore::new(backend, api.credential().clone());

        let loading = match store.load() {
            Some(credential) => {
                store.attach(credential);
                true
            }
            None => false,
        };
        debug!(backend = store.backend_name(), verifying = loading, "Session initialized");

        let (state, _) = watch::channel(SessionState {
            identity: None,
            loading,
        });

        Self {
            inner: Arc::new(Inner { api, store, state }),
        }
    }

    /// `new` followed by `restore`.
    pub async fn start(api: ApiClient, backend: Arc<dyn TokenBackend>) -> Self {
        let session = Self::new(api, backend);
        session.restore().await;
        session
    }

    /// Build the API client and token backend from `config`.
    ///
    /// Like [`new`](Self::new), this sends nothing.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api = ApiClient::with_timeout(
            &config.api_base_url,
            CredentialHandle::new(),
            config.request_timeout(),
        )?;
        let backend = open_backend(config.token_backend, &config.cache_dir()?);
        Ok(Self::new(api, backend))
    }

    /// Verify the attached credential against `GET /users/me`.
    ///
    /// Success leaves the session `Authenticated`; any failure clears the
    /// stored token and leaves it `Unauthenticated`. Without a credential
    /// this only settles the loading flag.
    pub async fn restore(&self) {
        if !self.inner.api.credential().is_set() {
            self.publish(None, false);
            return;
        }

        self.set_loading(true);
        match self.inner.api.fetch_current_user().await {
            Ok(identity) => {
                info!(user_id = identity.id, "Session restored");
                self.publish(Some(identity), false);
            }
            Err(e) => {
                warn!(error = %e, "Stored credential rejected, clearing session");
                self.inner.store.clear();
                self.publish(None, false);
            }
        }
    }

    /// Log in, store the returned token, then fetch the identity.
    ///
    /// On failure the token and identity are cleared and the error is
    /// returned after the loading flag is reset.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.set_loading(true);

        match self.try_login(email, password).await {
            Ok(identity) => {
                info!(user_id = identity.id, "Login successful");
                self.publish(Some(identity.clone()), false);
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Login failed");
                self.inner.store.clear();
                self.publish(None, false);
                Err(AuthError::login(e))
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<Identity, ApiError> {
        let token = self.inner.api.login(email, password).await?;
        // The token must be attached before the identity request goes out
        self.inner.store.set(&token.access_token);
        self.inner.api.fetch_current_user().await
    }

    /// Register a new account, then log in with the same credentials.
    ///
    /// A failed registration leaves the session untouched.
    pub async fn register(&self, profile: &RegisterProfile) -> Result<Identity, AuthError> {
        profile.validate().map_err(AuthError::Invalid)?;

        let request = RegisterRequest::from(profile);
        self.inner
            .api
            .register(&request)
            .await
            .map_err(|e| {
                warn!(error = %e, "Registration failed");
                AuthError::registration(e)
            })?;
        info!("Registration accepted, logging in");

        self.login(&profile.email, &profile.password).await
    }

    /// Clear the token and identity. No request is sent.
    pub fn logout(&self) {
        self.inner.store.clear();
        let changed = self.inner.state.send_if_modified(|state| {
            if *state == SessionState::default() {
                false
            } else {
                *state = SessionState::default();
                true
            }
        });
        if changed {
            info!("Logged out");
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn state(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.state.borrow().identity.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.state.borrow().phase()
    }

    /// Receiver that sees every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Wait until no verification or login is in flight.
    pub async fn settled(&self) -> SessionState {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|state| !state.loading).await.map(|state| state.clone());
        // The sender lives in `self`, so the channel cannot be closed here
        settled.unwrap_or_else(|_| self.state())
    }

    /// Client for further requests; carries the session's credential.
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    fn set_loading(&self, loading: bool) {
        self.inner.state.send_if_modified(|state| {
            if state.loading == loading {
                false
            } else {
                state.loading = loading;
                true
            }
        });
    }

    fn publish(&self, identity: Option<Identity>, loading: bool) {
        let next = SessionState { identity, loading };
        debug!(phase = ?next.phase(), "Session state changed");
        self.inner.state.send_if_modified(|state| {
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenBackend;

    fn identity() -> Identity {
        Identity {
            id: 1,
            email: "a@x.com".to_string(),
            name: "Ada".to_string(),
        }
    }

    // Nothing listens on port 9; no test here reaches the network
    fn api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9", CredentialHandle::new()).unwrap()
    }

    #[test]
    fn test_phase() {
        assert_eq!(SessionState::default().phase(), SessionPhase::Unauthenticated);
        let verifying = SessionState {
            identity: Some(identity()),
            loading: true,
        };
        assert_eq!(verifying.phase(), SessionPhase::Verifying);
        assert!(!verifying.is_authenticated());
        let authenticated = SessionState {
            identity: Some(identity()),
            loading: false,
        };
        assert!(authenticated.is_authenticated());
    }

    #[test]
    fn test_new_without_token_is_unauthenticated() {
        let session = SessionController::new(api(), Arc::new(MemoryTokenBackend::new()));
        assert_eq!(session.phase(), SessionPhase::Unauthenticated);
        assert!(!session.is_loading());
        assert!(!session.api().credential().is_set());
    }

    #[test]
    fn test_new_with_token_is_verifying() {
        let backend = MemoryTokenBackend::with_token("tok-1");
        let session = SessionController::new(api(), Arc::new(backend));
        assert_eq!(session.phase(), SessionPhase::Verifying);
        assert_eq!(session.api().credential().get().unwrap().as_str(), "tok-1");
    }

    #[test]
    fn test_logout_notifies_only_on_change() {
        let backend = MemoryTokenBackend::with_token("tok-1");
        let session = SessionController::new(api(), Arc::new(backend.clone()));
        let mut rx = session.subscribe();
        rx.mark_unchanged();

        session.logout();
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();
        assert_eq!(session.state(), SessionState::default());
        assert_eq!(backend.token(), None);

        session.logout();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_profile_locally() {
        let session = SessionController::new(api(), Arc::new(MemoryTokenBackend::new()));
        let profile = RegisterProfile {
            email: "a@x.com".to_string(),
            password: "short".to_string(),
            ..Default::default()
        };
        let err = session.register(&profile).await.unwrap_err();
        assert!(matches!(err, AuthError::Invalid(_)));
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
        assert_eq!(session.state(), SessionState::default());
    }

    #[test]
    fn test_auth_error_messages() {
        let err = AuthError::login(ApiError::Unauthorized(Some(
            "Incorrect email or password".to_string(),
        )));
        assert_eq!(err.message(), "Incorrect email or password");
        assert_eq!(err.kind(), ErrorKind::RejectedCredential);

        let err = AuthError::login(ApiError::ServerError {
            detail: None,
            body: "<html>".to_string(),
        });
        assert_eq!(err.message(), GENERIC_LOGIN_FAILURE);

        let err = AuthError::login(ApiError::RateLimited(Some("Account locked".to_string())));
        assert_eq!(err.message(), "Account locked");

        let err = AuthError::registration(ApiError::Validation(None));
        assert_eq!(err.message(), GENERIC_REGISTRATION_FAILURE);
        assert_eq!(err.to_string(), GENERIC_REGISTRATION_FAILURE);
    }
}

//! Authentication module for managing the bearer credential and the user session.
//!
//! This module provides:
//! - `Credential` / `CredentialHandle`: the bearer token and the shared slot
//!   the API client reads it from on every request
//! - `TokenStore`: durable token persistence (file, OS keyring or memory)
//! - `SessionController`: startup restore, login/register/logout, and an
//!   observable `SessionState` shared by every consumer
//!
//! Tokens carry no client-side expiry; a revoked token is only noticed when
//! the next identity fetch fails.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::{Credential, CredentialHandle};
pub use session::{AuthError, SessionController, SessionPhase, SessionState};
pub use store::{
    open_backend, FileTokenBackend, KeyringTokenBackend, MemoryTokenBackend, TokenBackend,
    TokenStore, TOKEN_KEY,
};

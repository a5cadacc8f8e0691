//! Starchart core library.
//!
//! Client-side plumbing for the Starchart astrology service:
//!
//! - `api`: HTTP client for the `/api` backend, with per-request bearer auth
//! - `auth`: credential handle, token persistence and the session controller
//! - `models`: wire types for users, reports, articles and zodiac insights
//! - `config`: on-disk configuration and environment overrides
//! - `utils`: display helpers shared by front ends

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ErrorKind};
pub use auth::{
    AuthError, Credential, CredentialHandle, SessionController, SessionPhase, SessionState,
    TokenStore,
};
pub use config::{Config, TokenBackendKind};
pub use models::{Identity, RegisterProfile};

//! REST API client module for the Starchart backend.
//!
//! This module provides the `ApiClient` for communicating with the
//! backend to authenticate, fetch the current user, and retrieve
//! reports, articles and zodiac interpretations.
//!
//! Every path is resolved under the fixed `/api` prefix. Requests carry
//! `Authorization: Bearer <token>` whenever the shared credential handle
//! holds a token.

pub mod client;
pub mod error;

pub use client::{ApiClient, ApiResult};
pub use error::{ApiError, ErrorKind};

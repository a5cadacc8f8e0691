//! Data models for Starchart entities.
//!
//! This module contains the wire types exchanged with the backend:
//!
//! - `Identity`, `RegisterProfile`, `RegisterRequest`: user and auth payloads
//! - `AstrologyReportRecord`, `ZodiacReportRecord`: generated, display-only reports
//! - `ArticleRecord`: blog articles
//! - `ZodiacInterpretationRecord`: per-sign insight entries

pub mod article;
pub mod report;
pub mod user;
pub mod zodiac;

pub use article::ArticleRecord;
pub use report::{
    AstrologyReportPayload, AstrologyReportRecord, ReportSection, ZodiacReportPayload,
    ZodiacReportRecord,
};
pub use user::{
    normalize_birth_time, Identity, LoginRequest, RegisterProfile, RegisterRequest, TokenResponse,
};
pub use zodiac::ZodiacInterpretationRecord;

use thiserror::Error;

/// Coarse classification of API failures.
///
/// The session controller treats all of these the same way; front ends
/// use it to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never completed (connect, timeout, TLS).
    NetworkFailure,
    /// The backend refused the credential or the login.
    RejectedCredential,
    /// The backend rejected the payload.
    ValidationFailure,
    Other,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized{}", detail_suffix(.0))]
    Unauthorized(Option<String>),

    #[error("Access denied{}", detail_suffix(.0))]
    AccessDenied(Option<String>),

    #[error("Resource not found{}", detail_suffix(.0))]
    NotFound(Option<String>),

    #[error("Validation failed{}", detail_suffix(.0))]
    Validation(Option<String>),

    #[error("Rate limited - please wait before retrying{}", detail_suffix(.0))]
    RateLimited(Option<String>),

    #[error("Server error: {}", detail_or_body(.detail, .body))]
    ServerError { detail: Option<String>, body: String },

    #[error("Unexpected status {status}: {}", detail_or_body(.detail, .body))]
    UnexpectedStatus {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Stored credential cannot be sent as a header")]
    MalformedCredential,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(": {}", d))
        .unwrap_or_default()
}

fn detail_or_body(detail: &Option<String>, body: &str) -> String {
    detail.clone().unwrap_or_else(|| body.to_string())
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Extract the `detail` field of an error document.
    ///
    /// The backend answers with `{"detail": "..."}` for handled errors and
    /// `{"detail": [{"msg": "..."}, ...]}` for request validation errors.
    fn parse_detail(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        match value.get("detail")? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Array(items) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            _ => None,
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = Self::parse_detail(body);
        match status.as_u16() {
            400 | 422 => ApiError::Validation(detail),
            401 => ApiError::Unauthorized(detail),
            403 => ApiError::AccessDenied(detail),
            404 => ApiError::NotFound(detail),
            429 => ApiError::RateLimited(detail),
            500..=599 => ApiError::ServerError {
                detail,
                body: Self::truncate_body(body),
            },
            other => ApiError::UnexpectedStatus {
                status: other,
                detail,
                body: Self::truncate_body(body),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NetworkError(_) => ErrorKind::NetworkFailure,
            ApiError::Unauthorized(_)
            | ApiError::AccessDenied(_)
            | ApiError::MalformedCredential => ErrorKind::RejectedCredential,
            ApiError::Validation(_) => ErrorKind::ValidationFailure,
            _ => ErrorKind::Other,
        }
    }

    /// The message the backend attached to the failure, if it sent one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(d)
            | ApiError::AccessDenied(d)
            | ApiError::NotFound(d)
            | ApiError::Validation(d)
            | ApiError::RateLimited(d) => d.as_deref(),
            ApiError::ServerError { detail, .. } | ApiError::UnexpectedStatus { detail, .. } => {
                detail.as_deref()
            }
            _ => None,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// The authenticated user as returned by `GET /users/me`.
///
/// The endpoint returns the full profile; only these fields are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Registration input as collected from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct RegisterProfile {
    pub email: String,
    pub password: String,
    pub name: String,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub birth_time: String,
    pub birth_place: String,
}

impl RegisterProfile {
    /// Check the fields the registration form requires before anything is sent.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("Name", &self.name),
            ("Email", &self.email),
            ("Password", &self.password),
            ("Birth date", &self.birth_date),
            ("Birth time", &self.birth_time),
            ("Birth place", &self.birth_place),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required", label));
            }
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Use at least {} characters for the password",
                MIN_PASSWORD_LENGTH
            ));
        }
        Ok(())
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub birth_date: String,
    pub birth_time: Option<String>,
    pub birth_place: String,
}

impl From<&RegisterProfile> for RegisterRequest {
    fn from(profile: &RegisterProfile) -> Self {
        Self {
            email: profile.email.clone(),
            password: profile.password.clone(),
            name: profile.name.clone(),
            birth_date: profile.birth_date.clone(),
            birth_time: normalize_birth_time(&profile.birth_time),
            birth_place: profile.birth_place.clone(),
        }
    }
}

/// Normalize a time-of-day for the backend.
///
/// Exactly `HH:MM` gets `:00` appended; any other non-empty value passes
/// through unchanged; an empty value becomes `None` (JSON `null`).
pub fn normalize_birth_time(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    if is_hour_minute(raw) {
        Some(format!("{}:00", raw))
    } else {
        Some(raw.to_string())
    }
}

fn is_hour_minute(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> RegisterProfile {
        RegisterProfile {
            email: "a@x.com".to_string(),
            password: "secret123".to_string(),
            name: "Ada".to_string(),
            birth_date: "1990-04-12".to_string(),
            birth_time: "09:30".to_string(),
            birth_place: "London".to_string(),
        }
    }

    #[test]
    fn test_normalize_birth_time() {
        assert_eq!(normalize_birth_time("09:30"), Some("09:30:00".to_string()));
        assert_eq!(normalize_birth_time("09:30:15"), Some("09:30:15".to_string()));
        assert_eq!(normalize_birth_time("9:30"), Some("9:30".to_string()));
        assert_eq!(normalize_birth_time("ab:cd"), Some("ab:cd".to_string()));
        assert_eq!(normalize_birth_time(""), None);
    }

    #[test]
    fn test_register_request_body() {
        let body = serde_json::to_value(RegisterRequest::from(&profile())).unwrap();
        assert_eq!(body["birth_time"], "09:30:00");
        assert_eq!(body["birth_date"], "1990-04-12");
        assert_eq!(body["birth_place"], "London");

        let mut p = profile();
        p.birth_time = String::new();
        let body = serde_json::to_value(RegisterRequest::from(&p)).unwrap();
        assert!(body["birth_time"].is_null());
    }

    #[test]
    fn test_validate() {
        assert!(profile().validate().is_ok());

        let mut p = profile();
        p.password = "short".to_string();
        assert!(p.validate().unwrap_err().contains("at least 8"));

        let mut p = profile();
        p.birth_place = "  ".to_string();
        assert_eq!(p.validate().unwrap_err(), "Birth place is required");
    }

    #[test]
    fn test_identity_ignores_extra_profile_fields() {
        let json = r#"{"id":1,"email":"a@x.com","name":"Ada","birth_date":"1990-04-12","birth_time":"09:30:00","birth_place":"London","created_at":"2024-01-01T00:00:00"}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(
            identity,
            Identity {
                id: 1,
                email: "a@x.com".to_string(),
                name: "Ada".to_string()
            }
        );
    }
}

//! API client for communicating with the Starchart REST API.
//!
//! This module provides the `ApiClient` struct for authenticating and for
//! fetching the current user, reports, articles and zodiac interpretations.

use std::time::Duration;

use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::auth::CredentialHandle;
use crate::models::{
    ArticleRecord, AstrologyReportRecord, Identity, LoginRequest, RegisterRequest, TokenResponse,
    ZodiacInterpretationRecord, ZodiacReportRecord,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path prefix every backend route lives under
const API_PREFIX: &str = "api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of reports returned by the history endpoints unless asked otherwise.
pub const DEFAULT_REPORT_HISTORY_LIMIT: u32 = 5;

/// Page size for the article list.
pub const DEFAULT_ARTICLE_PAGE_SIZE: u32 = 10;

/// Report type used when none is given.
pub const DEFAULT_REPORT_TYPE: &str = "daily";

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// API client for the Starchart backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling,
/// and clones share the same credential handle.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    credential: CredentialHandle,
}

impl ApiClient {
    /// Create a new API client reading its bearer token from `credential`
    pub fn new(base_url: &str, credential: CredentialHandle) -> ApiResult<Self> {
        Self::with_timeout(base_url, credential, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: &str,
        credential: CredentialHandle,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            credential,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credential(&self) -> &CredentialHandle {
        &self.credential
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// `GET /users/me` with the attached credential
    pub async fn fetch_current_user(&self) -> ApiResult<Identity> {
        self.get(&["users", "me"], &[]).await
    }

    /// `POST /auth/login`, returning the issued token
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        self.post(&["auth", "login"], &[], Some(&LoginRequest { email, password }))
            .await
    }

    /// `POST /auth/register`. The response body is not used.
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<()> {
        let url = self.endpoint(&["auth", "register"])?;
        debug!(%url, "POST");
        let response = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .json(request)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    // ========================================================================
    // Reports
    // ========================================================================

    pub async fn generate_astrology_report(
        &self,
        report_type: &str,
    ) -> ApiResult<AstrologyReportRecord> {
        self.post::<(), _>(
            &["reports", "astrology"],
            &[("report_type", report_type.to_string())],
            None,
        )
        .await
    }

    /// Most recent astrology reports, newest first
    pub async fn list_astrology_reports(
        &self,
        limit: u32,
    ) -> ApiResult<Vec<AstrologyReportRecord>> {
        self.get(&["reports", "astrology", "latest"], &[("limit", limit.to_string())])
            .await
    }

    pub async fn generate_zodiac_report(&self) -> ApiResult<ZodiacReportRecord> {
        self.post::<(), _>(&["reports", "zodiac"], &[], None).await
    }

    /// Most recent zodiac reports, newest first
    pub async fn list_zodiac_reports(&self, limit: u32) -> ApiResult<Vec<ZodiacReportRecord>> {
        self.get(&["reports", "zodiac", "latest"], &[("limit", limit.to_string())])
            .await
    }

    /// Newest stored astrology report, generating one if there is none yet
    pub async fn latest_or_generate_astrology_report(&self) -> ApiResult<AstrologyReportRecord> {
        let history = self.list_astrology_reports(DEFAULT_REPORT_HISTORY_LIMIT).await?;
        match history.into_iter().next() {
            Some(report) => Ok(report),
            None => {
                debug!("No astrology report history, generating one");
                self.generate_astrology_report(DEFAULT_REPORT_TYPE).await
            }
        }
    }

    /// Newest stored zodiac report, generating one if there is none yet
    pub async fn latest_or_generate_zodiac_report(&self) -> ApiResult<ZodiacReportRecord> {
        let history = self.list_zodiac_reports(DEFAULT_REPORT_HISTORY_LIMIT).await?;
        match history.into_iter().next() {
            Some(report) => Ok(report),
            None => {
                debug!("No zodiac report history, generating one");
                self.generate_zodiac_report().await
            }
        }
    }

    // ========================================================================
    // Articles and insights
    // ========================================================================

    /// Published articles, newest first
    pub async fn list_articles(&self, skip: u32, limit: u32) -> ApiResult<Vec<ArticleRecord>> {
        self.get(
            &["articles", ""],
            &[("skip", skip.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn fetch_article(&self, slug: &str) -> ApiResult<ArticleRecord> {
        self.get(&["articles", slug], &[]).await
    }

    pub async fn list_zodiac_interpretations(&self) -> ApiResult<Vec<ZodiacInterpretationRecord>> {
        self.get(&["zodiac-interpretations"], &[]).await
    }

    /// Lookup is case-insensitive on the backend
    pub async fn fetch_zodiac_interpretation(
        &self,
        sign: &str,
    ) -> ApiResult<ZodiacInterpretationRecord> {
        self.get(&["zodiac-interpretations", sign], &[]).await
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    /// Resolve `segments` under `<base>/api`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    /// Authorization header built from the credential held right now.
    fn auth_headers(&self) -> ApiResult<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        if let Some(credential) = self.credential.get() {
            let mut value = header::HeaderValue::from_str(&credential.bearer())
                .map_err(|_| ApiError::MalformedCredential)?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(%status, "Request failed");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> ApiResult<T> {
        let url = self.endpoint(segments)?;
        debug!(%url, "POST");

        let mut request = self
            .client
            .post(url)
            .headers(self.auth_headers()?)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = Self::check_response(request.send().await?).await?;
        Self::parse(response).await
    }
}

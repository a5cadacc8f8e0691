//! Report, article and insight endpoints against a mock backend.

use serde_json::{json, Value};
use starchart_core::api::ErrorKind;
use starchart_core::auth::{Credential, MemoryTokenBackend, TokenStore};
use starchart_core::{ApiClient, ApiError, CredentialHandle};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn section() -> Value {
    json!({
        "id": "love",
        "title": "Love",
        "summary": "Open up",
        "details": ["Write a letter"],
        "icon": "heart"
    })
}

fn astrology_record(id: i64) -> Value {
    json!({
        "id": id,
        "report_type": "daily",
        "generated_at": "2024-05-01T08:00:00",
        "payload": {
            "generated_at": "2024-05-01T08:00:00",
            "sign": "Aries",
            "sun": "Aries 1°",
            "moon": "Pisces 02°",
            "rising": "Gemini 11°",
            "sections": [section()]
        }
    })
}

fn zodiac_record(id: i64) -> Value {
    json!({
        "id": id,
        "year": 2024,
        "generated_at": "2024-01-01T00:00:00",
        "payload": {
            "generated_at": "2024-01-01T00:00:00",
            "zodiac": "Dragon",
            "element": "Wood",
            "summary": "A year for building",
            "year": 2024,
            "sections": []
        }
    })
}

/// Client whose credential is attached through a token store, as the session does it.
fn authed_client(server: &MockServer, token: &str) -> ApiClient {
    let handle = CredentialHandle::new();
    let store = TokenStore::new(Arc::new(MemoryTokenBackend::new()), handle.clone());
    store.attach(Credential::new(token));
    ApiClient::new(&server.uri(), handle).unwrap()
}

#[tokio::test]
async fn list_astrology_reports_sends_bearer_and_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/astrology/latest"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([astrology_record(2), astrology_record(1)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = authed_client(&server, "tok-1");
    let reports = api.list_astrology_reports(5).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].id, 2);
    assert_eq!(reports[0].payload.sections[0].icon.as_deref(), Some("heart"));
}

#[tokio::test]
async fn generate_astrology_report_passes_report_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/reports/astrology"))
        .and(query_param("report_type", "weekly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(astrology_record(9)))
        .expect(1)
        .mount(&server)
        .await;

    let api = authed_client(&server, "tok-1");
    let report = api.generate_astrology_report("weekly").await.unwrap();
    assert_eq!(report.id, 9);
    assert_eq!(report.payload.sign, "Aries");
}

#[tokio::test]
async fn latest_or_generate_uses_history_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/zodiac/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([zodiac_record(4)])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reports/zodiac"))
        .respond_with(ResponseTemplate::new(200).set_body_json(zodiac_record(5)))
        .expect(0)
        .mount(&server)
        .await;

    let api = authed_client(&server, "tok-1");
    let report = api.latest_or_generate_zodiac_report().await.unwrap();
    assert_eq!(report.id, 4);
}

#[tokio::test]
async fn latest_or_generate_generates_on_empty_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/astrology/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/reports/astrology"))
        .and(query_param("report_type", "daily"))
        .respond_with(ResponseTemplate::new(200).set_body_json(astrology_record(1)))
        .expect(1)
        .mount(&server)
        .await;

    let api = authed_client(&server, "tok-1");
    let report = api.latest_or_generate_astrology_report().await.unwrap();
    assert_eq!(report.id, 1);
}

#[tokio::test]
async fn reports_without_credential_are_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reports/zodiac/latest"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), CredentialHandle::new()).unwrap();
    let err = api.list_zodiac_reports(5).await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(err.kind(), ErrorKind::RejectedCredential);
    assert_eq!(err.backend_message(), Some("Not authenticated"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn list_and_fetch_articles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/articles/"))
        .and(query_param("skip", "10"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 3,
            "title": "Mercury retrograde",
            "slug": "mercury-retrograde",
            "summary": null,
            "cover_url": null,
            "tags": ["planets"],
            "content": "Slow down.",
            "status": "published",
            "published_at": "2024-03-01T10:00:00"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles/mercury-retrograde"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "title": "Mercury retrograde",
            "slug": "mercury-retrograde",
            "tags": [],
            "content": "Slow down.",
            "published_at": "2024-03-01T10:00:00"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/articles/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Article not found"})),
        )
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), CredentialHandle::new()).unwrap();

    let articles = api.list_articles(10, 10).await.unwrap();
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].tags, vec!["planets"]);
    assert_eq!(articles[0].teaser(40), "Slow down.");

    let article = api.fetch_article("mercury-retrograde").await.unwrap();
    assert_eq!(article.content.as_deref(), Some("Slow down."));

    let err = api.fetch_article("missing").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(Some(ref d)) if d == "Article not found"));
}

#[tokio::test]
async fn zodiac_interpretations() {
    let entry = json!({
        "id": 1,
        "sign": "Aries",
        "title": "The Pioneer",
        "date_range": "03/21 - 04/19",
        "element": "Fire",
        "modality": "Cardinal",
        "keywords": ["bold", "direct"],
        "summary": "Starts things.",
        "love": "Be patient.",
        "career": "Lead.",
        "wellbeing": "Rest.",
        "ritual": "Light a candle.",
        "mantra": "I begin.",
        "lucky_color": "Red",
        "updated_at": "2024-02-02T00:00:00"
    });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/zodiac-interpretations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([entry.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/zodiac-interpretations/aries"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entry))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), CredentialHandle::new()).unwrap();
    let all = api.list_zodiac_interpretations().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].keywords, vec!["bold", "direct"]);

    let aries = api.fetch_zodiac_interpretation("aries").await.unwrap();
    assert_eq!(aries.lucky_color, "Red");
}

#[tokio::test]
async fn malformed_body_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/zodiac-interpretations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri(), CredentialHandle::new()).unwrap();
    let err = api.list_zodiac_interpretations().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
    assert_eq!(err.kind(), ErrorKind::Other);
}

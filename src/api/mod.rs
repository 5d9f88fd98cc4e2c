use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use once_cell::sync::Lazy;
use regex::Regex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;

pub use error::*;
pub use state::{create_app, App};

mod contact;
mod error;
mod github;
mod indexnow;
mod intro_call;
mod newsletter;
mod state;
mod views;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Shared sanity check for addresses arriving from forms. Deliverability is
/// the mail relay's problem.
pub(crate) static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub fn create_router(app: App, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/view-count",
            get(views::view_count).post(views::view_count),
        )
        .route("/api/newsletter", post(newsletter::subscribe))
        .route("/api/intro-call", post(intro_call::schedule))
        .route("/api/send-email", post(contact::send))
        .route("/api/indexnow", post(indexnow::ping))
        .route(
            "/api/github/contributions/:username",
            get(github::contributions),
        )
        .route(
            "/api/github/contributions-all/:username",
            get(github::contributions_all),
        )
        .with_state(app)
        .layer(TraceLayer::new_for_http())
        .layer(cors(config))
}

fn cors(config: &Config) -> CorsLayer {
    let origin = config
        .cors_origin
        .as_ref()
        .and_then(|origin| HeaderValue::from_str(origin.as_str().trim_end_matches('/')).ok());

    match origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{header, StatusCode};
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::config::{
        Config, Environment, GithubConfig, IndexNowConfig, SmtpConfig, SurrealConfig, ViewConfig,
    };
    use crate::model::ViewCounter;
    use crate::service::database::Backend;
    use crate::service::views::{CounterStore, ViewAccounting, ViewError};

    use super::*;

    const BASELINE: i64 = 3300;

    fn test_config(environment: Environment) -> Config {
        Config {
            host: "127.0.0.1:0".parse().unwrap(),
            environment,
            cors_origin: None,
            surreal: SurrealConfig {
                url: "mem://".parse().unwrap(),
                namespace: "test".to_string(),
                database: "test".to_string(),
                credentials: None,
            },
            views: ViewConfig { baseline: BASELINE },
            smtp: SmtpConfig {
                host: None,
                port: None,
                username: None,
                password: None,
                from: None,
                to: None,
            },
            github: GithubConfig { token: None },
            indexnow: IndexNowConfig {
                key: None,
                host: None,
            },
        }
    }

    async fn server_with(config: Config) -> TestServer {
        let database = Backend::memory().await.unwrap();
        let app = create_app(database, &config);
        TestServer::new(create_router(app, &config)).unwrap()
    }

    async fn server(environment: Environment) -> TestServer {
        server_with(test_config(environment)).await
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let server = server(Environment::Development).await;

        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("ok");
    }

    #[tokio::test]
    async fn first_view_reports_baseline_and_sets_cookie() {
        let server = server(Environment::Production).await;

        let response = server.get("/api/view-count").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "count": BASELINE }));

        let cookie = response.maybe_cookie(views::VIEW_COOKIE);
        assert!(cookie.is_some(), "production visits get the dedup cookie");
        assert_eq!(cookie.unwrap().value(), "1");
    }

    #[tokio::test]
    async fn post_behaves_like_get() {
        let server = server(Environment::Production).await;

        let response = server.post("/api/view-count").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "count": BASELINE }));
    }

    #[tokio::test]
    async fn dedup_cookie_prevents_recount() {
        let server = server(Environment::Production).await;

        server.get("/api/view-count").await.assert_status_ok();

        for _ in 0..2 {
            let response = server
                .get("/api/view-count")
                .add_cookie(Cookie::new(views::VIEW_COOKIE, "1"))
                .await;
            response.assert_json(&json!({ "count": BASELINE }));
        }
    }

    #[tokio::test]
    async fn bot_user_agent_never_increments() {
        let server = server(Environment::Production).await;

        for _ in 0..3 {
            let response = server
                .get("/api/view-count")
                .add_header(header::USER_AGENT, HeaderValue::from_static("Googlebot/2.1"))
                .await;
            response.assert_json(&json!({ "count": BASELINE }));
            assert!(response.maybe_cookie("hero_viewed").is_none());
        }
    }

    #[tokio::test]
    async fn force_flag_bypasses_bot_and_cookie_checks() {
        let server = server(Environment::Production).await;

        server.get("/api/view-count").await.assert_status_ok();

        let response = server
            .get("/api/view-count")
            .add_query_param("force", "1")
            .add_header(header::USER_AGENT, HeaderValue::from_static("Googlebot/2.1"))
            .add_cookie(Cookie::new(views::VIEW_COOKIE, "1"))
            .await;

        response.assert_json(&json!({ "count": BASELINE + 1 }));
        assert!(response.maybe_cookie("hero_viewed").is_none());
    }

    #[tokio::test]
    async fn view_count_reports_store_failure() {
        struct BrokenStore;

        #[async_trait::async_trait]
        impl CounterStore for BrokenStore {
            async fn read(&self, key: &str) -> Result<Option<ViewCounter>, ViewError> {
                Err(broken(key))
            }

            async fn increment(&self, key: &str) -> Result<ViewCounter, ViewError> {
                Err(broken(key))
            }

            async fn set(&self, key: &str, _count: i64) -> Result<ViewCounter, ViewError> {
                Err(broken(key))
            }

            async fn create(&self, key: &str, _count: i64) -> Result<ViewCounter, ViewError> {
                Err(broken(key))
            }
        }

        fn broken(key: &str) -> ViewError {
            ViewError::MissingRecord {
                key: key.to_string(),
            }
        }

        let database = Backend::memory().await.unwrap();
        let config = test_config(Environment::Production);
        let mut app = create_app(database, &config);
        app.views = ViewAccounting::new(Arc::new(BrokenStore), BASELINE, true);
        let server = TestServer::new(create_router(app, &config)).unwrap();

        let response = server.get("/api/view-count").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "message": "Failed to update view count" }));
        assert!(response.maybe_cookie(views::VIEW_COOKIE).is_none());
    }

    #[tokio::test]
    async fn development_counts_but_never_sets_cookie() {
        let server = server(Environment::Development).await;

        let first = server.get("/api/view-count").await;
        first.assert_json(&json!({ "count": BASELINE }));
        assert!(first.maybe_cookie("hero_viewed").is_none());

        // No cookie handed out, so the same client counts again.
        let second = server.get("/api/view-count").await;
        second.assert_json(&json!({ "count": BASELINE + 1 }));
    }

    #[tokio::test]
    async fn newsletter_requires_email() {
        let server = server(Environment::Development).await;

        let response = server.post("/api/newsletter").json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Email is required" }));
    }

    #[tokio::test]
    async fn newsletter_rejects_malformed_email() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/newsletter")
            .json(&json!({ "email": "not-an-email" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Invalid email format" }));
    }

    #[tokio::test]
    async fn newsletter_subscribes_once() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/newsletter")
            .json(&json!({ "email": "reader@example.com" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({ "message": "Successfully subscribed to newsletter!" }));

        let repeat = server
            .post("/api/newsletter")
            .json(&json!({ "email": "reader@example.com" }))
            .await;
        repeat.assert_status(StatusCode::BAD_REQUEST);
        repeat.assert_json(&json!({ "message": "Email already subscribed" }));
    }

    fn intro_call_payload() -> Value {
        json!({
            "name": "Ada",
            "email": "ada@example.com",
            "location": "Google Meet",
            "date": "2026-09-15T10:00:00Z",
        })
    }

    #[tokio::test]
    async fn intro_call_schedules_with_default_duration() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/intro-call")
            .json(&intro_call_payload())
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["message"], "Intro call scheduled successfully");
        assert_eq!(body["data"]["duration"], 15);
        assert_eq!(body["data"]["location"], "Google Meet");
    }

    #[tokio::test]
    async fn intro_call_requires_core_fields() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/intro-call")
            .json(&json!({ "name": "Ada" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Missing required fields" }));
    }

    #[tokio::test]
    async fn intro_call_rejects_unknown_location() {
        let server = server(Environment::Development).await;

        let mut payload = intro_call_payload();
        payload["location"] = json!("Zoom");

        let response = server.post("/api/intro-call").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Invalid location" }));
    }

    #[tokio::test]
    async fn intro_call_phone_location_validates_number() {
        let server = server(Environment::Development).await;

        let mut payload = intro_call_payload();
        payload["location"] = json!("Phone");

        let response = server.post("/api/intro-call").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "message": "Phone number with country code is required when location is Phone"
        }));

        payload["phoneCountryCode"] = json!("0044");
        payload["phoneNumber"] = json!("1234567");

        let response = server.post("/api/intro-call").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Invalid country code" }));

        payload["phoneCountryCode"] = json!("+44");
        payload["phoneNumber"] = json!("123");

        let response = server.post("/api/intro-call").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Invalid phone number" }));

        payload["phoneNumber"] = json!("7700900123");

        let response = server.post("/api/intro-call").json(&payload).await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["data"]["phone"], "+447700900123");
    }

    #[tokio::test]
    async fn intro_call_rejects_bad_date() {
        let server = server(Environment::Development).await;

        let mut payload = intro_call_payload();
        payload["date"] = json!("next tuesday");

        let response = server.post("/api/intro-call").json(&payload).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Invalid date" }));
    }

    #[tokio::test]
    async fn contact_honeypot_pretends_to_send() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/send-email")
            .json(&json!({
                "name": "Bot",
                "email": "bot@example.com",
                "subject": "spam",
                "message": "buy things",
                "company": "Spam Inc",
            }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Message sent" }));
    }

    #[tokio::test]
    async fn contact_rejects_invalid_json() {
        let server = server(Environment::Development).await;

        let response = server.post("/api/send-email").text("{not json").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Invalid JSON body" }));
    }

    #[tokio::test]
    async fn contact_rejects_header_injection() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/send-email")
            .json(&json!({
                "name": "Mallory",
                "email": "mallory@example.com",
                "subject": "hi\r\nBcc: everyone@example.com",
                "message": "a perfectly normal message",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "Invalid subject" }));
    }

    #[tokio::test]
    async fn contact_reports_missing_mailer() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/send-email")
            .json(&json!({
                "name": "Visitor",
                "email": "visitor@example.com",
                "subject": "hello",
                "message": "a perfectly normal message",
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "message": "Email service is not configured" }));
    }

    #[tokio::test]
    async fn contact_reports_half_configured_credentials() {
        let mut config = test_config(Environment::Development);
        config.smtp.host = Some("smtp.example.com".to_string());
        config.smtp.from = Some("site@example.com".to_string());
        config.smtp.to = Some("owner@example.com".to_string());
        config.smtp.username = Some("user".to_string());

        let server = server_with(config).await;

        let response = server
            .post("/api/send-email")
            .json(&json!({
                "name": "Visitor",
                "email": "visitor@example.com",
                "subject": "hello",
                "message": "a perfectly normal message",
            }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({ "message": "Email credentials are not configured" }));
    }

    #[tokio::test]
    async fn indexnow_without_key_reports_failure() {
        let server = server(Environment::Development).await;

        let response = server
            .post("/api/indexnow")
            .json(&json!({ "url": "https://example.com/blogs/new-post" }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "success": false }));
    }

    #[tokio::test]
    async fn contributions_fall_back_to_mock_data() {
        let server = server(Environment::Development).await;

        let response = server.get("/api/github/contributions/octocat").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert!(body["totalContributions"].as_i64().unwrap() >= 0);
        assert!(!body["weeks"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn contributions_all_covers_three_years() {
        let server = server(Environment::Development).await;

        let response = server.get("/api/github/contributions-all/octocat").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["username"], "octocat");

        let years = body["years"].as_array().unwrap();
        assert_eq!(years.len(), 3);
        assert_eq!(
            years[0]["year"].as_i64().unwrap(),
            years[1]["year"].as_i64().unwrap() + 1
        );
    }
}

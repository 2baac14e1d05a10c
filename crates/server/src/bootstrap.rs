use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use formsite_core::config::AppConfig;
use formsite_mailer::EmailTemplates;

use crate::responses::method_not_allowed;
use crate::{chat, health, submit_form};

/// Applied to every outbound SaaS call; a hung upstream fails the request
/// instead of wedging it.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared per-process context: the loaded configuration, one connection
/// pool for all outbound calls, and the registered email templates.
/// Adapters are built from this per request - no hidden singletons.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub http: reqwest::Client,
    pub templates: Arc<EmailTemplates>,
}

pub struct Application {
    pub state: AppState,
    pub router: Router,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("email template registration failed: {0}")]
    Templates(#[source] anyhow::Error),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(BootstrapError::HttpClient)?;
    let templates = EmailTemplates::new().map_err(BootstrapError::Templates)?;

    warn_on_missing_credentials(&config);

    let state = AppState { config: Arc::new(config), http, templates: Arc::new(templates) };
    let router = router(state.clone());

    info!(event_name = "site.bootstrap.completed", "application bootstrap completed");
    Ok(Application { state, router })
}

pub fn router(state: AppState) -> Router {
    let site_dir = state.config.server.site_dir.clone();

    Router::new()
        .route("/api/chat", post(chat::chat).fallback(method_not_allowed))
        .route("/api/submit-form", post(submit_form::submit_form).fallback(method_not_allowed))
        .route("/health", get(health::health))
        .fallback_service(ServeDir::new(site_dir))
        .with_state(state)
}

/// A deployment without credentials still serves; the pipelines answer 500
/// per request until the environment is fixed. Say so once at startup.
fn warn_on_missing_credentials(config: &AppConfig) {
    if config.assistant.api_key.is_none() {
        warn!(
            event_name = "site.bootstrap.credential_missing",
            variable = "GEMINI_API_KEY",
            "chat pipeline will reject requests until the AI key is configured"
        );
    }
    if config.leads.service_url.is_none() || config.leads.service_key.is_none() {
        warn!(
            event_name = "site.bootstrap.credential_missing",
            variable = "SUPABASE_URL/SUPABASE_ANON_KEY",
            "lead pipeline will reject requests until storage credentials are configured"
        );
    }
    if config.mailer.api_key.is_none() {
        warn!(
            event_name = "site.bootstrap.credential_missing",
            variable = "RESEND_API_KEY",
            "lead pipeline will reject requests until the email key is configured"
        );
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{bootstrap_with_config, router, AppState};
    use formsite_core::config::AppConfig;

    fn test_router() -> axum::Router {
        let app = bootstrap_with_config(AppConfig::default()).expect("bootstrap");
        app.router
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn non_post_methods_receive_a_machine_readable_405() {
        for (method, uri) in [
            ("GET", "/api/chat"),
            ("PUT", "/api/chat"),
            ("GET", "/api/submit-form"),
            ("DELETE", "/api/submit-form"),
        ] {
            let response = test_router()
                .oneshot(
                    Request::builder().method(method).uri(uri).body(Body::empty()).expect("req"),
                )
                .await
                .expect("response");

            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "{method} {uri} should be rejected"
            );
            let body = body_json(response).await;
            assert_eq!(body["error"], "Method not allowed");
        }
    }

    #[tokio::test]
    async fn post_routes_reach_the_pipelines() {
        // No credentials configured: the pipeline itself answers, proving
        // the route wiring, and reports the deployment gap.
        let response = test_router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .body(Body::from(r#"{"message":"hello"}"#))
                    .expect("req"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["details"], "GEMINI_API_KEY is missing from the server environment.");
    }

    #[tokio::test]
    async fn health_is_served() {
        let response = test_router()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("req"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_paths_fall_through_to_the_static_site() {
        let response = test_router()
            .oneshot(Request::builder().uri("/no-such-page").body(Body::empty()).expect("req"))
            .await
            .expect("response");

        // No site bundle in the test environment: the fallback answers 404
        // rather than 405.
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn state_is_cheap_to_clone() {
        let app = bootstrap_with_config(AppConfig::default()).expect("bootstrap");
        let AppState { config, .. } = app.state.clone();
        assert_eq!(config.server.port, 8080);
        let _ = router(app.state);
    }
}

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::bootstrap::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub assistant: HealthCheck,
    pub leads: HealthCheck,
    pub mailer: HealthCheck,
    pub checked_at: String,
}

/// Readiness report. The process serves regardless; a missing upstream
/// credential marks the affected pipeline degraded so deployment errors
/// are visible without traffic.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = &state.config;

    let assistant = credential_check(config.assistant.api_key.is_some(), "GEMINI_API_KEY");
    let leads = credential_check(
        config.leads.service_url.is_some() && config.leads.service_key.is_some(),
        "SUPABASE_URL/SUPABASE_ANON_KEY",
    );
    let mailer = credential_check(config.mailer.api_key.is_some(), "RESEND_API_KEY");

    let ready = [&assistant, &leads, &mailer].iter().all(|check| check.status == "ready");

    Json(HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        assistant,
        leads,
        mailer,
        checked_at: Utc::now().to_rfc3339(),
    })
}

fn credential_check(present: bool, variables: &str) -> HealthCheck {
    if present {
        HealthCheck { status: "ready", detail: "credentials configured".to_string() }
    } else {
        HealthCheck { status: "degraded", detail: format!("missing {variables}") }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::Json;

    use super::health;
    use crate::bootstrap::AppState;
    use formsite_core::config::AppConfig;
    use formsite_mailer::EmailTemplates;

    fn state_with(config: AppConfig) -> State<AppState> {
        State(AppState {
            config: Arc::new(config),
            http: reqwest::Client::new(),
            templates: Arc::new(EmailTemplates::new().expect("templates")),
        })
    }

    #[tokio::test]
    async fn fully_configured_deployment_reports_ready() {
        let mut config = AppConfig::default();
        config.assistant.api_key = Some("ai".to_string().into());
        config.leads.service_url = Some("https://project.supabase.co".to_string());
        config.leads.service_key = Some("storage".to_string().into());
        config.mailer.api_key = Some("email".to_string().into());

        let Json(payload) = health(state_with(config)).await;

        assert_eq!(payload.status, "ready");
        assert_eq!(payload.assistant.status, "ready");
        assert_eq!(payload.leads.status, "ready");
        assert_eq!(payload.mailer.status, "ready");
    }

    #[tokio::test]
    async fn missing_credentials_degrade_their_checks() {
        let mut config = AppConfig::default();
        config.assistant.api_key = Some("ai".to_string().into());

        let Json(payload) = health(state_with(config)).await;

        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.assistant.status, "ready");
        assert_eq!(payload.leads.status, "degraded");
        assert!(payload.leads.detail.contains("SUPABASE_URL"));
        assert_eq!(payload.mailer.status, "degraded");
        assert!(payload.mailer.detail.contains("RESEND_API_KEY"));
    }
}

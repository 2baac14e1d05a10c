//! The lead pipeline: normalize → validate five fields → resolve storage
//! and email credentials → insert the record → admin notification →
//! acknowledgment → `{ "success", "message", "leadId" }`.
//!
//! The three external calls run strictly in sequence and every failure
//! short-circuits the rest. There is no compensating rollback: a persisted
//! lead stays persisted if a later send fails, and the caller sees the
//! send's failure status.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use formsite_core::domain::lead::LeadSubmission;
use formsite_core::errors::PipelineError;
use formsite_core::payload::Payload;
use formsite_leads::LeadStore;
use formsite_mailer::{Mailer, OutboundEmail};

use crate::bootstrap::AppState;
use crate::responses::{form_error, ApiError};

#[derive(Debug, Serialize)]
pub struct SubmitFormResponse {
    pub success: bool,
    pub message: String,
    #[serde(rename = "leadId")]
    pub lead_id: String,
}

pub async fn submit_form(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitFormResponse>, ApiError> {
    let correlation_id = correlation_id();

    let lead = LeadSubmission::parse(Payload::Raw(&body)).map_err(form_error)?;

    // Resolve all credentials up front so a misconfigured deployment fails
    // before anything is persisted. Check order matches the variable
    // order of the deployment contract.
    let store = LeadStore::from_config(state.http.clone(), &state.config.leads)
        .map_err(|error| config_missing(&correlation_id, error))?;
    let mailer = Mailer::from_config(state.http.clone(), &state.config.mailer)
        .map_err(|error| config_missing(&correlation_id, error))?;

    let submitted_at = Utc::now();
    let lead_id = store.insert(&lead).await.map_err(|error| {
        error!(
            event_name = "site.lead.persist_failed",
            correlation_id = %correlation_id,
            error = %error,
            "lead insert rejected by the storage service"
        );
        form_error(PipelineError::PersistenceFailure("Failed to save lead to database".to_string()))
    })?;
    info!(
        event_name = "site.lead.persisted",
        correlation_id = %correlation_id,
        lead_id = %lead_id,
        "lead record persisted"
    );

    const ADMIN_SEND_FAILED: &str = "Failed to send admin notification email";
    const ACK_SEND_FAILED: &str = "Failed to send confirmation email";

    let admin = state
        .templates
        .admin_notification(&lead, submitted_at)
        .map_err(|error| notification_failed(&correlation_id, ADMIN_SEND_FAILED, error))?;
    mailer
        .send(&OutboundEmail {
            from: state.config.mailer.from_address.clone(),
            to: state.config.mailer.admin_email.clone(),
            subject: admin.subject,
            html: admin.html,
        })
        .await
        .map_err(|error| notification_failed(&correlation_id, ADMIN_SEND_FAILED, error))?;

    let acknowledgment = state
        .templates
        .acknowledgment(&lead)
        .map_err(|error| notification_failed(&correlation_id, ACK_SEND_FAILED, error))?;
    mailer
        .send(&OutboundEmail {
            from: state.config.mailer.from_address.clone(),
            to: lead.email.clone(),
            subject: acknowledgment.subject,
            html: acknowledgment.html,
        })
        .await
        .map_err(|error| notification_failed(&correlation_id, ACK_SEND_FAILED, error))?;

    info!(
        event_name = "site.lead.submission_completed",
        correlation_id = %correlation_id,
        lead_id = %lead_id,
        "lead submission pipeline completed"
    );
    Ok(Json(SubmitFormResponse {
        success: true,
        message: "Form submitted successfully".to_string(),
        lead_id,
    }))
}

fn correlation_id() -> String {
    format!("LEAD-{}", &Uuid::new_v4().simple().to_string()[..12])
}

fn config_missing(correlation_id: &str, error: PipelineError) -> ApiError {
    error!(
        event_name = "site.lead.config_missing",
        correlation_id = %correlation_id,
        error = %error,
        "lead pipeline aborted on missing configuration"
    );
    form_error(error)
}

fn notification_failed(correlation_id: &str, detail: &str, error: anyhow::Error) -> ApiError {
    error!(
        event_name = "site.lead.notification_failed",
        correlation_id = %correlation_id,
        detail = detail,
        error = %error,
        "email send rejected by the provider"
    );
    form_error(PipelineError::NotificationFailure(detail.to_string()))
}

//! The chat pipeline: normalize → validate → resolve the AI key → one
//! completion call → `{ "reply" }`. A single linear pass with early-exit
//! failure at each stage; no retries, no state.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use formsite_assistant::{Assistant, GeminiClient};
use formsite_core::domain::chat::ChatRequest;
use formsite_core::errors::PipelineError;
use formsite_core::payload::Payload;

use crate::bootstrap::AppState;
use crate::responses::{chat_error, ApiError};

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let correlation_id = correlation_id();

    let request = ChatRequest::parse(Payload::Raw(&body)).map_err(chat_error)?;

    let client =
        GeminiClient::from_config(state.http.clone(), &state.config.assistant).map_err(|error| {
            error!(
                event_name = "site.chat.config_missing",
                correlation_id = %correlation_id,
                error = %error,
                "chat pipeline aborted on missing configuration"
            );
            chat_error(error)
        })?;
    let assistant = Assistant::new(Arc::new(client));

    let reply = assistant.reply(&request.message).await.map_err(|error| {
        error!(
            event_name = "site.chat.generation_failed",
            correlation_id = %correlation_id,
            error = %error,
            "completion request failed"
        );
        chat_error(PipelineError::UpstreamServiceFailure("Failed to generate response".to_string()))
    })?;

    info!(
        event_name = "site.chat.reply_generated",
        correlation_id = %correlation_id,
        "chat reply generated"
    );
    Ok(Json(ChatResponse { reply }))
}

fn correlation_id() -> String {
    format!("CHAT-{}", &Uuid::new_v4().simple().to_string()[..12])
}

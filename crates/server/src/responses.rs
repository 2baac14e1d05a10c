use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use formsite_core::errors::PipelineError;

/// JSON error body shared by both API endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

fn status_from(error: &PipelineError) -> StatusCode {
    StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Chat mapping: client errors carry their specific message directly;
/// server-class failures use the endpoint-generic error string with the
/// detail alongside.
pub fn chat_error(error: PipelineError) -> ApiError {
    let status = status_from(&error);
    let body = if error.is_client_error() {
        ErrorBody { error: error.to_string(), details: None }
    } else {
        ErrorBody {
            error: "Failed to generate response".to_string(),
            details: Some(error.to_string()),
        }
    };
    (status, Json(body))
}

/// Form mapping: every failure uses the endpoint-generic error string with
/// the specific detail alongside.
pub fn form_error(error: PipelineError) -> ApiError {
    let status = status_from(&error);
    (
        status,
        Json(ErrorBody {
            error: "Failed to process form submission".to_string(),
            details: Some(error.to_string()),
        }),
    )
}

pub async fn method_not_allowed() -> ApiError {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody { error: "Method not allowed".to_string(), details: None }),
    )
}

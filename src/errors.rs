use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors surfaced at the HTTP boundary. Failures inside a call turn never
/// reach here — the dialogue engine resolves them into an escalation step so
/// the caller always hears a coherent next step.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid webhook signature")]
    InvalidSignature,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidSignature => StatusCode::FORBIDDEN,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("invalid request body: {0}")]
    Payload(#[from] JsonRejection),

    #[error("unknown conversation state: {0}")]
    UnknownState(String),

    #[error("ticket already issued: {0}")]
    AlreadyIssued(String),

    #[error("booking is incomplete, missing: {0}")]
    IncompleteBooking(String),

    #[error("ticket does not match issued record: {0}")]
    TicketMismatch(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("ticket rendering failed: {0}")]
    Render(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Payload(rejection) => rejection.status(),
            AppError::UnknownState(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyIssued(_) => StatusCode::CONFLICT,
            AppError::IncompleteBooking(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::TicketMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Render(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match status {
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY => {
                tracing::error!(error = %self, "request failed");
            }
            _ => tracing::warn!(error = %self, "request rejected"),
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

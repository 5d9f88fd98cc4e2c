use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use snafu::Snafu;

use crate::service::database::{is_unique_violation, BackendError};
use crate::service::mailer::MailerError;
use crate::service::views::ViewError;

/// Request failures. Display strings double as the client-facing message;
/// anything carrying a source keeps the detail server-side.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApiError {
    #[snafu(display("{message}"))]
    BadRequest { message: String },

    #[snafu(display("Failed to update view count"))]
    ViewCount { source: ViewError },

    #[snafu(display("Email service is not configured"))]
    MailerNotConfigured,

    #[snafu(display("Email credentials are not configured"))]
    MailerCredentialsMissing,

    #[snafu(display("Failed to send email"))]
    SendEmail { source: MailerError },

    #[snafu(display("Internal server error"))]
    Database { source: BackendError },
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            // A unique-index violation means the client lost a race, not
            // that the server failed.
            ApiError::Database { source } if is_unique_violation(source) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Database { source } if is_unique_violation(source) => {
                "Email already subscribed".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}
